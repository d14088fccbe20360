use std::fs;
use std::path::Path;

/// Power-supply nodes that expose battery temperature in tenths of a degree,
/// in probe order.
const TEMP_NODES: [&str; 3] = [
    "/sys/class/power_supply/battery/temp",
    "/sys/class/power_supply/bms/temp",
    "/sys/class/power_supply/BAT0/temp",
];

/// Unprivileged battery temperature in °C, 0.0 when no node is readable.
pub fn temperature_c() -> f32 {
    TEMP_NODES
        .iter()
        .find_map(|node| read_tenths(Path::new(node)))
        .map(|tenths| tenths as f32 / 10.0)
        .unwrap_or(0.0)
}

pub(crate) fn read_tenths(path: &Path) -> Option<i32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
