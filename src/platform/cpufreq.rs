use std::fs;
use std::path::Path;

/// World-readable on every Android device; reports kHz.
pub const SCALING_CUR_FREQ: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";

/// Current cpu0 clock in MHz, or `None` when the sysfs node is missing or garbled.
pub fn current_mhz() -> Option<u32> {
    read_mhz(Path::new(SCALING_CUR_FREQ))
}

pub(crate) fn read_mhz(path: &Path) -> Option<u32> {
    let raw = fs::read_to_string(path).ok()?;
    let khz: u32 = raw.trim().parse().ok()?;
    Some(khz / 1000)
}
