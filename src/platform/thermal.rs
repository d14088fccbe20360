use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const THERMAL_ROOT: &str = "/sys/class/thermal";

/// Platform thermal severity ladder, mirroring the Android PowerManager levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThermalStatus {
    None,
    Light,
    Moderate,
    Severe,
    Critical,
    Emergency,
    Shutdown,
}

/// Current worst-case thermal severity across all zones, or `None` where the
/// platform exposes no thermal zones at all.
pub fn status() -> Option<ThermalStatus> {
    status_from(Path::new(THERMAL_ROOT))
}

pub(crate) fn status_from(root: &Path) -> Option<ThermalStatus> {
    let entries = fs::read_dir(root).ok()?;
    let mut worst: Option<ThermalStatus> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with("thermal_zone") {
            continue;
        }
        if let Some(severity) = zone_status(&entry.path()) {
            worst = Some(worst.map_or(severity, |current| current.max(severity)));
        }
    }
    worst
}

/// Severity of one zone: the worst trip point its current temperature has reached.
fn zone_status(zone: &Path) -> Option<ThermalStatus> {
    let temp: i64 = read_value(&zone.join("temp"))?;
    let mut severity = ThermalStatus::None;
    for index in 0.. {
        let trip_type = match fs::read_to_string(zone.join(format!("trip_point_{index}_type"))) {
            Ok(kind) => kind,
            Err(_) => break,
        };
        let Some(trip_temp) = read_value::<i64>(&zone.join(format!("trip_point_{index}_temp")))
        else {
            continue;
        };
        if temp < trip_temp {
            continue;
        }
        let reached = match trip_type.trim() {
            "passive" => ThermalStatus::Moderate,
            "hot" => ThermalStatus::Severe,
            "critical" => ThermalStatus::Critical,
            _ => continue,
        };
        severity = severity.max(reached);
    }
    Some(severity)
}

fn read_value<T: FromStr>(path: &Path) -> Option<T> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
