use serde::{Deserialize, Serialize};

use crate::core::modules::ModuleId;

/// Current aggregated metrics snapshot.
///
/// Replaced wholesale on every producer emission; each emission touches only the
/// field group owned by its producer. Fields of disabled modules are held at their
/// neutral value (0 / false), never left stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Frames per second, truncated to an integer.
    pub fps: u32,
    /// Current cpu0 clock in MHz.
    pub cpu_mhz: u32,
    pub ram_used_gb: f32,
    pub ram_total_gb: f32,
    /// Battery temperature in °C.
    pub battery_temp_c: f32,
    pub net_rx_kbps: f32,
    pub net_tx_kbps: f32,
    /// Round-trip latency in milliseconds.
    pub ping_ms: u32,
    /// True while the platform reports severe (or worse) thermal throttling.
    pub thermal_throttling: bool,
}

impl MetricsSnapshot {
    /// Reset the field group owned by `id` to its neutral value.
    ///
    /// Called when a module is disabled so the overlay never shows stale data.
    pub fn clear_module(&mut self, id: ModuleId) {
        match id {
            ModuleId::Cpu => self.cpu_mhz = 0,
            ModuleId::Ram => {
                self.ram_used_gb = 0.0;
                self.ram_total_gb = 0.0;
            }
            ModuleId::Net => {
                self.net_rx_kbps = 0.0;
                self.net_tx_kbps = 0.0;
            }
            ModuleId::Temp => self.battery_temp_c = 0.0,
            ModuleId::Thermal => self.thermal_throttling = false,
            ModuleId::Ping => self.ping_ms = 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> MetricsSnapshot {
        MetricsSnapshot {
            fps: 60,
            cpu_mhz: 1804,
            ram_used_gb: 3.2,
            ram_total_gb: 7.8,
            battery_temp_c: 31.5,
            net_rx_kbps: 420.0,
            net_tx_kbps: 36.5,
            ping_ms: 23,
            thermal_throttling: true,
        }
    }

    #[test]
    fn test_clear_resets_only_owned_fields() {
        let mut snapshot = populated();
        snapshot.clear_module(ModuleId::Ram);

        let expected = MetricsSnapshot {
            ram_used_gb: 0.0,
            ram_total_gb: 0.0,
            ..populated()
        };
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn test_clear_thermal_resets_flag() {
        let mut snapshot = populated();
        snapshot.clear_module(ModuleId::Thermal);
        assert!(!snapshot.thermal_throttling);
        assert_eq!(snapshot.fps, 60);
        assert_eq!(snapshot.ping_ms, 23);
    }

    #[test]
    fn test_clear_every_module_reaches_default_except_fps() {
        let mut snapshot = populated();
        for id in ModuleId::ALL {
            snapshot.clear_module(id);
        }
        // Frame rate has no module toggle, so it is the only surviving field.
        let expected = MetricsSnapshot {
            fps: 60,
            ..MetricsSnapshot::default()
        };
        assert_eq!(snapshot, expected);
    }
}
