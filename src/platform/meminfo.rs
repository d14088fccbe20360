use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_GIB: f32 = 1024.0 * 1024.0 * 1024.0;

/// Used/total memory in GB.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RamReading {
    pub used_gb: f32,
    pub total_gb: f32,
}

/// Unprivileged memory probe, the fallback when the helper channel is not ready.
///
/// Owns its `sysinfo::System` so repeated reads only refresh memory counters.
pub struct MemoryProbe {
    system: System,
}

impl MemoryProbe {
    pub fn new() -> Self {
        let refresh_kind =
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything());
        Self {
            system: System::new_with_specifics(refresh_kind),
        }
    }

    pub fn read(&mut self) -> RamReading {
        self.system.refresh_memory();
        let total = self.system.total_memory() as f32;
        let available = self.system.available_memory() as f32;
        RamReading {
            used_gb: (total - available).max(0.0) / BYTES_PER_GIB,
            total_gb: total / BYTES_PER_GIB,
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}
