//! Polling producer tasks, one per metric.
//!
//! Each producer is an independent loop at its own cadence with its own fallback
//! policy. Producers never propagate errors: every failure reduces to a neutral
//! or last-known-good emission for that cycle.

mod battery;
mod cpu;
mod fps;
mod network;
mod ping;
mod ram;
mod thermal;

pub use battery::battery_task;
pub use cpu::cpu_task;
pub use fps::fps_task;
pub use network::network_task;
pub use ping::ping_task;
pub use ram::ram_task;
pub use thermal::thermal_task;

/// Updates sent from producer tasks to the aggregation engine.
///
/// Each variant carries the complete field group owned by one producer; the
/// engine merges it into the snapshot without touching any other field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProducerUpdate {
    Fps(u32),
    CpuMhz(u32),
    Ram { used_gb: f32, total_gb: f32 },
    Network { rx_kbps: f32, tx_kbps: f32 },
    BatteryTemp(f32),
    ThermalThrottling(bool),
    PingMs(u32),
}

impl ProducerUpdate {
    /// The toggleable module this update belongs to; `None` for frame rate,
    /// which always runs.
    pub fn module(&self) -> Option<crate::core::modules::ModuleId> {
        use crate::core::modules::ModuleId;
        match self {
            ProducerUpdate::Fps(_) => None,
            ProducerUpdate::CpuMhz(_) => Some(ModuleId::Cpu),
            ProducerUpdate::Ram { .. } => Some(ModuleId::Ram),
            ProducerUpdate::Network { .. } => Some(ModuleId::Net),
            ProducerUpdate::BatteryTemp(_) => Some(ModuleId::Temp),
            ProducerUpdate::ThermalThrottling(_) => Some(ModuleId::Thermal),
            ProducerUpdate::PingMs(_) => Some(ModuleId::Ping),
        }
    }
}
