// Platform-specific OS queries (unprivileged reads with default-on-failure)

pub mod battery;
pub mod cpufreq;
pub mod meminfo;
pub mod net;
pub mod thermal;

// Re-exports for clean imports
pub use meminfo::{MemoryProbe, RamReading};
pub use net::TrafficProbe;
pub use thermal::ThermalStatus;
