// FrameHUD Library - Public API

// Re-export error types
pub mod error;
pub use error::{HudError, Result};

// Module declarations
pub mod core;
pub mod platform;
pub mod shell;

// Re-export commonly used types
pub use crate::core::engine::{FpsHistory, MetricsEngine, MetricsSnapshot};
pub use crate::core::modules::{ModuleId, ModuleSet, ModuleToggles};
pub use crate::shell::{ChannelState, CommandChannel, ConnectionState, ShellChannel};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
