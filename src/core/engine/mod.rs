//! Metrics aggregation engine.
//!
//! Independent polling producers feed one engine task that owns the canonical
//! snapshot and the FPS history; consumers subscribe to read-only observables.

mod history;
mod producers;
mod registry;
mod runtime;
mod snapshot;

pub use history::{FpsHistory, FPS_HISTORY_CAPACITY};
pub use producers::ProducerUpdate;
pub use runtime::MetricsEngine;
pub use snapshot::MetricsSnapshot;
