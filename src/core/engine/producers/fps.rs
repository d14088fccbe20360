//! Frame-rate producer.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::shell::CommandChannel;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Clear stale stats and start fresh accumulation; reads nothing.
const CLEAR_COMMAND: &str = "dumpsys SurfaceFlinger --timestats -clear -enable";
/// Dump the accumulated average.
const DUMP_COMMAND: &str = "dumpsys SurfaceFlinger --timestats -dump";

/// Only the first third of each 3-second wall-clock window may clear, so the
/// dump right after a clear always sees at least one second of real frames.
const CLEAR_CYCLE_MS: u64 = 3000;
const CLEAR_WINDOW_MS: u64 = 1000;

static AVERAGE_FPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"averageFPS\s*=\s*([0-9.]+)").unwrap());

/// Task that produces the integer FPS value once per second.
///
/// Always running: frame rate is the core metric and has no module toggle.
pub async fn fps_task<C: CommandChannel>(
    channel: Arc<C>,
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut sampler = FpsSampler::default();
    loop {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        if let Some(fps) = sampler.cycle(channel.as_ref(), now_ms).await {
            if update_tx.send(ProducerUpdate::Fps(fps)).await.is_err() {
                break;
            }
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }
    }
}

/// Per-cycle state machine for the frame-timing accumulation protocol.
#[derive(Debug, Default)]
pub(crate) struct FpsSampler {
    initialized: bool,
    last_known_fps: u32,
}

impl FpsSampler {
    /// Run one poll cycle; `None` means the cycle only armed accumulation.
    pub(crate) async fn cycle<C: CommandChannel>(
        &mut self,
        channel: &C,
        now_ms: u64,
    ) -> Option<u32> {
        if !channel.is_ready() {
            // Accumulation must restart from a clean state once the channel
            // comes back, so stale pre-disconnect readings are never reused.
            self.initialized = false;
            self.last_known_fps = 0;
            return Some(0);
        }

        if !self.initialized {
            // No dump yet: the accumulator needs at least a second of frames.
            channel.execute_command(CLEAR_COMMAND).await;
            self.initialized = true;
            return None;
        }

        let output = channel.execute_command(DUMP_COMMAND).await;
        if let Some(parsed) = parse_average_fps(&output) {
            if parsed > 0 {
                self.last_known_fps = parsed;
            }
        }
        // Hold the last known value over empty dumps so the reading never
        // flickers to zero right after a clear.
        let emitted = self.last_known_fps;

        if now_ms % CLEAR_CYCLE_MS < CLEAR_WINDOW_MS {
            channel.execute_command(CLEAR_COMMAND).await;
        }
        Some(emitted)
    }
}

/// Pull the truncated `averageFPS` value out of a free-form timestats dump.
pub(crate) fn parse_average_fps(output: &str) -> Option<u32> {
    let capture = AVERAGE_FPS.captures(output)?;
    let value: f32 = capture[1].parse().ok()?;
    Some(value as u32)
}
