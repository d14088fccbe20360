//! RAM usage producer.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::platform::meminfo::{MemoryProbe, RamReading};
use crate::shell::CommandChannel;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(2000);

const MEMINFO_COMMAND: &str = "free -m | grep Mem";

/// Task that samples used/total memory every two seconds.
///
/// Prefers the privileged `free -m` view; a parse failure or a gated channel
/// falls back to the unprivileged memory probe.
pub async fn ram_task<C: CommandChannel>(
    channel: Arc<C>,
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut fallback = MemoryProbe::new();
    loop {
        let reading = if channel.is_ready() {
            let output = channel.execute_command(MEMINFO_COMMAND).await;
            parse_free_output(&output).unwrap_or_else(|| fallback.read())
        } else {
            fallback.read()
        };

        let update = ProducerUpdate::Ram {
            used_gb: reading.used_gb,
            total_gb: reading.total_gb,
        };
        if update_tx.send(update).await.is_err() {
            break;
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }
    }
}

/// Parse `free -m` output: "Mem: <total> <used> <free> <shared> <buf/cache> <available>".
///
/// Extraction is index-based on whitespace-split fields 1 (total) and 2 (used).
pub(crate) fn parse_free_output(output: &str) -> Option<RamReading> {
    let mut fields = output.split_whitespace();
    let total_mb: f32 = fields.nth(1)?.parse().ok()?;
    let used_mb: f32 = fields.next()?.parse().ok()?;
    Some(RamReading {
        used_gb: used_mb / 1024.0,
        total_gb: total_mb / 1024.0,
    })
}
