//! Ping latency producer.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::shell::CommandChannel;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(3000);

const PING_COMMAND: &str = "ping -c 1 google.com";

/// Task that measures round-trip latency every three seconds.
///
/// Pings through the helper channel; a gated channel or a reply without the
/// `time=` marker emits 0.
pub async fn ping_task<C: CommandChannel>(
    channel: Arc<C>,
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let ping_ms = if channel.is_ready() {
            let output = channel.execute_command(PING_COMMAND).await;
            parse_ping_ms(&output).unwrap_or(0)
        } else {
            0
        };

        if update_tx.send(ProducerUpdate::PingMs(ping_ms)).await.is_err() {
            break;
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }
    }
}

/// Extract the round-trip time following the `time=` marker, rounded to ms.
pub(crate) fn parse_ping_ms(output: &str) -> Option<u32> {
    let after_marker = output.split("time=").nth(1)?;
    let token = after_marker.split(' ').next()?;
    let ms: f32 = token.parse().ok()?;
    Some(ms.round() as u32)
}
