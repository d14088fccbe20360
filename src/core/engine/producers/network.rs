//! Network throughput producer.

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration, Instant};

use super::ProducerUpdate;
use crate::platform::net::TrafficProbe;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Task that derives rx/tx KB/s from cumulative byte counters.
///
/// Rates come from deltas between successive readings, never from the raw
/// counters; no helper channel is involved.
pub async fn network_task(
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let Some(mut probe) = TrafficProbe::probe() else {
        // Counters unsupported on this device: report a permanent zero rate.
        loop {
            let update = ProducerUpdate::Network {
                rx_kbps: 0.0,
                tx_kbps: 0.0,
            };
            if update_tx.send(update).await.is_err() {
                return;
            }
            tokio::select! {
                _ = sleep(POLL_INTERVAL) => {}
                _ = shutdown.recv() => return,
            }
        }
    };

    let (mut prev_rx, mut prev_tx) = probe.totals();
    let mut prev_time = Instant::now();

    loop {
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }

        let (rx, tx) = probe.totals();
        let now = Instant::now();
        let elapsed_secs = now.duration_since(prev_time).as_secs_f32();

        let update = if elapsed_secs > 0.0 {
            ProducerUpdate::Network {
                rx_kbps: throughput_kbps(prev_rx, rx, elapsed_secs),
                tx_kbps: throughput_kbps(prev_tx, tx, elapsed_secs),
            }
        } else {
            ProducerUpdate::Network {
                rx_kbps: 0.0,
                tx_kbps: 0.0,
            }
        };
        if update_tx.send(update).await.is_err() {
            break;
        }

        prev_rx = rx;
        prev_tx = tx;
        prev_time = now;
    }
}

/// Delta of two cumulative counters as KB/s.
///
/// Counters reset when an interface restarts; the saturating delta reports a
/// zero rate instead of a negative one.
pub(crate) fn throughput_kbps(previous: u64, current: u64, elapsed_secs: f32) -> f32 {
    (current.saturating_sub(previous) as f32 / 1024.0) / elapsed_secs
}
