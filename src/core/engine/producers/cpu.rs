//! CPU frequency producer.

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::platform::cpufreq;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Task that reads cpu0's current clock from sysfs once per second.
///
/// The node is world-readable, so no helper channel is involved; a missing or
/// garbled read emits 0.
pub async fn cpu_task(
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let mhz = cpufreq::current_mhz().unwrap_or(0);
        if update_tx.send(ProducerUpdate::CpuMhz(mhz)).await.is_err() {
            break;
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }
    }
}
