//! Thermal throttle producer.

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::platform::thermal::{self, ThermalStatus};

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Task that polls the platform thermal severity every five seconds.
///
/// Emits true only at or above severe; platforms without thermal zones always
/// report false. No helper channel involved.
pub async fn thermal_task(
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let throttling = thermal::status()
            .map(|severity| severity >= ThermalStatus::Severe)
            .unwrap_or(false);

        if update_tx
            .send(ProducerUpdate::ThermalThrottling(throttling))
            .await
            .is_err()
        {
            break;
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {}
            _ = shutdown.recv() => break,
        }
    }
}
