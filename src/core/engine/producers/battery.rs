//! Battery temperature producer.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

use super::ProducerUpdate;
use crate::platform::battery;
use crate::shell::CommandChannel;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(5000);

const BATTERY_COMMAND: &str = "dumpsys battery | grep temperature";

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

/// Task that samples battery temperature every five seconds.
///
/// The privileged dump and the unprivileged sysfs fallback both report tenths
/// of a degree; an empty digit extraction falls through to the fallback.
pub async fn battery_task<C: CommandChannel>(
    channel: Arc<C>,
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let temp_c = if channel.is_ready() {
            let output = channel.execute_command(BATTERY_COMMAND).await;
            parse_temperature_tenths(&output)
                .map(|tenths| tenths as f32 / 10.0)
                .unwrap_or_else(battery::temperature_c)
        } else {
            battery::temperature_c()
        };

        if update_tx
            .send(ProducerUpdate::BatteryTemp(temp_c))
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

/// Strip everything that is not a digit; the remainder is tenths of a degree.
pub(crate) fn parse_temperature_tenths(output: &str) -> Option<u32> {
    let digits = NON_DIGITS.replace_all(output, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
