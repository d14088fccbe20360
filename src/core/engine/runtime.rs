//! Aggregation engine: owns the canonical snapshot and FPS history, and
//! reconciles the desired-module set against the running producers.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use super::history::FpsHistory;
use super::producers::{
    battery_task, cpu_task, fps_task, network_task, ping_task, ram_task, thermal_task,
    ProducerUpdate,
};
use super::registry::{ModuleHandle, ProducerRegistry};
use super::snapshot::MetricsSnapshot;
use crate::core::modules::{ModuleId, ModuleSet};
use crate::shell::CommandChannel;

const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Owning handle to the running metrics engine.
///
/// The engine task is the single writer of the snapshot and history; consumers
/// get read-only `watch` subscriptions that replay the current value and then
/// every whole-value replacement.
pub struct MetricsEngine {
    snapshot_rx: watch::Receiver<MetricsSnapshot>,
    history_rx: watch::Receiver<FpsHistory>,
    shutdown_tx: broadcast::Sender<()>,
}

impl MetricsEngine {
    /// Spawn the engine and its always-on frame-rate producer on the current
    /// runtime. Toggleable producers start and stop as `modules_rx` changes,
    /// beginning with its current value.
    pub fn start<C: CommandChannel>(
        channel: Arc<C>,
        modules_rx: watch::Receiver<ModuleSet>,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(MetricsSnapshot::default());
        let (history_tx, history_rx) = watch::channel(FpsHistory::new());
        let (shutdown_tx, _) = broadcast::channel(1);
        let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

        // Frame rate always runs; it is excluded from reconciliation.
        tokio::spawn(fps_task(
            Arc::clone(&channel),
            update_tx.clone(),
            shutdown_tx.subscribe(),
        ));

        tokio::spawn(engine_task(
            channel,
            update_rx,
            update_tx,
            modules_rx,
            snapshot_tx,
            history_tx,
            shutdown_tx.subscribe(),
        ));
        log::info!("metrics engine started");

        Self {
            snapshot_rx,
            history_rx,
            shutdown_tx,
        }
    }

    /// Observable current snapshot.
    pub fn snapshot(&self) -> watch::Receiver<MetricsSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Observable FPS history window.
    pub fn fps_history(&self) -> watch::Receiver<FpsHistory> {
        self.history_rx.clone()
    }

    /// Stop every producer and the engine task.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Single-writer loop: merges producer emissions into the snapshot and reacts
/// to configuration changes. Producer failures never reach this task, since
/// producers reduce every failure to a value; the loop only ends on shutdown.
async fn engine_task<C: CommandChannel>(
    channel: Arc<C>,
    mut update_rx: mpsc::Receiver<ProducerUpdate>,
    update_tx: mpsc::Sender<ProducerUpdate>,
    mut modules_rx: watch::Receiver<ModuleSet>,
    snapshot_tx: watch::Sender<MetricsSnapshot>,
    history_tx: watch::Sender<FpsHistory>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut snapshot = MetricsSnapshot::default();
    let mut history = FpsHistory::new();
    let mut registry = ProducerRegistry::default();
    let mut config_open = true;

    // React to the initial configuration value before the first change event.
    let mut enabled = modules_rx.borrow_and_update().clone();
    apply_config(
        &mut registry,
        &enabled,
        &channel,
        &update_tx,
        &mut snapshot,
        &snapshot_tx,
    );

    loop {
        tokio::select! {
            Some(update) = update_rx.recv() => {
                // A cancelled producer's final emission can still sit in the
                // queue when its module is disabled; dropping it keeps the
                // neutral reset authoritative.
                if let Some(id) = update.module() {
                    if !enabled.contains(&id) {
                        continue;
                    }
                }
                match update {
                    ProducerUpdate::Fps(fps) => {
                        snapshot.fps = fps;
                        history.push(fps);
                        let _ = history_tx.send(history.clone());
                    }
                    ProducerUpdate::CpuMhz(mhz) => snapshot.cpu_mhz = mhz,
                    ProducerUpdate::Ram { used_gb, total_gb } => {
                        snapshot.ram_used_gb = used_gb;
                        snapshot.ram_total_gb = total_gb;
                    }
                    ProducerUpdate::Network { rx_kbps, tx_kbps } => {
                        snapshot.net_rx_kbps = rx_kbps;
                        snapshot.net_tx_kbps = tx_kbps;
                    }
                    ProducerUpdate::BatteryTemp(temp) => snapshot.battery_temp_c = temp,
                    ProducerUpdate::ThermalThrottling(flag) => {
                        snapshot.thermal_throttling = flag;
                    }
                    ProducerUpdate::PingMs(ms) => snapshot.ping_ms = ms,
                }
                let _ = snapshot_tx.send(snapshot);
            }
            changed = modules_rx.changed(), if config_open => {
                match changed {
                    Ok(()) => {
                        enabled = modules_rx.borrow_and_update().clone();
                        apply_config(
                            &mut registry,
                            &enabled,
                            &channel,
                            &update_tx,
                            &mut snapshot,
                            &snapshot_tx,
                        );
                    }
                    // Configuration source went away; keep the last set running.
                    Err(_) => config_open = false,
                }
            }
            _ = shutdown.recv() => {
                registry.stop_all();
                break;
            }
        }
    }
}

fn apply_config<C: CommandChannel>(
    registry: &mut ProducerRegistry,
    desired: &ModuleSet,
    channel: &Arc<C>,
    update_tx: &mpsc::Sender<ProducerUpdate>,
    snapshot: &mut MetricsSnapshot,
    snapshot_tx: &watch::Sender<MetricsSnapshot>,
) {
    let stopped = registry.reconcile(desired, |id| spawn_producer(id, channel, update_tx));
    log::debug!("active modules: {:?}", registry.running_modules());
    if stopped.is_empty() {
        return;
    }

    // Neutral-value reset lands together with cancellation so a disabled
    // module never lingers in the snapshot.
    for id in &stopped {
        snapshot.clear_module(*id);
    }
    let _ = snapshot_tx.send(*snapshot);
}

fn spawn_producer<C: CommandChannel>(
    id: ModuleId,
    channel: &Arc<C>,
    update_tx: &mpsc::Sender<ProducerUpdate>,
) -> ModuleHandle {
    let (stop_tx, stop_rx) = broadcast::channel(1);
    let task = match id {
        ModuleId::Cpu => tokio::spawn(cpu_task(update_tx.clone(), stop_rx)),
        ModuleId::Ram => tokio::spawn(ram_task(
            Arc::clone(channel),
            update_tx.clone(),
            stop_rx,
        )),
        ModuleId::Net => tokio::spawn(network_task(update_tx.clone(), stop_rx)),
        ModuleId::Temp => tokio::spawn(battery_task(
            Arc::clone(channel),
            update_tx.clone(),
            stop_rx,
        )),
        ModuleId::Thermal => tokio::spawn(thermal_task(update_tx.clone(), stop_rx)),
        ModuleId::Ping => tokio::spawn(ping_task(
            Arc::clone(channel),
            update_tx.clone(),
            stop_rx,
        )),
    };
    ModuleHandle::new(stop_tx, task)
}
