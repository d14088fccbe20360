use std::collections::HashMap;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::modules::{ModuleId, ModuleSet};

/// Handle to one running producer task.
pub(crate) struct ModuleHandle {
    stop_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl ModuleHandle {
    pub(crate) fn new(stop_tx: broadcast::Sender<()>, task: JoinHandle<()>) -> Self {
        Self { stop_tx, task }
    }

    /// Signal the producer loop to exit at its next suspension point.
    pub(crate) fn stop(self) {
        let _ = self.stop_tx.send(());
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Mapping from module identifier to its running producer.
///
/// An identifier is present iff the module is enabled and its task is alive;
/// entries are removed synchronously with producer cancellation.
#[derive(Default)]
pub(crate) struct ProducerRegistry {
    running: HashMap<ModuleId, ModuleHandle>,
}

impl ProducerRegistry {
    /// Bring the running set in line with `desired`.
    ///
    /// Idempotent and re-entrant: modules already in their desired state are
    /// untouched, with no restart and no duplicate start. A producer whose task died
    /// is replaced. Returns the modules that were stopped so the caller can
    /// reset their snapshot fields in the same breath.
    pub(crate) fn reconcile(
        &mut self,
        desired: &ModuleSet,
        mut start: impl FnMut(ModuleId) -> ModuleHandle,
    ) -> Vec<ModuleId> {
        let mut stopped = Vec::new();
        for id in ModuleId::ALL {
            if desired.contains(&id) {
                let alive = self
                    .running
                    .get(&id)
                    .map(ModuleHandle::is_alive)
                    .unwrap_or(false);
                if !alive {
                    if let Some(stale) = self.running.remove(&id) {
                        stale.stop();
                    }
                    log::debug!("starting {id} producer");
                    self.running.insert(id, start(id));
                }
            } else if let Some(handle) = self.running.remove(&id) {
                log::debug!("stopping {id} producer");
                handle.stop();
                stopped.push(id);
            }
        }
        stopped
    }

    pub(crate) fn stop_all(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.stop();
        }
    }

    pub(crate) fn running_modules(&self) -> ModuleSet {
        self.running.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A handle whose task just parks until stopped, counting starts.
    fn counting_start(counter: Arc<AtomicUsize>) -> impl FnMut(ModuleId) -> ModuleHandle {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            let (stop_tx, mut stop_rx) = broadcast::channel(1);
            let task = tokio::spawn(async move {
                let _ = stop_rx.recv().await;
            });
            ModuleHandle::new(stop_tx, task)
        }
    }

    fn set(ids: &[ModuleId]) -> ModuleSet {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let starts = Arc::new(AtomicUsize::new(0));
        let mut registry = ProducerRegistry::default();
        let desired = set(&[ModuleId::Cpu, ModuleId::Ping]);

        for _ in 0..5 {
            let stopped = registry.reconcile(&desired, counting_start(Arc::clone(&starts)));
            assert!(stopped.is_empty());
        }

        // Two modules, one start each, no matter how often we reconcile.
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(registry.running_modules(), desired);
    }

    #[tokio::test]
    async fn test_toggle_sequences_converge() {
        let starts = Arc::new(AtomicUsize::new(0));
        let mut registry = ProducerRegistry::default();

        let sequences = [
            set(&[ModuleId::Cpu]),
            set(&[ModuleId::Cpu, ModuleId::Ram, ModuleId::Net]),
            set(&[ModuleId::Ram]),
            ModuleSet::new(),
            set(&[ModuleId::Thermal, ModuleId::Temp]),
        ];
        for desired in &sequences {
            registry.reconcile(desired, counting_start(Arc::clone(&starts)));
            assert_eq!(&registry.running_modules(), desired);
        }
    }

    #[tokio::test]
    async fn test_disable_reports_stopped_module() {
        let starts = Arc::new(AtomicUsize::new(0));
        let mut registry = ProducerRegistry::default();

        registry.reconcile(
            &set(&[ModuleId::Cpu, ModuleId::Ping]),
            counting_start(Arc::clone(&starts)),
        );
        let stopped = registry.reconcile(
            &set(&[ModuleId::Cpu]),
            counting_start(Arc::clone(&starts)),
        );
        assert_eq!(stopped, vec![ModuleId::Ping]);
        assert_eq!(registry.running_modules(), set(&[ModuleId::Cpu]));
    }

    #[tokio::test]
    async fn test_dead_producer_is_replaced() {
        let starts = Arc::new(AtomicUsize::new(0));
        let mut registry = ProducerRegistry::default();
        let desired = set(&[ModuleId::Cpu]);

        // First producer exits immediately, simulating a crashed task.
        registry.reconcile(&desired, |_| {
            let (stop_tx, _) = broadcast::channel(1);
            ModuleHandle::new(stop_tx, tokio::spawn(async {}))
        });
        tokio::task::yield_now().await;

        registry.reconcile(&desired, counting_start(Arc::clone(&starts)));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(registry.running_modules(), desired);
    }

    #[tokio::test]
    async fn test_stop_all_clears_registry() {
        let starts = Arc::new(AtomicUsize::new(0));
        let mut registry = ProducerRegistry::default();
        registry.reconcile(
            &set(&[ModuleId::Cpu, ModuleId::Ram, ModuleId::Ping]),
            counting_start(Arc::clone(&starts)),
        );

        registry.stop_all();
        assert!(registry.running_modules().is_empty());
    }
}
