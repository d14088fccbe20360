use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::time::{timeout, Duration};

use framehud::core::engine::{FpsHistory, MetricsEngine, MetricsSnapshot};
use framehud::core::modules::{ModuleId, ModuleSet, ModuleToggles};
use framehud::shell::CommandChannel;

const PING_REPLY: &str = "64 bytes from 142.250.74.110: icmp_seq=1 ttl=115 time=12.4 ms";

/// Channel double with a fixed response per command.
struct FakeChannel {
    ready: AtomicBool,
    responses: Mutex<HashMap<String, String>>,
}

impl FakeChannel {
    fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
            responses: Mutex::new(HashMap::new()),
        }
    }

    fn respond(&self, cmd: &str, output: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(cmd.to_string(), output.to_string());
    }
}

impl CommandChannel for FakeChannel {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn execute_command(&self, cmd: &str) -> impl Future<Output = String> + Send {
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(cmd)
            .cloned()
            .unwrap_or_default();
        std::future::ready(response)
    }
}

async fn wait_for_snapshot<F>(
    rx: &mut watch::Receiver<MetricsSnapshot>,
    predicate: F,
) -> MetricsSnapshot
where
    F: Fn(&MetricsSnapshot) -> bool,
{
    timeout(Duration::from_secs(120), async {
        loop {
            let current = *rx.borrow_and_update();
            if predicate(&current) {
                return current;
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    })
    .await
    .expect("snapshot condition not reached")
}

async fn wait_for_history<F>(rx: &mut watch::Receiver<FpsHistory>, predicate: F) -> FpsHistory
where
    F: Fn(&FpsHistory) -> bool,
{
    timeout(Duration::from_secs(120), async {
        loop {
            let current = rx.borrow_and_update().clone();
            if predicate(&current) {
                return current;
            }
            rx.changed().await.expect("history channel closed");
        }
    })
    .await
    .expect("history condition not reached")
}

fn only(id: ModuleId) -> ModuleSet {
    [id].into_iter().collect()
}

#[tokio::test(start_paused = true)]
async fn test_ping_toggle_updates_then_resets() {
    let channel = Arc::new(FakeChannel::new(true));
    channel.respond("ping -c 1 google.com", PING_REPLY);

    let toggles = ModuleToggles::new(only(ModuleId::Ping));
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let mut rx = engine.snapshot();

    wait_for_snapshot(&mut rx, |s| s.ping_ms == 12).await;

    toggles.disable(ModuleId::Ping);
    wait_for_snapshot(&mut rx, |s| s.ping_ms == 0).await;

    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_disable_leaves_other_modules_untouched() {
    let channel = Arc::new(FakeChannel::new(true));
    channel.respond("ping -c 1 google.com", PING_REPLY);
    channel.respond("dumpsys battery | grep temperature", "  temperature: 280");

    let toggles = ModuleToggles::new([ModuleId::Ping, ModuleId::Temp].into_iter().collect());
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let mut rx = engine.snapshot();

    wait_for_snapshot(&mut rx, |s| s.ping_ms == 12 && s.battery_temp_c == 28.0).await;

    toggles.disable(ModuleId::Ping);
    let snapshot = wait_for_snapshot(&mut rx, |s| s.ping_ms == 0).await;
    assert_eq!(snapshot.battery_temp_c, 28.0);

    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_fps_flows_into_snapshot_and_history() {
    let channel = Arc::new(FakeChannel::new(true));
    channel.respond(
        "dumpsys SurfaceFlinger --timestats -dump",
        "stats:\naverageFPS = 59.9\nend",
    );

    let toggles = ModuleToggles::new(ModuleSet::new());
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let mut snapshot_rx = engine.snapshot();
    let mut history_rx = engine.fps_history();

    wait_for_snapshot(&mut snapshot_rx, |s| s.fps == 59).await;
    let history = wait_for_history(&mut history_rx, |h| h.len() >= 3).await;
    assert_eq!(history.latest(), Some(59));
    assert!(history.iter().all(|fps| fps == 59 || fps == 0));

    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_unready_channel_keeps_gated_metrics_neutral() {
    let channel = Arc::new(FakeChannel::new(false));

    let toggles = ModuleToggles::new(only(ModuleId::Ping));
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let rx = engine.snapshot();
    let mut history_rx = engine.fps_history();

    // Wait until the FPS producer has demonstrably cycled a few times, then
    // check that everything gated on the channel still reads neutral.
    let history = wait_for_history(&mut history_rx, |h| h.len() >= 3).await;
    assert!(history.iter().all(|fps| fps == 0));
    let snapshot = *rx.borrow();
    assert_eq!(snapshot.ping_ms, 0);
    assert_eq!(snapshot.fps, 0);

    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_reenable_restarts_producer() {
    let channel = Arc::new(FakeChannel::new(true));
    channel.respond("ping -c 1 google.com", PING_REPLY);

    let toggles = ModuleToggles::new(only(ModuleId::Ping));
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let mut rx = engine.snapshot();

    wait_for_snapshot(&mut rx, |s| s.ping_ms == 12).await;
    toggles.disable(ModuleId::Ping);
    wait_for_snapshot(&mut rx, |s| s.ping_ms == 0).await;
    toggles.enable(ModuleId::Ping);
    wait_for_snapshot(&mut rx, |s| s.ping_ms == 12).await;

    engine.shutdown();
}
