use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::time::{timeout, Duration};

use super::session::HelperSession;

/// Program the channel binds to when none is configured.
pub const DEFAULT_HELPER: &str = "sh";

/// Commands hanging past this bound are treated as transport failures.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Umbrella availability/permission flags for the privileged channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// The helper program is reachable on this device.
    pub available: bool,
    /// The user has authorized privileged execution.
    pub permitted: bool,
}

impl ChannelState {
    pub fn is_ready(&self) -> bool {
        self.available && self.permitted
    }
}

/// Lifecycle of the live helper connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Remote command execution capability used by producers that need elevated data.
pub trait CommandChannel: Send + Sync + 'static {
    /// True when both availability and permission allow privileged calls.
    fn is_ready(&self) -> bool;

    /// Run a shell command on the helper, returning its trimmed stdout.
    ///
    /// Returns an empty string when the channel is unavailable, unauthorized, or
    /// the remote call fails; callers read that as "no data this cycle", never as
    /// a hard error.
    fn execute_command(&self, cmd: &str) -> impl Future<Output = String> + Send;
}

/// Channel to the elevated helper process.
///
/// All commands are serialized through one mutex: the helper is a shared stateful
/// process and concurrent commands would interleave on its output stream. The
/// availability/permission flags are read without taking the command lock.
pub struct ShellChannel {
    helper: String,
    state_tx: watch::Sender<ChannelState>,
    conn_tx: Arc<watch::Sender<ConnectionState>>,
    session: Arc<Mutex<Option<HelperSession>>>,
    /// Single-flight guard so concurrent callers never race a duplicate connect.
    connecting: Arc<AtomicBool>,
}

impl ShellChannel {
    pub fn new(helper: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::default());
        let (conn_tx, _) = watch::channel(ConnectionState::default());
        Self {
            helper: helper.into(),
            state_tx,
            conn_tx: Arc::new(conn_tx),
            session: Arc::new(Mutex::new(None)),
            connecting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Probe helper availability and connect when already authorized.
    pub fn init(&self) {
        let available = which::which(&self.helper).is_ok();
        self.set_available(available);
    }

    /// Re-probe availability on demand; losing the helper also revokes permission.
    pub fn refresh_state(&self) {
        self.init();
    }

    pub fn set_available(&self, available: bool) {
        self.state_tx.send_modify(|state| {
            state.available = available;
            if !available {
                state.permitted = false;
            }
        });
        if available {
            if self.is_ready() {
                self.connect();
            }
        } else {
            self.disconnect();
        }
    }

    /// Record the outcome of the platform authorization prompt.
    ///
    /// A denial is sticky: nothing reconnects until the user re-grants.
    pub fn set_permitted(&self, permitted: bool) {
        self.state_tx.send_modify(|state| state.permitted = permitted);
        if self.is_ready() {
            self.connect();
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    pub fn connection(&self) -> ConnectionState {
        *self.conn_tx.borrow()
    }

    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.conn_tx.subscribe()
    }

    async fn run_command(&self, cmd: &str) -> String {
        if !self.is_ready() {
            return String::new();
        }

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            drop(guard);
            // Connection lost or not yet established; kick off a reconnect so a
            // later cycle finds a live session.
            self.connect();
            return String::new();
        };

        let failure = match timeout(COMMAND_TIMEOUT, session.execute(cmd)).await {
            Ok(Ok(output)) => return output,
            Ok(Err(err)) => err.to_string(),
            Err(_) => "command timed out".to_string(),
        };
        log::warn!("helper command failed: {failure}");

        // The output stream can no longer be trusted after a failure; drop the
        // session and reconnect while the umbrella flags still allow it.
        *guard = None;
        drop(guard);
        let _ = self.conn_tx.send(ConnectionState::Disconnected);
        self.connect();
        String::new()
    }

    fn connect(&self) {
        if !self.is_ready() {
            return;
        }
        if self.connecting.swap(true, Ordering::SeqCst) {
            return;
        }

        let slot = Arc::clone(&self.session);
        let connecting = Arc::clone(&self.connecting);
        let conn_tx = Arc::clone(&self.conn_tx);
        let helper = self.helper.clone();
        tokio::spawn(async move {
            // A live session may have been restored while the guard was raced.
            if slot.lock().await.is_some() {
                connecting.store(false, Ordering::SeqCst);
                return;
            }

            let _ = conn_tx.send(ConnectionState::Connecting);
            match HelperSession::spawn(&helper).await {
                Ok(live) => {
                    log::info!(
                        "helper session connected (pid {})",
                        live.id().unwrap_or_default()
                    );
                    *slot.lock().await = Some(live);
                    let _ = conn_tx.send(ConnectionState::Connected);
                }
                Err(err) => {
                    log::warn!("helper session connect failed: {err}");
                    let _ = conn_tx.send(ConnectionState::Disconnected);
                }
            }
            connecting.store(false, Ordering::SeqCst);
        });
    }

    fn disconnect(&self) {
        // Uncontended case: drop the session in place.
        if let Ok(mut slot) = self.session.try_lock() {
            if slot.take().is_some() {
                log::info!("helper session disconnected");
            }
            let _ = self.conn_tx.send(ConnectionState::Disconnected);
            return;
        }

        // A command is in flight; tear the session down once it releases the lock.
        let slot = Arc::clone(&self.session);
        let conn_tx = Arc::clone(&self.conn_tx);
        tokio::spawn(async move {
            if slot.lock().await.take().is_some() {
                log::info!("helper session disconnected");
            }
            let _ = conn_tx.send(ConnectionState::Disconnected);
        });
    }
}

impl Default for ShellChannel {
    fn default() -> Self {
        Self::new(DEFAULT_HELPER)
    }
}

impl CommandChannel for ShellChannel {
    fn is_ready(&self) -> bool {
        self.state_tx.borrow().is_ready()
    }

    fn execute_command(&self, cmd: &str) -> impl Future<Output = String> + Send {
        self.run_command(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_ready_yields_empty_result() {
        let channel = ShellChannel::default();
        assert!(!channel.is_ready());
        assert_eq!(channel.execute_command("echo hi").await, "");
        // No connection attempt happens while the channel is gated.
        assert_eq!(channel.connection(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_availability_loss_revokes_permission() {
        let channel = ShellChannel::default();
        channel.set_available(true);
        channel.set_permitted(true);
        assert!(channel.is_ready());

        channel.set_available(false);
        let state = channel.state();
        assert!(!state.available);
        assert!(!state.permitted);

        // Availability coming back does not restore the grant.
        channel.set_available(true);
        assert!(!channel.is_ready());
    }

    #[tokio::test]
    async fn test_denial_is_sticky() {
        let channel = ShellChannel::default();
        channel.set_available(true);
        channel.set_permitted(false);
        assert!(!channel.is_ready());
        assert_eq!(channel.execute_command("id").await, "");
    }
}
