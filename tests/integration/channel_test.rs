use tokio::time::{timeout, Duration};

use framehud::shell::{CommandChannel, ConnectionState, ShellChannel};

async fn wait_connected(channel: &ShellChannel) {
    let mut conn = channel.subscribe_connection();
    timeout(Duration::from_secs(5), async {
        while *conn.borrow_and_update() != ConnectionState::Connected {
            conn.changed().await.expect("connection channel closed");
        }
    })
    .await
    .expect("helper never connected");
}

#[tokio::test]
async fn test_gated_channel_returns_empty() {
    let channel = ShellChannel::default();
    // Neither available nor permitted: fails closed without touching a helper.
    assert_eq!(channel.execute_command("echo hello").await, "");
    assert_eq!(channel.connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_commands_round_trip_once_connected() {
    let channel = ShellChannel::default();
    channel.init();
    channel.set_permitted(true);
    assert!(channel.is_ready());

    wait_connected(&channel).await;

    assert_eq!(channel.execute_command("echo hello").await, "hello");
    assert_eq!(channel.execute_command("echo 1 2 3").await, "1 2 3");
}

#[tokio::test]
async fn test_concurrent_commands_are_serialized() {
    let channel = ShellChannel::default();
    channel.init();
    channel.set_permitted(true);
    wait_connected(&channel).await;

    // The command mutex keeps replies from interleaving on the shared stream.
    let (one, two, three) = tokio::join!(
        channel.execute_command("echo one"),
        channel.execute_command("echo two"),
        channel.execute_command("echo three"),
    );
    assert_eq!(one, "one");
    assert_eq!(two, "two");
    assert_eq!(three, "three");
}

#[tokio::test]
async fn test_failed_command_yields_empty_not_error() {
    let channel = ShellChannel::default();
    channel.init();
    channel.set_permitted(true);
    wait_connected(&channel).await;

    // The command itself fails; the channel still reports "no data".
    assert_eq!(channel.execute_command("false").await, "");
    // The session survives ordinary command failures.
    assert_eq!(channel.execute_command("echo still-alive").await, "still-alive");
}

#[tokio::test]
async fn test_revoked_availability_gates_commands() {
    let channel = ShellChannel::default();
    channel.init();
    channel.set_permitted(true);
    wait_connected(&channel).await;

    channel.set_available(false);
    assert_eq!(channel.execute_command("echo hello").await, "");
    assert!(!channel.state().permitted);
}
