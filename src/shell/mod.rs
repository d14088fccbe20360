//! Privileged command execution channel.
//!
//! Producers that need elevated data go through a single serialized channel to an
//! external helper process; everything here fails closed to an empty result.

mod channel;
mod session;

pub use channel::{ChannelState, CommandChannel, ConnectionState, ShellChannel, DEFAULT_HELPER};
pub use session::HelperSession;
