//! Channel factories and handles for the display session.

use super::types::{SessionCommand, SessionSnapshot};
use tokio::sync::{mpsc, watch};

/// Default buffer size for command channels.
///
/// Commands come from user interaction, so a small buffer is plenty.
pub const DEFAULT_CHANNEL_BUFFER: usize = 32;

/// Sender handle for SessionCommand events.
pub type SessionCommandSender = mpsc::Sender<SessionCommand>;
/// Receiver handle for SessionCommand events.
pub type SessionCommandReceiver = mpsc::Receiver<SessionCommand>;

/// Receiver handle for published session snapshots.
pub type SessionSnapshotReceiver = watch::Receiver<SessionSnapshot>;

/// Create a new SessionCommand channel.
///
/// Returns a (sender, receiver) pair. The sender can be cloned freely, e.g.
/// to let a parent controller push `PaymentCleared`.
pub fn session_command_channel() -> (SessionCommandSender, SessionCommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
