//! Commands into and snapshots out of a display session.
//!
//! # Event Flow
//!
//! 1. The front end sends [`SessionCommand`]s -> `PaymentSessionController`
//! 2. The controller spawns the checkout fetch and, once paying, the status
//!    poller; both report back to the controller only
//! 3. The controller publishes a [`SessionSnapshot`] after every change

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, SessionCommandReceiver, SessionCommandSender, SessionSnapshotReceiver,
    session_command_channel,
};

pub use types::{SessionCommand, SessionId, SessionSnapshot};
