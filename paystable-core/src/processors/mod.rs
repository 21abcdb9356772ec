//! Event processors for the payment display flow.
//!
//! - `PaymentSessionController`: Receives `SessionCommand`s, publishes
//!   `SessionSnapshot`s, spawns the tasks of each display session
//! - `StatusPoller`: Polls the payment status of the order being paid

pub mod session_controller;
pub mod status_poller;

#[cfg(test)]
mod test_backend;

pub use session_controller::PaymentSessionController;
pub use status_poller::{PollOutcome, StatusPoller};
