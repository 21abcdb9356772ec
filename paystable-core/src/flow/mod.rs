//! The payment display flow as plain data.
//!
//! [`PaymentState`] is the state machine of one display session;
//! [`CheckoutView`] and [`ModalView`] are what a front end renders for it.
//! Nothing in here performs I/O; the
//! [`PaymentSessionController`](crate::processors::PaymentSessionController)
//! drives these types from backend results and user commands.

mod state;
mod view;

pub use state::{FlowEvent, PaymentState, PaymentStateKind, TransitionError};
pub use view::{CheckoutView, ModalView, ViewMode};
