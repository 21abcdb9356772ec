//! Event type definitions for the display session.

use crate::flow::{ModalView, PaymentState};
use paystable_sdk::objects::Product;

/// Identifier of one display session (one open-to-close lifetime of the
/// modal). Strictly increasing within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands accepted by the
/// [`PaymentSessionController`](crate::processors::PaymentSessionController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Open the modal for `product` and start fetching processing details.
    Open { product: Product },
    /// Close the modal, abandoning whatever is in flight.
    Close,
    /// The payment for `order_id` cleared (pushed by the embedding
    /// application or the status poller).
    PaymentCleared { order_id: String },
    /// Switch the checkout view to the QR code.
    ScanQr,
    /// Switch the checkout view to the wallet list.
    ChooseWallet,
    /// Re-issue a checkout request that failed.
    Retry,
}

/// What a front end needs to render, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// `None` when no session is open.
    pub session: Option<SessionId>,
    pub state: PaymentState,
    pub view: ModalView,
    /// Last failure of this session, rendered for display.
    pub last_error: Option<String>,
}
