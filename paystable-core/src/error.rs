//! Errors surfaced by the payment display flow.

use paystable_sdk::client::ClientError;
use paystable_sdk::objects::OrderStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving a display session.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The backend call failed.
    #[error("backend request failed: {0}")]
    Backend(#[from] ClientError),

    /// The backend did not answer in time.
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    /// The payment reached a terminal status other than cleared.
    #[error("payment {0}")]
    NotCleared(OrderStatus),
}
