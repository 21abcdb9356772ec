//! The seam between the display flow and the merchant backend.

use async_trait::async_trait;
use paystable_sdk::client::{BackendClient, ClientError};
use paystable_sdk::objects::{PaymentProcessingDetails, PaymentStatus};

/// Backend operations the display flow depends on.
///
/// Implemented by the SDK [`BackendClient`]; tests substitute scripted
/// doubles.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// Start a payment for one unit of the product identified by `gtin`.
    async fn checkout_one(&self, gtin: &str) -> Result<PaymentProcessingDetails, ClientError>;

    /// Current payment status of `order_id`.
    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatus, ClientError>;
}

#[async_trait]
impl CheckoutBackend for BackendClient {
    async fn checkout_one(&self, gtin: &str) -> Result<PaymentProcessingDetails, ClientError> {
        BackendClient::checkout_one(self, gtin).await
    }

    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatus, ClientError> {
        self.get_payment_status(order_id).await
    }
}
