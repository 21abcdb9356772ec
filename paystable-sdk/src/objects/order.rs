//! Order and payment status types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::product::Product;
use crate::fiat::FiatAmount;

/// Payment state as reported by the merchant backend.
///
/// Values the client does not know are decoded as [`OrderStatus::Unknown`]
/// rather than failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Cleared,
    Rejected,
    Expired,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the payment can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cleared | Self::Rejected | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Cleared => write!(f, "cleared"),
            OrderStatus::Rejected => write!(f, "rejected"),
            OrderStatus::Expired => write!(f, "expired"),
            OrderStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Response body of `GET /orders/{order_id}/payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub status: OrderStatus,
    #[serde(default)]
    pub merchant_address: String,
    #[serde(default)]
    pub can_payout: bool,
    #[serde(default)]
    pub can_refund: bool,
    /// Payment event log, passed through untouched.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    /// On-chain transactions, passed through untouched.
    #[serde(default)]
    pub chain_txs: Vec<serde_json::Value>,
}

/// A product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOrder {
    pub quantity: u32,
    pub product: Product,
}

/// Response body of `GET /orders/{order_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub vasp_payment_reference: Option<String>,
    pub total_price: FiatAmount,
    pub currency: String,
    pub products: Vec<ProductOrder>,
    pub payment_status: PaymentStatus,
}

/// Body returned by the payout and refund endpoints (`{"status": "OK"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: String,
}

impl OperationResult {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
