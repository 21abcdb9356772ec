//! Checkout request and payment processing details.

use serde::{Deserialize, Serialize};

/// A line of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub gtin: String,
    pub quantity: u32,
}

/// Request body of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// A request for exactly one unit of a single product.
    pub fn single(gtin: impl Into<String>) -> Self {
        Self {
            items: vec![CheckoutItem {
                gtin: gtin.into(),
                quantity: 1,
            }],
        }
    }
}

/// Everything the checkout view needs to let the user pay.
///
/// Created by the backend in response to a checkout request and held for the
/// lifetime of one display session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProcessingDetails {
    /// Merchant order identifier. The backend emits it as `order_id`.
    #[serde(alias = "order_id")]
    pub order_id: String,
    /// Payload to encode into the QR code.
    pub qr: String,
    /// URI that opens a wallet app pre-populated with the payment.
    pub deep_link: String,
    /// Wallet choices, in the order they should be offered.
    #[serde(default)]
    pub wallet_links: Vec<WalletLink>,
}

/// A named option routing the user to a specific wallet application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletLink {
    pub wallet_name: String,
    pub link: String,
    pub logo: WalletLogo,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletLogo {
    pub image: String,
    pub alt: String,
}
