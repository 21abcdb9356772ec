//! Product catalog types.

use serde::{Deserialize, Serialize};

use crate::fiat::FiatAmount;

/// A product offered by the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Global trade item number, the catalog key used at checkout.
    pub gtin: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price, scaled by [`crate::fiat::FIAT_SCALING_FACTOR`].
    pub price: FiatAmount,
    /// ISO 4217 currency code, e.g. `USD`.
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Response body of `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}
