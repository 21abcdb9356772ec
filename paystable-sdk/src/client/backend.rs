//! Merchant backend client (checkout widget → merchant backend).

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::ClientError;
use crate::objects::{
    CheckoutRequest, OperationResult, OrderDetails, PaymentProcessingDetails, PaymentStatus,
    Product, ProductList,
};

/// Typed HTTP client for the merchant backend API.
///
/// Endpoints are resolved relative to `base_url`, so a backend mounted under a
/// prefix (`https://shop.example.com/api/`) works the same as one mounted at
/// the root.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new `BackendClient`.
    ///
    /// * `base_url` – root URL of the merchant backend API. A trailing slash
    ///   is added when missing.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /products` – the merchant's product catalog.
    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint(&["products"])?;
        let resp = self.http.get(url).send().await?;
        let list: ProductList = parse_response(resp).await?;
        Ok(list.products)
    }

    /// `POST /payments` – start a payment for the given items.
    pub async fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<PaymentProcessingDetails, ClientError> {
        let url = self.endpoint(&["payments"])?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// Start a payment for a single unit of one product.
    pub async fn checkout_one(&self, gtin: &str) -> Result<PaymentProcessingDetails, ClientError> {
        self.checkout(&CheckoutRequest::single(gtin)).await
    }

    /// `GET /orders/{order_id}` – order contents and payment status.
    pub async fn get_order_details(&self, order_id: &str) -> Result<OrderDetails, ClientError> {
        let url = self.endpoint(&["orders", order_id])?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /orders/{order_id}/payment` – poll the payment status of an order.
    pub async fn get_payment_status(&self, order_id: &str) -> Result<PaymentStatus, ClientError> {
        let url = self.endpoint(&["orders", order_id, "payment"])?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /payments/{payment_id}/payout` – request a payout of a cleared
    /// payment.
    pub async fn payout(&self, payment_id: Uuid) -> Result<OperationResult, ClientError> {
        let url = self.endpoint(&["payments", &payment_id.to_string(), "payout"])?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /payments/{payment_id}/refund` – refund a payment.
    pub async fn refund(&self, payment_id: Uuid) -> Result<OperationResult, ClientError> {
        let url = self.endpoint(&["payments", &payment_id.to_string(), "refund"])?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
