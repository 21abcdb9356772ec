//! Scripted [`CheckoutBackend`] double shared by the processor tests.

use crate::backend::CheckoutBackend;
use async_trait::async_trait;
use paystable_sdk::client::{ClientError, StatusCode};
use paystable_sdk::objects::{OrderStatus, PaymentProcessingDetails, PaymentStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub enum CheckoutScript {
    Answer(PaymentProcessingDetails),
    Fail(StatusCode),
    /// Never resolves.
    Hang,
    /// Resolves once `release` is notified; `dropped` is set when the request
    /// future goes away, completed or not.
    Gate {
        details: PaymentProcessingDetails,
        release: Arc<Notify>,
        dropped: Arc<AtomicBool>,
    },
}

pub enum StatusScript {
    Status(OrderStatus),
    Fail,
    Hang,
}

#[derive(Default)]
pub struct ScriptedBackend {
    checkouts: Mutex<VecDeque<CheckoutScript>>,
    statuses: Mutex<VecDeque<StatusScript>>,
    pub checkout_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn with_checkouts(self, scripts: impl IntoIterator<Item = CheckoutScript>) -> Self {
        self.checkouts.lock().unwrap().extend(scripts);
        self
    }

    pub fn with_statuses(self, scripts: impl IntoIterator<Item = StatusScript>) -> Self {
        self.statuses.lock().unwrap().extend(scripts);
        self
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn api_error(status: StatusCode) -> ClientError {
    ClientError::Api {
        status,
        body: "scripted failure".to_string(),
    }
}

#[async_trait]
impl CheckoutBackend for ScriptedBackend {
    async fn checkout_one(&self, _gtin: &str) -> Result<PaymentProcessingDetails, ClientError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .checkouts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CheckoutScript::Hang);
        match script {
            CheckoutScript::Answer(details) => Ok(details),
            CheckoutScript::Fail(status) => Err(api_error(status)),
            CheckoutScript::Hang => std::future::pending().await,
            CheckoutScript::Gate {
                details,
                release,
                dropped,
            } => {
                let _flag = DropFlag(dropped);
                release.notified().await;
                Ok(details)
            }
        }
    }

    async fn payment_status(&self, _order_id: &str) -> Result<PaymentStatus, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StatusScript::Status(OrderStatus::Created));
        match script {
            StatusScript::Status(status) => Ok(PaymentStatus {
                status,
                merchant_address: String::new(),
                can_payout: false,
                can_refund: false,
                events: vec![],
                chain_txs: vec![],
            }),
            StatusScript::Fail => Err(api_error(StatusCode::SERVICE_UNAVAILABLE)),
            StatusScript::Hang => std::future::pending().await,
        }
    }
}

pub fn details(order_id: &str) -> PaymentProcessingDetails {
    PaymentProcessingDetails {
        order_id: order_id.to_string(),
        qr: format!("diem://qr/{order_id}"),
        deep_link: format!("diem://pay/{order_id}"),
        wallet_links: vec![],
    }
}
