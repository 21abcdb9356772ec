//! StatusPoller processor.
//!
//! The StatusPoller is responsible for:
//! - Polling the payment status of the order shown in the checkout view
//! - Backing off over time using [`poll_interval`]
//! - Stopping as soon as the payment reaches a terminal status or its stop
//!   handle fires (the display session left `Paying` or closed)

use crate::backend::CheckoutBackend;
use crate::error::FlowError;
use crate::utils::poll_interval::poll_interval;
use paystable_sdk::objects::OrderStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// How a polling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The backend reported the payment as cleared.
    Cleared,
    /// The payment ended without clearing (`rejected`, `expired`).
    NotCleared(OrderStatus),
    /// The display session closed first.
    Abandoned,
}

/// Polls the backend until the payment of one order settles.
pub struct StatusPoller<B: ?Sized> {
    backend: Arc<B>,
    order_id: String,
    request_timeout: Duration,
}

impl<B: CheckoutBackend + ?Sized> StatusPoller<B> {
    pub fn new(backend: Arc<B>, order_id: String, request_timeout: Duration) -> Self {
        Self {
            backend,
            order_id,
            request_timeout,
        }
    }

    /// Poll until a terminal status or until `stop_rx` changes or its sender
    /// is dropped.
    ///
    /// Poll failures (transport errors, timeouts, unknown statuses) are
    /// logged and polling continues.
    pub async fn run(self, mut stop_rx: watch::Receiver<bool>) -> PollOutcome {
        let started = Instant::now();
        info!(order_id = %self.order_id, "StatusPoller started");

        loop {
            let interval = poll_interval(started.elapsed());

            tokio::select! {
                biased;

                _ = stop_rx.changed() => {
                    debug!(order_id = %self.order_id, "Polling no longer needed, StatusPoller stopping");
                    return PollOutcome::Abandoned;
                }

                status = self.poll_after(interval) => match status {
                    Ok(OrderStatus::Cleared) => {
                        info!(order_id = %self.order_id, "Payment cleared");
                        return PollOutcome::Cleared;
                    }
                    Ok(status @ (OrderStatus::Rejected | OrderStatus::Expired)) => {
                        warn!(order_id = %self.order_id, %status, "Payment ended without clearing");
                        return PollOutcome::NotCleared(status);
                    }
                    Ok(status) => {
                        debug!(order_id = %self.order_id, %status, ?interval, "Payment not cleared yet");
                    }
                    Err(e) => {
                        warn!(order_id = %self.order_id, error = %e, "Failed to poll payment status");
                    }
                }
            }
        }
    }

    async fn poll_after(&self, interval: Duration) -> Result<OrderStatus, FlowError> {
        tokio::time::sleep(interval).await;
        match tokio::time::timeout(
            self.request_timeout,
            self.backend.payment_status(&self.order_id),
        )
        .await
        {
            Ok(result) => Ok(result?.status),
            Err(_) => Err(FlowError::Timeout(self.request_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::test_backend::{ScriptedBackend, StatusScript};
    use std::sync::atomic::Ordering;

    fn poller(backend: &Arc<ScriptedBackend>) -> StatusPoller<ScriptedBackend> {
        StatusPoller::new(Arc::clone(backend), "o-1".to_string(), Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_cleared() {
        let backend = Arc::new(ScriptedBackend::default().with_statuses([
            StatusScript::Status(OrderStatus::Created),
            StatusScript::Status(OrderStatus::Unknown),
            StatusScript::Status(OrderStatus::Cleared),
        ]));
        let (_closed_tx, closed_rx) = watch::channel(false);

        let started = Instant::now();
        let outcome = poller(&backend).run(closed_rx).await;

        assert_eq!(outcome, PollOutcome::Cleared);
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_stop_polling() {
        let backend = Arc::new(ScriptedBackend::default().with_statuses([
            StatusScript::Fail,
            StatusScript::Hang,
            StatusScript::Status(OrderStatus::Expired),
        ]));
        let (_closed_tx, closed_rx) = watch::channel(false);

        let outcome = poller(&backend).run(closed_rx).await;

        assert_eq!(outcome, PollOutcome::NotCleared(OrderStatus::Expired));
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_close_abandons() {
        let backend = Arc::new(ScriptedBackend::default());
        let (closed_tx, closed_rx) = watch::channel(false);

        let handle = tokio::spawn(poller(&backend).run(closed_rx));
        tokio::time::sleep(Duration::from_secs(7)).await;
        closed_tx.send_replace(true);

        assert_eq!(handle.await.unwrap(), PollOutcome::Abandoned);
        // Polled at 2s, 4s and 6s, nothing after the close.
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 3);
    }
}
