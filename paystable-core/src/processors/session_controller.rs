//! PaymentSessionController processor.
//!
//! The PaymentSessionController is responsible for:
//! - Receiving `SessionCommand`s from the front end
//! - Moving the session's [`PaymentState`] through its transitions
//! - Fetching payment processing details when a session opens, bounded by the
//!   request timeout and cancelled when the session closes
//! - Spawning a [`StatusPoller`] once the checkout view is shown
//! - Publishing a `SessionSnapshot` after every change

use crate::backend::CheckoutBackend;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::events::{
    DEFAULT_CHANNEL_BUFFER, SessionCommand, SessionCommandReceiver, SessionId, SessionSnapshot,
    SessionSnapshotReceiver,
};
use crate::flow::{ModalView, PaymentState, PaymentStateKind, TransitionError, ViewMode};
use crate::processors::status_poller::{PollOutcome, StatusPoller};
use paystable_sdk::objects::{PaymentProcessingDetails, Product};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Results reported back by tasks the controller spawned.
enum TaskOutcome {
    Fetched {
        session: SessionId,
        result: Result<PaymentProcessingDetails, FlowError>,
    },
    Polled {
        session: SessionId,
        order_id: String,
        outcome: PollOutcome,
    },
}

/// The currently open display session.
struct ActiveSession {
    id: SessionId,
    product: Product,
    state: PaymentState,
    view_mode: ViewMode,
    fetch_in_flight: bool,
    last_error: Option<String>,
    /// Set to `true` when the session ends. Every task spawned for the
    /// session watches it and stops on change.
    closed_tx: watch::Sender<bool>,
    /// Stops the status poller of the current `Paying` phase.
    poll_stop_tx: Option<watch::Sender<bool>>,
}

impl ActiveSession {
    /// Apply a transition, logging and ignoring invalid ones.
    fn apply(
        &mut self,
        transition: impl FnOnce(&PaymentState) -> Result<PaymentState, TransitionError>,
    ) -> bool {
        match transition(&self.state) {
            Ok(next) => {
                debug!(
                    session = %self.id,
                    from = %self.state.kind(),
                    to = %next.kind(),
                    "Payment state changed"
                );
                self.state = next;
                if self.state.kind() != PaymentStateKind::Paying {
                    self.stop_polling();
                }
                true
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Ignoring invalid transition");
                false
            }
        }
    }

    fn stop_polling(&mut self) {
        if let Some(poll_stop_tx) = self.poll_stop_tx.take() {
            poll_stop_tx.send_replace(true);
        }
    }

    /// End the session, cancelling its tasks.
    fn close(mut self) -> PaymentState {
        self.stop_polling();
        self.closed_tx.send_replace(true);
        self.state.close()
    }
}

/// Spawns the per-session background tasks.
struct TaskSpawner<B> {
    backend: Arc<B>,
    config: FlowConfig,
    outcome_tx: mpsc::Sender<TaskOutcome>,
}

impl<B: CheckoutBackend + 'static> TaskSpawner<B> {
    /// Fetch processing details for the session's product.
    ///
    /// The request future is dropped as soon as the session closes; a result
    /// that was already on its way is discarded by the controller.
    fn spawn_fetch(&self, session: &mut ActiveSession) {
        session.fetch_in_flight = true;

        let backend = Arc::clone(&self.backend);
        let outcome_tx = self.outcome_tx.clone();
        let mut closed_rx = session.closed_tx.subscribe();
        let gtin = session.product.gtin.clone();
        let timeout = self.config.request_timeout;
        let id = session.id;

        tokio::spawn(async move {
            let fetch = tokio::time::timeout(timeout, backend.checkout_one(&gtin));

            tokio::select! {
                biased;

                _ = closed_rx.changed() => {
                    debug!(session = %id, %gtin, "Session closed, checkout request abandoned");
                }

                result = fetch => {
                    let result = match result {
                        Ok(result) => result.map_err(FlowError::from),
                        Err(_) => Err(FlowError::Timeout(timeout)),
                    };
                    if outcome_tx
                        .send(TaskOutcome::Fetched { session: id, result })
                        .await
                        .is_err()
                    {
                        debug!(session = %id, "Controller gone, dropping checkout result");
                    }
                }
            }
        });
    }

    /// Poll the payment status of `order_id` until it settles or the session
    /// leaves `Paying`.
    fn spawn_poller(&self, session: &mut ActiveSession, order_id: String) {
        let poller = StatusPoller::new(
            Arc::clone(&self.backend),
            order_id.clone(),
            self.config.request_timeout,
        );
        let (poll_stop_tx, poll_stop_rx) = watch::channel(false);
        session.poll_stop_tx = Some(poll_stop_tx);
        let outcome_tx = self.outcome_tx.clone();
        let id = session.id;

        tokio::spawn(async move {
            let outcome = poller.run(poll_stop_rx).await;
            if outcome == PollOutcome::Abandoned {
                return;
            }
            let _ = outcome_tx
                .send(TaskOutcome::Polled {
                    session: id,
                    order_id,
                    outcome,
                })
                .await;
        });
    }
}

/// Drives display sessions from commands and backend results.
///
/// At most one session is open at a time. All state lives inside the
/// controller task; front ends observe it through [`subscribe`] and steer it
/// with [`SessionCommand`]s.
///
/// [`subscribe`]: PaymentSessionController::subscribe
pub struct PaymentSessionController<B> {
    tasks: TaskSpawner<B>,
    outcome_rx: mpsc::Receiver<TaskOutcome>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    session: Option<ActiveSession>,
    last_session_id: u64,
}

impl<B: CheckoutBackend + 'static> PaymentSessionController<B> {
    /// Create a new PaymentSessionController.
    ///
    /// # Arguments
    ///
    /// * `backend` - The merchant backend (or a double of it)
    /// * `config` - Timeout, polling and display settings
    pub fn new(backend: Arc<B>, config: FlowConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            tasks: TaskSpawner {
                backend,
                config,
                outcome_tx,
            },
            outcome_rx,
            snapshot_tx,
            session: None,
            last_session_id: 0,
        }
    }

    /// Receive a [`SessionSnapshot`] after every change.
    pub fn subscribe(&self) -> SessionSnapshotReceiver {
        self.snapshot_tx.subscribe()
    }

    /// Run the controller until shutdown is signaled or every command sender
    /// is dropped. Dropping the shutdown sender counts as a shutdown signal.
    pub async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut command_rx: SessionCommandReceiver,
    ) {
        info!("PaymentSessionController started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("PaymentSessionController received shutdown signal");
                        break;
                    }
                }

                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_outcome(outcome);
                }

                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        info!("SessionCommand channel closed");
                        break;
                    }
                },
            }
        }

        if let Some(session) = self.session.take() {
            session.close();
        }
        self.publish();

        info!("PaymentSessionController shutdown complete");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Open { product } => self.open(product),
            SessionCommand::Close => self.close(),
            SessionCommand::PaymentCleared { order_id } => self.payment_cleared(&order_id),
            SessionCommand::ScanQr => self.set_view_mode(ViewMode::ScanQr),
            SessionCommand::ChooseWallet => self.set_view_mode(ViewMode::ChooseWallet),
            SessionCommand::Retry => self.retry(),
        }
        self.publish();
    }

    fn open(&mut self, product: Product) {
        if let Some(session) = &self.session {
            warn!(
                session = %session.id,
                state = %session.state.kind(),
                gtin = %product.gtin,
                "Modal already open, ignoring Open"
            );
            return;
        }

        self.last_session_id += 1;
        let (closed_tx, _) = watch::channel(false);
        let mut session = ActiveSession {
            id: SessionId(self.last_session_id),
            product,
            state: PaymentState::Inactive,
            view_mode: ViewMode::default(),
            fetch_in_flight: false,
            last_error: None,
            closed_tx,
            poll_stop_tx: None,
        };

        if session.apply(PaymentState::open) {
            info!(session = %session.id, gtin = %session.product.gtin, "Display session opened");
            self.tasks.spawn_fetch(&mut session);
        }
        self.session = Some(session);
    }

    fn close(&mut self) {
        match self.session.take() {
            Some(session) => {
                let id = session.id;
                let from = session.state.kind();
                let state = session.close();
                info!(session = %id, %from, to = %state.kind(), "Display session closed");
            }
            None => debug!("No open session, ignoring Close"),
        }
    }

    fn payment_cleared(&mut self, order_id: &str) {
        let Some(session) = self.session.as_mut() else {
            warn!(%order_id, "PaymentCleared without an open session");
            return;
        };
        if session.apply(|state| state.payment_cleared(order_id)) {
            info!(session = %session.id, %order_id, "Payment cleared");
        }
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        match self.session.as_mut() {
            Some(session) if session.state.kind() == PaymentStateKind::Paying => {
                session.view_mode = mode;
            }
            _ => debug!(?mode, "Checkout view not shown, ignoring view switch"),
        }
    }

    fn retry(&mut self) {
        let Some(session) = self.session.as_mut() else {
            debug!("No open session, ignoring Retry");
            return;
        };
        if session.state.kind() != PaymentStateKind::FetchingProcessingDetails
            || session.fetch_in_flight
        {
            debug!(session = %session.id, state = %session.state.kind(), "Nothing to retry");
            return;
        }
        info!(session = %session.id, gtin = %session.product.gtin, "Retrying checkout request");
        session.last_error = None;
        self.tasks.spawn_fetch(session);
    }

    fn handle_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Fetched { session, result } => self.on_fetched(session, result),
            TaskOutcome::Polled {
                session,
                order_id,
                outcome,
            } => self.on_polled(session, &order_id, outcome),
        }
        self.publish();
    }

    fn on_fetched(&mut self, id: SessionId, result: Result<PaymentProcessingDetails, FlowError>) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            debug!(session = %id, "Discarding checkout result of a closed session");
            return;
        };
        session.fetch_in_flight = false;

        match result {
            Ok(details) => {
                let order_id = details.order_id.clone();
                if session.apply(|state| state.details_fetched(details)) {
                    session.view_mode = ViewMode::default();
                    info!(session = %id, %order_id, "Payment processing details received");
                    if self.tasks.config.poll_status {
                        self.tasks.spawn_poller(session, order_id);
                    }
                }
            }
            Err(e) => {
                error!(
                    session = %id,
                    gtin = %session.product.gtin,
                    error = %e,
                    "Failed to fetch payment processing details"
                );
                session.last_error = Some(e.to_string());
            }
        }
    }

    fn on_polled(&mut self, id: SessionId, order_id: &str, outcome: PollOutcome) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            debug!(session = %id, "Discarding poll result of a closed session");
            return;
        };

        match outcome {
            PollOutcome::Cleared => {
                if session.apply(|state| state.payment_cleared(order_id)) {
                    info!(session = %id, %order_id, "Payment cleared");
                }
            }
            PollOutcome::NotCleared(status) => {
                let e = FlowError::NotCleared(status);
                warn!(session = %id, %order_id, error = %e, "Payment will not clear");
                session.last_error = Some(e.to_string());
            }
            PollOutcome::Abandoned => {}
        }
    }

    fn publish(&self) {
        let snapshot = match &self.session {
            Some(session) => SessionSnapshot {
                session: Some(session.id),
                state: session.state.clone(),
                view: ModalView::project(
                    &session.state,
                    Some(&session.product),
                    session.view_mode,
                    self.tasks.config.demo_mode,
                ),
                last_error: session.last_error.clone(),
            },
            None => SessionSnapshot::default(),
        };

        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SessionCommandSender, session_command_channel};
    use crate::processors::test_backend::{
        CheckoutScript, ScriptedBackend, StatusScript, details,
    };
    use paystable_sdk::client::StatusCode;
    use paystable_sdk::fiat::FiatAmount;
    use paystable_sdk::objects::OrderStatus;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    struct Harness {
        commands: SessionCommandSender,
        snapshots: SessionSnapshotReceiver,
        shutdown_tx: watch::Sender<bool>,
        handle: JoinHandle<()>,
    }

    fn config(poll_status: bool) -> FlowConfig {
        FlowConfig {
            request_timeout: Duration::from_secs(60),
            poll_status,
            demo_mode: false,
        }
    }

    fn start(backend: Arc<ScriptedBackend>, config: FlowConfig) -> Harness {
        let controller = PaymentSessionController::new(backend, config);
        let snapshots = controller.subscribe();
        let (commands, command_rx) = session_command_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(controller.run(shutdown_rx, command_rx));
        Harness {
            commands,
            snapshots,
            shutdown_tx,
            handle,
        }
    }

    fn product(gtin: &str) -> Product {
        Product {
            gtin: gtin.to_string(),
            name: format!("Product {gtin}"),
            description: String::new(),
            price: FiatAmount::from_scaled(1_500_000),
            currency: "USD".to_string(),
            image_url: None,
        }
    }

    impl Harness {
        async fn send(&self, command: SessionCommand) {
            self.commands.send(command).await.unwrap();
        }

        async fn wait_until(
            &mut self,
            condition: impl FnMut(&SessionSnapshot) -> bool,
        ) -> SessionSnapshot {
            tokio::time::timeout(Duration::from_secs(3600), self.snapshots.wait_for(condition))
                .await
                .expect("snapshot condition not reached")
                .expect("controller gone")
                .clone()
        }
    }

    fn order_id(snapshot: &SessionSnapshot) -> Option<&str> {
        snapshot
            .state
            .processing_details()
            .map(|d| d.order_id.as_str())
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_fetch_toggle_clear_close() {
        let backend =
            Arc::new(ScriptedBackend::default().with_checkouts([CheckoutScript::Answer(details("o-1"))]));
        let mut h = start(backend, config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let paying = h
            .wait_until(|s| s.state.kind() == PaymentStateKind::Paying)
            .await;
        assert_eq!(paying.session, Some(SessionId(1)));
        match &paying.view {
            ModalView::Checkout { title, view } => {
                assert_eq!(title, "Product g-1");
                assert_eq!(view.mode, ViewMode::ChooseWallet);
                assert_eq!(view.deep_link, "diem://pay/o-1");
                assert_eq!(view.fiat_price.scaled(), 1_500_000);
            }
            other => panic!("unexpected view: {other:?}"),
        }

        h.send(SessionCommand::ScanQr).await;
        let qr = h
            .wait_until(|s| matches!(&s.view, ModalView::Checkout { view, .. } if view.mode == ViewMode::ScanQr))
            .await;
        assert_eq!(qr.state, paying.state);

        h.send(SessionCommand::PaymentCleared {
            order_id: "o-1".to_string(),
        })
        .await;
        let cleared = h
            .wait_until(|s| s.state == PaymentState::PaymentCleared)
            .await;
        assert!(matches!(cleared.view, ModalView::Cleared { .. }));

        h.send(SessionCommand::Close).await;
        let closed = h.wait_until(|s| s.session.is_none()).await;
        assert_eq!(closed, SessionSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_abandons_in_flight_request() {
        let release = Arc::new(Notify::new());
        let dropped = Arc::new(AtomicBool::new(false));
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([
            CheckoutScript::Gate {
                details: details("stale"),
                release: Arc::clone(&release),
                dropped: Arc::clone(&dropped),
            },
            CheckoutScript::Answer(details("fresh")),
        ]));
        let mut h = start(Arc::clone(&backend), config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.wait_until(|s| matches!(s.view, ModalView::Loading { .. }))
            .await;

        h.send(SessionCommand::Close).await;
        h.wait_until(|s| s.session.is_none()).await;

        // The request future itself goes away, not just its result.
        for _ in 0..100 {
            if dropped.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(dropped.load(Ordering::SeqCst));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let paying = h
            .wait_until(|s| s.state.kind() == PaymentStateKind::Paying)
            .await;
        assert_eq!(paying.session, Some(SessionId(2)));
        assert_eq!(order_id(&paying), Some("fresh"));

        release.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(order_id(&h.snapshots.borrow()), Some("fresh"));
        assert_eq!(backend.checkout_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported_and_retry_recovers() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([
            CheckoutScript::Fail(StatusCode::BAD_GATEWAY),
            CheckoutScript::Answer(details("o-1")),
        ]));
        let mut h = start(Arc::clone(&backend), config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let failed = h.wait_until(|s| s.last_error.is_some()).await;
        assert_eq!(failed.state, PaymentState::FetchingProcessingDetails);
        assert!(matches!(failed.view, ModalView::Loading { .. }));
        assert!(failed.last_error.unwrap().contains("502"));

        h.send(SessionCommand::Retry).await;
        let paying = h
            .wait_until(|s| s.state.kind() == PaymentStateKind::Paying)
            .await;
        assert_eq!(paying.last_error, None);
        assert_eq!(backend.checkout_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_ignored_while_request_in_flight() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([CheckoutScript::Hang]));
        let mut h = start(Arc::clone(&backend), config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.wait_until(|s| s.session.is_some()).await;
        h.send(SessionCommand::Retry).await;
        h.send(SessionCommand::Close).await;
        h.wait_until(|s| s.session.is_none()).await;

        assert_eq!(backend.checkout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([CheckoutScript::Hang]));
        let mut h = start(
            backend,
            FlowConfig {
                request_timeout: Duration::from_secs(5),
                ..config(false)
            },
        );

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let timed_out = h.wait_until(|s| s.last_error.is_some()).await;
        assert_eq!(
            timed_out.last_error.as_deref(),
            Some("backend did not answer within 5s")
        );
        assert_eq!(timed_out.state, PaymentState::FetchingProcessingDetails);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_poller_clears_payment() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_checkouts([CheckoutScript::Answer(details("o-1"))])
                .with_statuses([
                    StatusScript::Status(OrderStatus::Created),
                    StatusScript::Status(OrderStatus::Created),
                    StatusScript::Status(OrderStatus::Cleared),
                ]),
        );
        let mut h = start(Arc::clone(&backend), config(true));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let cleared = h
            .wait_until(|s| s.state == PaymentState::PaymentCleared)
            .await;
        assert_eq!(
            cleared.view,
            ModalView::Cleared {
                title: "Product g-1".to_string()
            }
        );
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_payment_is_reported() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_checkouts([CheckoutScript::Answer(details("o-1"))])
                .with_statuses([StatusScript::Status(OrderStatus::Rejected)]),
        );
        let mut h = start(backend, config(true));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        let rejected = h.wait_until(|s| s.last_error.is_some()).await;
        assert_eq!(rejected.last_error.as_deref(), Some("payment rejected"));
        assert_eq!(rejected.state.kind(), PaymentStateKind::Paying);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignores_foreign_clearance_and_second_open() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([
            CheckoutScript::Answer(details("o-1")),
            CheckoutScript::Answer(details("o-2")),
        ]));
        let mut h = start(Arc::clone(&backend), config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.wait_until(|s| s.state.kind() == PaymentStateKind::Paying)
            .await;

        h.send(SessionCommand::PaymentCleared {
            order_id: "someone-else".to_string(),
        })
        .await;
        h.send(SessionCommand::Open {
            product: product("g-2"),
        })
        .await;
        // Commands are handled in order; the view switch proves the two
        // above were processed.
        h.send(SessionCommand::ScanQr).await;
        let after = h
            .wait_until(|s| matches!(&s.view, ModalView::Checkout { view, .. } if view.mode == ViewMode::ScanQr))
            .await;

        assert_eq!(after.session, Some(SessionId(1)));
        assert_eq!(order_id(&after), Some("o-1"));
        assert_eq!(backend.checkout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_switch_ignored_while_loading() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([
            CheckoutScript::Fail(StatusCode::INTERNAL_SERVER_ERROR),
        ]));
        let mut h = start(backend, config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.send(SessionCommand::ScanQr).await;
        let failed = h.wait_until(|s| s.last_error.is_some()).await;
        assert!(matches!(failed.view, ModalView::Loading { .. }));

        // Cleared before the checkout view exists is not a valid transition.
        h.send(SessionCommand::PaymentCleared {
            order_id: "o-1".to_string(),
        })
        .await;
        h.send(SessionCommand::Close).await;
        let closed = h.wait_until(|s| s.session.is_none()).await;
        assert_eq!(closed.state, PaymentState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_controller() {
        let backend = Arc::new(ScriptedBackend::default().with_checkouts([CheckoutScript::Hang]));
        let mut h = start(backend, config(false));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.wait_until(|s| s.session.is_some()).await;

        h.shutdown_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), h.handle)
            .await
            .expect("controller did not stop")
            .unwrap();
        assert_eq!(*h.snapshots.borrow(), SessionSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_commands_stops_controller() {
        let h = start(Arc::new(ScriptedBackend::default()), config(false));
        let Harness {
            commands,
            handle,
            shutdown_tx: _shutdown_tx,
            ..
        } = h;

        drop(commands);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("controller did not stop")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_after_external_clearance() {
        // Status stays `created` for as long as anyone asks.
        let backend = Arc::new(
            ScriptedBackend::default().with_checkouts([CheckoutScript::Answer(details("o-1"))]),
        );
        let mut h = start(Arc::clone(&backend), config(true));

        h.send(SessionCommand::Open {
            product: product("g-1"),
        })
        .await;
        h.wait_until(|s| s.state.kind() == PaymentStateKind::Paying)
            .await;
        h.send(SessionCommand::PaymentCleared {
            order_id: "o-1".to_string(),
        })
        .await;
        h.wait_until(|s| s.state == PaymentState::PaymentCleared)
            .await;
        let at_clearance = backend.status_calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(backend.status_calls.load(Ordering::SeqCst), at_clearance);
        assert_eq!(h.snapshots.borrow().state, PaymentState::PaymentCleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_results_of_closed_session_are_discarded() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut controller = PaymentSessionController::new(backend, config(false));
        let snapshots = controller.subscribe();

        controller.handle_command(SessionCommand::Open {
            product: product("g-1"),
        });
        controller.handle_command(SessionCommand::Close);
        controller.handle_command(SessionCommand::Open {
            product: product("g-1"),
        });
        assert_eq!(snapshots.borrow().session, Some(SessionId(2)));

        // Answers for session #1 that were already queued when it closed.
        controller.handle_outcome(TaskOutcome::Fetched {
            session: SessionId(1),
            result: Ok(details("stale")),
        });
        controller.handle_outcome(TaskOutcome::Polled {
            session: SessionId(1),
            order_id: "stale".to_string(),
            outcome: PollOutcome::Cleared,
        });

        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.session, Some(SessionId(2)));
        assert_eq!(snapshot.state, PaymentState::FetchingProcessingDetails);
        assert_eq!(snapshot.last_error, None);

        controller.handle_outcome(TaskOutcome::Fetched {
            session: SessionId(2),
            result: Ok(details("fresh")),
        });
        assert_eq!(order_id(&snapshots.borrow()), Some("fresh"));
    }
}
