//! Display flow configuration.

use std::time::Duration;

/// Runtime knobs of the payment display flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    /// Upper bound for each backend call (checkout and status polls).
    pub request_timeout: Duration,
    /// Whether to poll the payment status once the checkout view is shown.
    ///
    /// When disabled, the embedding application reports clearance itself via
    /// [`SessionCommand::PaymentCleared`](crate::events::SessionCommand::PaymentCleared).
    pub poll_status: bool,
    /// Passed through to the checkout view.
    pub demo_mode: bool,
}

impl FlowConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            poll_status: true,
            demo_mode: false,
        }
    }
}
