use paystable_sdk::objects::PaymentProcessingDetails;
use thiserror::Error;

/// State of one display session.
///
/// `Inactive → FetchingProcessingDetails → Paying → PaymentCleared`, with
/// [`close`](PaymentState::close) returning to `Inactive` from anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaymentState {
    #[default]
    Inactive,
    FetchingProcessingDetails,
    Paying(PaymentProcessingDetails),
    PaymentCleared,
}

/// Data-less discriminant of [`PaymentState`], for logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStateKind {
    Inactive,
    FetchingProcessingDetails,
    Paying,
    PaymentCleared,
}

impl std::fmt::Display for PaymentStateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStateKind::Inactive => write!(f, "inactive"),
            PaymentStateKind::FetchingProcessingDetails => write!(f, "fetchingProcessingDetails"),
            PaymentStateKind::Paying => write!(f, "paying"),
            PaymentStateKind::PaymentCleared => write!(f, "paymentCleared"),
        }
    }
}

/// Events that move a session forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEvent {
    Open,
    DetailsFetched,
    PaymentCleared,
}

impl std::fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEvent::Open => write!(f, "open"),
            FlowEvent::DetailsFetched => write!(f, "details fetched"),
            FlowEvent::PaymentCleared => write!(f, "payment cleared"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot apply '{event}' in state {from}")]
    Invalid {
        from: PaymentStateKind,
        event: FlowEvent,
    },

    #[error("payment cleared for order {actual}, but order {expected} is being paid")]
    OrderMismatch { expected: String, actual: String },
}

impl PaymentState {
    pub fn kind(&self) -> PaymentStateKind {
        match self {
            PaymentState::Inactive => PaymentStateKind::Inactive,
            PaymentState::FetchingProcessingDetails => PaymentStateKind::FetchingProcessingDetails,
            PaymentState::Paying(_) => PaymentStateKind::Paying,
            PaymentState::PaymentCleared => PaymentStateKind::PaymentCleared,
        }
    }

    /// Details of the payment being made, while in `Paying`.
    pub fn processing_details(&self) -> Option<&PaymentProcessingDetails> {
        match self {
            PaymentState::Paying(details) => Some(details),
            _ => None,
        }
    }

    /// The modal was opened with a product selected.
    pub fn open(&self) -> Result<Self, TransitionError> {
        match self {
            PaymentState::Inactive => Ok(PaymentState::FetchingProcessingDetails),
            PaymentState::FetchingProcessingDetails
            | PaymentState::Paying(_)
            | PaymentState::PaymentCleared => Err(self.invalid(FlowEvent::Open)),
        }
    }

    /// The backend answered the checkout request.
    pub fn details_fetched(
        &self,
        details: PaymentProcessingDetails,
    ) -> Result<Self, TransitionError> {
        match self {
            PaymentState::FetchingProcessingDetails => Ok(PaymentState::Paying(details)),
            PaymentState::Inactive | PaymentState::Paying(_) | PaymentState::PaymentCleared => {
                Err(self.invalid(FlowEvent::DetailsFetched))
            }
        }
    }

    /// The payment for `order_id` cleared.
    pub fn payment_cleared(&self, order_id: &str) -> Result<Self, TransitionError> {
        match self {
            PaymentState::Paying(details) if details.order_id == order_id => {
                Ok(PaymentState::PaymentCleared)
            }
            PaymentState::Paying(details) => Err(TransitionError::OrderMismatch {
                expected: details.order_id.clone(),
                actual: order_id.to_owned(),
            }),
            PaymentState::Inactive
            | PaymentState::FetchingProcessingDetails
            | PaymentState::PaymentCleared => Err(self.invalid(FlowEvent::PaymentCleared)),
        }
    }

    /// The modal was closed. Always succeeds and discards everything.
    pub fn close(&self) -> Self {
        PaymentState::Inactive
    }

    fn invalid(&self, event: FlowEvent) -> TransitionError {
        TransitionError::Invalid {
            from: self.kind(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(order_id: &str) -> PaymentProcessingDetails {
        PaymentProcessingDetails {
            order_id: order_id.to_string(),
            qr: "qr".to_string(),
            deep_link: "diem://pay".to_string(),
            wallet_links: vec![],
        }
    }

    #[test]
    fn test_happy_path() {
        let state = PaymentState::default();
        assert_eq!(state.kind(), PaymentStateKind::Inactive);

        let state = state.open().unwrap();
        assert_eq!(state, PaymentState::FetchingProcessingDetails);

        let state = state.details_fetched(details("o-1")).unwrap();
        assert_eq!(state.processing_details().unwrap().order_id, "o-1");

        let state = state.payment_cleared("o-1").unwrap();
        assert_eq!(state, PaymentState::PaymentCleared);
    }

    #[test]
    fn test_close_always_resets() {
        let states = [
            PaymentState::Inactive,
            PaymentState::FetchingProcessingDetails,
            PaymentState::Paying(details("o-1")),
            PaymentState::PaymentCleared,
        ];
        for state in states {
            assert_eq!(state.close(), PaymentState::Inactive);
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(
            PaymentState::FetchingProcessingDetails.open(),
            Err(TransitionError::Invalid {
                from: PaymentStateKind::FetchingProcessingDetails,
                event: FlowEvent::Open,
            })
        );
        assert!(PaymentState::Inactive.details_fetched(details("o-1")).is_err());
        assert!(
            PaymentState::Paying(details("o-1"))
                .details_fetched(details("o-2"))
                .is_err()
        );
        assert!(PaymentState::FetchingProcessingDetails.payment_cleared("o-1").is_err());
        assert!(PaymentState::PaymentCleared.payment_cleared("o-1").is_err());
        assert!(PaymentState::PaymentCleared.open().is_err());
    }

    #[test]
    fn test_clearance_must_match_order() {
        let err = PaymentState::Paying(details("o-1"))
            .payment_cleared("o-2")
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::OrderMismatch {
                expected: "o-1".to_string(),
                actual: "o-2".to_string(),
            }
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PaymentState::Inactive.payment_cleared("o-1").unwrap_err();
        assert_eq!(err.to_string(), "cannot apply 'payment cleared' in state inactive");
    }
}
