use thiserror::Error;

/// Errors raised while polling a [`Signals`](crate::Signals) bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The stop trigger has fired. The interrupted operation produced no
    /// usable result.
    #[error("signals: cancelled")]
    Cancelled,

    /// The stop slot is not backed by an [`EventTrigger`](crate::EventTrigger),
    /// so it cannot be polled. This is a programming error in the caller.
    #[error("signals: stop must be an EventTrigger")]
    NotEventTrigger,
}

impl SignalError {
    /// Returns true for a caller-requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SignalError::Cancelled)
    }
}
