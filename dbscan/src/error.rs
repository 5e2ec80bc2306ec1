use dbscan_signals::SignalError;
use thiserror::Error;

/// Invalid input detected before any clustering work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("dbscan: empty dataset")]
    EmptyDataset,

    #[error("dbscan: dimension must be positive")]
    ZeroDimension,

    #[error("dbscan: min_pts must be positive")]
    ZeroMinPts,
}

/// Abrupt termination of a clustering run.
///
/// A run that ends with one of these errors leaves its results partially
/// populated; they must be discarded.
#[derive(Debug, Error)]
pub enum DbscanError {
    /// The stop trigger fired while the run was in progress.
    #[error("dbscan: cancelled")]
    Cancelled,

    /// The signals bundle could not be polled (programming error).
    #[error("dbscan: malformed signals: {0}")]
    MalformedSignals(SignalError),

    #[error("dbscan: spatial index: {0}")]
    Index(String),

    /// Input rejected up front. Only returned by [`dbscan`](crate::dbscan);
    /// [`Dbscan::run`](crate::Dbscan::run) reports it as
    /// [`Outcome::Failure`](crate::Outcome::Failure).
    #[error(transparent)]
    Invalid(#[from] Precondition),
}

impl DbscanError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DbscanError::Cancelled)
    }
}

impl From<SignalError> for DbscanError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::Cancelled => DbscanError::Cancelled,
            other => DbscanError::MalformedSignals(other),
        }
    }
}
