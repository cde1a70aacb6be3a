use events_api::SinkError;

/// Caller-side problems with the requested count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("count not found in request")]
    Missing,

    #[error("count is not an integer: '{0}'")]
    Invalid(String),

    #[error("count must be at least 1, got {0}")]
    NotPositive(i64),
}

#[derive(Debug, thiserror::Error)]
#[error("host resolution: {0}")]
pub struct HostResolutionError(pub String);

/// Причина, по которой batch остановился до конца.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Host(#[from] HostResolutionError),

    #[error("sink write ({sink}): {source}")]
    SinkWrite { sink: String, source: SinkError },

    #[error("batch cancelled")]
    Cancelled,
}
