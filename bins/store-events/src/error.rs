use events_api::SinkError;
use events_engine::InputError;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("sink ({sink}): {source}")]
    Sink { sink: &'static str, source: SinkError },

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("batch failed: {0}")]
    BatchFailed(String),

    #[error("api server: {0}")]
    Server(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
