mod config;
mod storage;

pub use config::{FileDocumentConfig, StoredDocument, WriteMode};
pub use storage::FileDocumentSink;
