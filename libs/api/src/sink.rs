use std::future::Future;
use std::pin::Pin;

use crate::error::SinkError;
use crate::record::EventAttributes;

pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

// ════════════════════════════════════════════════════════════════
//  Payloads
// ════════════════════════════════════════════════════════════════

/// Запись для blob-хранилища: имя объекта + текстовое тело.
#[derive(Debug, Clone)]
pub struct Blob {
    pub name: String,
    pub body: String,
    pub attrs: EventAttributes,
}

/// Запись для document-хранилища: структурированный JSON-документ.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub body: serde_json::Value,
    pub attrs: EventAttributes,
}

// ════════════════════════════════════════════════════════════════
//  Sink traits
// ════════════════════════════════════════════════════════════════

/// Blob store. Одна попытка записи на вызов: retry/backoff остаётся заботой
/// реализации, batch runner ничего не повторяет.
pub trait BlobSink: Send + Sync {
    fn name(&self) -> &str;

    fn put(&self, blob: Blob) -> SinkFuture<'_>;
}

/// Document store. Тот же контракт отказов, что у [`BlobSink`].
pub trait DocumentSink: Send + Sync {
    fn name(&self) -> &str;

    fn insert(&self, doc: Document) -> SinkFuture<'_>;
}
