use std::collections::VecDeque;

use tokio::sync::RwLock;

use events_api::{Blob, BlobSink, Document, DocumentSink, SinkFuture};

// ═══════════════════════════════════════════════════════════════
//  MemorySinkConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_records() -> usize {
    100_000
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MemorySinkConfig {
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for MemorySinkConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Ring buffer
// ═══════════════════════════════════════════════════════════════

/// Bounded buffer: при переполнении вытесняется самая старая запись.
struct Ring<T> {
    items: RwLock<VecDeque<T>>,
    max_records: usize,
}

impl<T: Clone> Ring<T> {
    fn new(max_records: usize) -> Self {
        Self {
            items: RwLock::new(VecDeque::with_capacity(max_records.min(65536))),
            max_records,
        }
    }

    async fn push(&self, item: T) {
        let mut buf = self.items.write().await;
        if buf.len() >= self.max_records {
            buf.pop_front();
        }
        buf.push_back(item);
    }

    async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.iter().cloned().collect()
    }

    async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryBlobSink
// ═══════════════════════════════════════════════════════════════

/// In-memory blob store. Для dry-run'ов и тестов, без persistence.
pub struct MemoryBlobSink {
    name: String,
    blobs: Ring<Blob>,
}

impl MemoryBlobSink {
    pub fn new(name: impl Into<String>, config: &MemorySinkConfig) -> Self {
        Self {
            name: name.into(),
            blobs: Ring::new(config.max_records),
        }
    }

    pub async fn blobs(&self) -> Vec<Blob> {
        self.blobs.snapshot().await
    }

    pub async fn len(&self) -> usize {
        self.blobs.len().await
    }
}

impl BlobSink for MemoryBlobSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, blob: Blob) -> SinkFuture<'_> {
        Box::pin(async move {
            self.blobs.push(blob).await;
            Ok(())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryDocumentSink
// ═══════════════════════════════════════════════════════════════

pub struct MemoryDocumentSink {
    name: String,
    docs: Ring<Document>,
}

impl MemoryDocumentSink {
    pub fn new(name: impl Into<String>, config: &MemorySinkConfig) -> Self {
        Self {
            name: name.into(),
            docs: Ring::new(config.max_records),
        }
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.docs.snapshot().await
    }

    pub async fn len(&self) -> usize {
        self.docs.len().await
    }
}

impl DocumentSink for MemoryDocumentSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, doc: Document) -> SinkFuture<'_> {
        Box::pin(async move {
            self.docs.push(doc).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events_api::{EventAttributes, EventType};

    fn attrs() -> EventAttributes {
        EventAttributes { event_type: EventType::SaleEvent, priority_shipping: true }
    }

    #[tokio::test]
    async fn blob_ring_drops_oldest() {
        let sink = MemoryBlobSink::new("blob", &MemorySinkConfig { max_records: 2 });
        for i in 0..3 {
            sink.put(Blob { name: format!("{i}.json"), body: "{}".into(), attrs: attrs() })
                .await
                .unwrap();
        }
        let names: Vec<_> = sink.blobs().await.into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["1.json", "2.json"]);
        assert_eq!(sink.name(), "blob");
    }

    #[tokio::test]
    async fn documents_keep_insertion_order() {
        let sink = MemoryDocumentSink::new("docs", &MemorySinkConfig::default());
        for id in ["a", "b"] {
            sink.insert(Document { id: id.into(), body: serde_json::json!({"id": id}), attrs: attrs() })
                .await
                .unwrap();
        }
        let docs = sink.documents().await;
        assert_eq!(sink.len().await, 2);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[1].body["id"], "b");
    }
}
