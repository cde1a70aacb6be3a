//! Named serializers, one per sink kind.
//!
//! Both forms are derived from the same [`EventRecord`], so the blob text
//! and the stored document can never drift apart.

use crate::error::SinkError;
use crate::record::{EventAttributes, EventRecord};
use crate::sink::{Blob, Document};

/// Blob body: compact JSON text of the record.
pub fn blob_body(record: &EventRecord) -> Result<String, SinkError> {
    serde_json::to_string(record).map_err(|e| SinkError::format_err(format!("blob serialize: {e}")))
}

/// Document body: the record as a structured JSON value.
pub fn document_body(record: &EventRecord) -> Result<serde_json::Value, SinkError> {
    serde_json::to_value(record).map_err(|e| SinkError::format_err(format!("document serialize: {e}")))
}

pub fn to_blob(record: &EventRecord, attrs: EventAttributes) -> Result<Blob, SinkError> {
    Ok(Blob {
        name: format!("{}.json", record.id),
        body: blob_body(record)?,
        attrs,
    })
}

pub fn to_document(record: &EventRecord, attrs: EventAttributes) -> Result<Document, SinkError> {
    Ok(Document {
        id: record.id.clone(),
        body: document_body(record)?,
        attrs,
    })
}
