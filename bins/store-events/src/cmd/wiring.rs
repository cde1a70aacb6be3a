use std::sync::Arc;

use events_api::{BlobSink, DocumentSink};
use events_engine::{BatchRunner, HostResolver, RecordFactory, StaticHostResolver, SystemClock, SystemHostResolver};
use storage_blob_file::FileBlobSink;
use storage_doc_file::FileDocumentSink;
use storage_memory::{MemoryBlobSink, MemoryDocumentSink};

use crate::config::{BlobSinkConfig, DocumentSinkConfig, Effective};
use crate::error::GenError;

const BLOB_SINK: &str = "blob";
const DOCUMENT_SINK: &str = "documents";

fn build_blob_sink(cfg: &BlobSinkConfig) -> Result<Arc<dyn BlobSink>, GenError> {
    match cfg {
        BlobSinkConfig::Memory(m) => {
            tracing::info!(sink = BLOB_SINK, backend = "memory", max_records = m.max_records, "blob sink ready");
            Ok(Arc::new(MemoryBlobSink::new(BLOB_SINK, m)))
        }
        BlobSinkConfig::File(f) => {
            let sink = FileBlobSink::new(BLOB_SINK, f);
            sink.init().map_err(|e| GenError::Sink { sink: BLOB_SINK, source: e })?;
            tracing::info!(sink = BLOB_SINK, backend = "file", data_dir = %f.data_dir, "blob sink ready");
            Ok(Arc::new(sink))
        }
    }
}

fn build_document_sink(cfg: &DocumentSinkConfig) -> Result<Arc<dyn DocumentSink>, GenError> {
    match cfg {
        DocumentSinkConfig::Memory(m) => {
            tracing::info!(sink = DOCUMENT_SINK, backend = "memory", max_records = m.max_records, "document sink ready");
            Ok(Arc::new(MemoryDocumentSink::new(DOCUMENT_SINK, m)))
        }
        DocumentSinkConfig::File(f) => {
            let sink = FileDocumentSink::new(DOCUMENT_SINK, f);
            sink.init().map_err(|e| GenError::Sink { sink: DOCUMENT_SINK, source: e })?;
            tracing::info!(
                sink = DOCUMENT_SINK,
                backend = "file",
                path = %sink.path().display(),
                write_mode = ?f.write_mode,
                "document sink ready"
            );
            Ok(Arc::new(sink))
        }
    }
}

/// Собрать runner из итоговой конфигурации.
pub fn build_runner(eff: &Effective) -> Result<BatchRunner, GenError> {
    let resolver: Arc<dyn HostResolver> = match &eff.store {
        Some((fqdn, ip)) => Arc::new(StaticHostResolver::new(fqdn.clone(), ip.clone())),
        None => Arc::new(SystemHostResolver),
    };
    let factory = RecordFactory::new(Arc::new(SystemClock)).with_contact(eff.contact.clone());

    let runner = BatchRunner::new(
        eff.runner.clone(),
        factory,
        resolver,
        build_blob_sink(&eff.blob)?,
        build_document_sink(&eff.document)?,
    );

    let cfg = runner.config();
    tracing::info!(
        emit_delay_s = cfg.emit_delay.as_secs(),
        random_failures = cfg.faults.enabled,
        failure_threshold = cfg.faults.threshold,
        seeded = cfg.seed.is_some(),
        "runner configured"
    );

    Ok(runner)
}
