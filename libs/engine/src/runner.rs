use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use events_api::{BatchStatistics, BlobSink, DocumentSink, EventAttributes, EventRecord, codec};

use crate::config::RunnerConfig;
use crate::error::{BatchError, InputError};
use crate::factory::RecordFactory;
use crate::fault::FaultInjector;
use crate::host::HostResolver;

// ═══════════════════════════════════════════════════════════════
//  BatchRunner
// ═══════════════════════════════════════════════════════════════

/// Генерирует batch: N записей → blob sink + document sink, с паузой
/// между записями. Один runner обслуживает любое число batch'ей,
/// у каждого свой RNG и своя статистика.
pub struct BatchRunner {
    config: RunnerConfig,
    factory: RecordFactory,
    injector: FaultInjector,
    resolver: Arc<dyn HostResolver>,
    blob: Arc<dyn BlobSink>,
    docs: Arc<dyn DocumentSink>,
    /// Номер следующего run'а: с `seed` каждый batch получает свой поток.
    runs: AtomicU64,
}

impl BatchRunner {
    pub fn new(
        config: RunnerConfig,
        factory: RecordFactory,
        resolver: Arc<dyn HostResolver>,
        blob: Arc<dyn BlobSink>,
        docs: Arc<dyn DocumentSink>,
    ) -> Self {
        let injector = FaultInjector::new(config.faults);
        Self {
            config,
            factory,
            injector,
            resolver,
            blob,
            docs,
            runs: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run one batch of `count` records.
    ///
    /// Only a bad `count` is returned as `Err`, before anything is generated.
    /// Host or sink failures and cancellation stop the batch and come back
    /// as `status = false` with the counters reached so far.
    pub async fn run(&self, count: i64, cancel: &CancellationToken) -> Result<BatchStatistics, InputError> {
        let count = validate_count(count)?;
        let mut stats = BatchStatistics::default();
        let run_no = self.runs.fetch_add(1, Ordering::Relaxed);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(run_seed(seed, run_no)),
            None => StdRng::from_entropy(),
        };

        match self.drive(count, &mut rng, &mut stats, cancel).await {
            Ok(()) => {
                stats.complete();
                tracing::info!(
                    total = stats.total_messages,
                    bad = stats.bad_messages,
                    sale = stats.sale_events,
                    inventory = stats.inventory_events,
                    total_sales = stats.total_sales,
                    "batch complete"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    total = stats.total_messages,
                    requested = count,
                    "batch stopped"
                );
                stats.fail(e.to_string());
            }
        }

        Ok(stats)
    }

    async fn drive(
        &self,
        count: u64,
        rng: &mut StdRng,
        stats: &mut BatchStatistics,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        let identity = self.resolver.resolve().await?;
        tracing::debug!(fqdn = %identity.fqdn, ip = %identity.ip, "store identity resolved");

        for i in 0..count {
            if cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }

            let (record, attrs) = self.factory.produce(rng, &identity);
            let (record, corrupted) = self.injector.maybe_corrupt(rng, record);
            stats.record_event_type(attrs.event_type);

            tracing::info!(
                id = %record.id,
                event_type = %attrs.event_type,
                price = record.price,
                bad_msg = corrupted,
                "generated event"
            );

            self.emit(&record, attrs).await?;
            stats.record_emitted(record.price, corrupted);

            if i + 1 < count && !self.config.emit_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.emit_delay) => {}
                    _ = cancel.cancelled() => return Err(BatchError::Cancelled),
                }
            }
        }

        Ok(())
    }

    /// Blob, затем document. Ошибка любой записи прерывает batch;
    /// уже записанный blob не откатывается.
    async fn emit(&self, record: &EventRecord, attrs: EventAttributes) -> Result<(), BatchError> {
        let blob_sink = self.blob.name();
        let blob = codec::to_blob(record, attrs).map_err(|e| sink_error(blob_sink, e))?;
        self.blob.put(blob).await.map_err(|e| sink_error(blob_sink, e))?;
        tracing::debug!(sink = %blob_sink, id = %record.id, "uploaded blob");

        let doc_sink = self.docs.name();
        let doc = codec::to_document(record, attrs).map_err(|e| sink_error(doc_sink, e))?;
        self.docs.insert(doc).await.map_err(|e| sink_error(doc_sink, e))?;
        tracing::debug!(sink = %doc_sink, id = %record.id, "inserted document");

        Ok(())
    }
}

/// Первый run идёт ровно с `seed`, следующие со смещённым.
fn run_seed(seed: u64, run_no: u64) -> u64 {
    seed ^ run_no.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn sink_error(sink: &str, source: events_api::SinkError) -> BatchError {
    BatchError::SinkWrite { sink: sink.to_string(), source }
}

/// `count` must be at least 1.
pub fn validate_count(count: i64) -> Result<u64, InputError> {
    if count < 1 {
        return Err(InputError::NotPositive(count));
    }
    Ok(count as u64)
}
