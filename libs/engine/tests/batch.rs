//! Batch runner scenarios against in-memory and failing sinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use events_api::{Document, DocumentSink, EventRecord, SinkError, SinkFuture, StoreIdentity};
use events_engine::{
    BatchRunner, FaultConfig, FixedClock, HostResolutionError, HostResolver, InputError, RecordFactory,
    RunnerConfig, StaticHostResolver,
};
use events_engine::host::ResolveFuture;
use storage_memory::{MemoryBlobSink, MemoryDocumentSink, MemorySinkConfig};

// ═══════════════════════════════════════════════════════════════
//  Fixtures
// ═══════════════════════════════════════════════════════════════

/// Document sink that accepts `ok_calls` inserts and fails every one after.
struct FlakyDocumentSink {
    inner: MemoryDocumentSink,
    ok_calls: usize,
    calls: AtomicUsize,
}

impl FlakyDocumentSink {
    fn new(ok_calls: usize) -> Self {
        Self {
            inner: MemoryDocumentSink::new("flaky-docs", &MemorySinkConfig::default()),
            ok_calls,
            calls: AtomicUsize::new(0),
        }
    }
}

impl DocumentSink for FlakyDocumentSink {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn insert(&self, doc: Document) -> SinkFuture<'_> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_calls {
            return Box::pin(async { Err(SinkError::rejected("throttled")) });
        }
        self.inner.insert(doc)
    }
}

struct UnresolvableHost;

impl HostResolver for UnresolvableHost {
    fn resolve(&self) -> ResolveFuture<'_> {
        Box::pin(async { Err(HostResolutionError("no such host".into())) })
    }
}

struct Harness {
    blob: Arc<MemoryBlobSink>,
    docs: Arc<MemoryDocumentSink>,
}

impl Harness {
    fn new() -> Self {
        Self {
            blob: Arc::new(MemoryBlobSink::new("blob", &MemorySinkConfig::default())),
            docs: Arc::new(MemoryDocumentSink::new("docs", &MemorySinkConfig::default())),
        }
    }

    fn runner(&self, config: RunnerConfig) -> BatchRunner {
        BatchRunner::new(
            config,
            factory(),
            Arc::new(StaticHostResolver::new("shop.local", "10.9.8.7")),
            self.blob.clone(),
            self.docs.clone(),
        )
    }

    async fn records(&self) -> Vec<EventRecord> {
        self.docs
            .documents()
            .await
            .into_iter()
            .map(|d| serde_json::from_value(d.body).unwrap())
            .collect()
    }
}

fn factory() -> RecordFactory {
    let at: DateTime<Local> = DateTime::parse_from_rfc3339("2026-10-15T08:00:00+00:00")
        .unwrap()
        .with_timezone(&Local);
    RecordFactory::new(Arc::new(FixedClock::new(at)))
}

fn quiet(faults: FaultConfig, seed: u64) -> RunnerConfig {
    RunnerConfig {
        emit_delay: Duration::ZERO,
        faults,
        seed: Some(seed),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scenarios
// ═══════════════════════════════════════════════════════════════

#[tokio::test]
async fn three_clean_records() {
    let h = Harness::new();
    let stats = h
        .runner(quiet(FaultConfig::disabled(), 42))
        .run(3, &CancellationToken::new())
        .await
        .unwrap();

    assert!(stats.status);
    assert_eq!(stats.err_msg, None);
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.bad_messages, 0);
    assert_eq!(stats.sale_events + stats.inventory_events, 3);
    assert_eq!(h.blob.len().await, 3);
    assert_eq!(h.docs.len().await, 3);
}

#[tokio::test]
async fn counters_hold_for_many_counts() {
    for n in [1_i64, 2, 7, 25] {
        let h = Harness::new();
        let stats = h
            .runner(quiet(FaultConfig::disabled(), n as u64))
            .run(n, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(stats.total_messages, n as u64);
        assert_eq!(stats.bad_messages, 0);
        assert_eq!(stats.sale_events + stats.inventory_events, n as u64);
    }
}

#[tokio::test]
async fn total_sales_is_sum_of_prices() {
    let h = Harness::new();
    let stats = h
        .runner(quiet(FaultConfig::default(), 3))
        .run(20, &CancellationToken::new())
        .await
        .unwrap();

    let sum = h.records().await.iter().fold(0.0, |acc, r| acc + r.price);
    assert_eq!(stats.total_sales, sum);
}

#[tokio::test]
async fn every_record_has_matching_ids_and_store_identity() {
    let h = Harness::new();
    h.runner(quiet(FaultConfig::default(), 17))
        .run(30, &CancellationToken::new())
        .await
        .unwrap();

    for r in h.records().await {
        assert_eq!(r.id, r.request_id);
        assert_eq!(r.store_fqdn, "shop.local");
        assert_eq!(r.store_ip, "10.9.8.7");
        assert_eq!(r.store_id.is_none(), r.is_bad());
    }
}

#[tokio::test]
async fn forced_faults_strip_store_id() {
    let h = Harness::new();
    let stats = h
        .runner(quiet(FaultConfig::always(), 5))
        .run(4, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.bad_messages, 4);
    for r in h.records().await {
        assert_eq!(r.store_id, None);
        assert_eq!(r.bad_msg, Some(true));
    }
    for blob in h.blob.blobs().await {
        let value: serde_json::Value = serde_json::from_str(&blob.body).unwrap();
        assert!(value.get("store_id").is_none());
    }
}

#[tokio::test]
async fn same_seed_same_batch() {
    let a = Harness::new();
    let b = Harness::new();
    a.runner(quiet(FaultConfig::default(), 99)).run(5, &CancellationToken::new()).await.unwrap();
    b.runner(quiet(FaultConfig::default(), 99)).run(5, &CancellationToken::new()).await.unwrap();
    assert_eq!(a.records().await, b.records().await);
}

#[tokio::test]
async fn seeded_runner_never_repeats_ids_across_batches() {
    let h = Harness::new();
    let runner = h.runner(quiet(FaultConfig::disabled(), 99));
    runner.run(3, &CancellationToken::new()).await.unwrap();
    runner.run(3, &CancellationToken::new()).await.unwrap();

    let ids: std::collections::HashSet<String> = h.records().await.into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 6);
}

#[tokio::test]
async fn zero_count_is_an_input_error() {
    let h = Harness::new();
    let err = h
        .runner(quiet(FaultConfig::disabled(), 1))
        .run(0, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, InputError::NotPositive(0));
    assert_eq!(h.blob.len().await, 0);
    assert_eq!(h.docs.len().await, 0);
}

#[tokio::test]
async fn second_sink_failure_stops_the_batch() {
    let blob = Arc::new(MemoryBlobSink::new("blob", &MemorySinkConfig::default()));
    let docs = Arc::new(FlakyDocumentSink::new(1));
    let runner = BatchRunner::new(
        quiet(FaultConfig::disabled(), 8),
        factory(),
        Arc::new(StaticHostResolver::new("shop.local", "10.9.8.7")),
        blob.clone(),
        docs.clone(),
    );

    let stats = runner.run(5, &CancellationToken::new()).await.unwrap();

    assert!(!stats.status);
    assert_eq!(stats.total_messages, 1);
    assert_eq!(stats.err_msg.as_deref(), Some("sink write (flaky-docs): throttled"));
    // Второй blob уже записан: между sink'ами атомарности нет.
    assert_eq!(blob.len().await, 2);
    assert_eq!(docs.inner.len().await, 1);
    assert_eq!(docs.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn host_resolution_failure_writes_nothing() {
    let h = Harness::new();
    let runner = BatchRunner::new(
        quiet(FaultConfig::disabled(), 1),
        factory(),
        Arc::new(UnresolvableHost),
        h.blob.clone(),
        h.docs.clone(),
    );

    let stats = runner.run(3, &CancellationToken::new()).await.unwrap();

    assert!(!stats.status);
    assert_eq!(stats.total_messages, 0);
    assert_eq!(stats.err_msg.as_deref(), Some("host resolution: no such host"));
    assert_eq!(h.blob.len().await, 0);
}

#[tokio::test]
async fn cancelled_before_start() {
    let h = Harness::new();
    let token = CancellationToken::new();
    token.cancel();

    let stats = h.runner(quiet(FaultConfig::disabled(), 1)).run(3, &token).await.unwrap();

    assert!(!stats.status);
    assert_eq!(stats.err_msg.as_deref(), Some("batch cancelled"));
    assert_eq!(h.docs.len().await, 0);
}

#[tokio::test(start_paused = true)]
async fn delay_paces_records_and_skips_the_last() {
    let h = Harness::new();
    let runner = h.runner(RunnerConfig {
        emit_delay: Duration::from_secs(5),
        faults: FaultConfig::disabled(),
        seed: Some(2),
    });

    let start = tokio::time::Instant::now();
    let stats = runner.run(3, &CancellationToken::new()).await.unwrap();

    assert!(stats.status);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_the_pause() {
    let h = Harness::new();
    let runner = Arc::new(h.runner(RunnerConfig {
        emit_delay: Duration::from_secs(60),
        faults: FaultConfig::disabled(),
        seed: Some(4),
    }));
    let token = CancellationToken::new();

    let task = {
        let runner = runner.clone();
        let token = token.clone();
        tokio::spawn(async move { runner.run(100, &token).await })
    };

    tokio::time::sleep(Duration::from_secs(90)).await;
    token.cancel();
    let stats = task.await.unwrap().unwrap();

    assert!(!stats.status);
    assert_eq!(stats.total_messages, 2);
    assert_eq!(h.docs.len().await, 2);
}

#[tokio::test]
async fn identity_is_resolved_once_per_batch() {
    struct CountingResolver(AtomicUsize);

    impl HostResolver for CountingResolver {
        fn resolve(&self) -> ResolveFuture<'_> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(StoreIdentity { fqdn: format!("host-{n}"), ip: "10.0.0.1".into() })
            })
        }
    }

    let h = Harness::new();
    let resolver = Arc::new(CountingResolver(AtomicUsize::new(0)));
    let runner = BatchRunner::new(
        quiet(FaultConfig::disabled(), 1),
        factory(),
        resolver.clone(),
        h.blob.clone(),
        h.docs.clone(),
    );

    runner.run(4, &CancellationToken::new()).await.unwrap();

    assert_eq!(resolver.0.load(Ordering::SeqCst), 1);
    assert!(h.records().await.iter().all(|r| r.store_fqdn == "host-0"));
}
