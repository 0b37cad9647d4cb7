use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const LATENCY_BUCKET_COUNT: usize = 10;
const LATENCY_BUCKETS_MS: [u64; LATENCY_BUCKET_COUNT] =
    [1, 2, 5, 10, 25, 50, 100, 250, 1000, 5000];

#[derive(Clone, Debug, Serialize)]
pub struct LatencySnapshot {
    pub buckets_ms: Vec<u64>,
    pub counts: Vec<u64>,
    pub overflow: u64,
    pub count: u64,
    pub avg_ms: f64,
}

#[derive(Default)]
struct LatencyMetrics {
    buckets: [AtomicU64; LATENCY_BUCKET_COUNT],
    overflow: AtomicU64,
    count: AtomicU64,
    total_ms: AtomicU64,
}

impl LatencyMetrics {
    fn record(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_ms.fetch_add(ms, Ordering::Relaxed);
        if let Some((idx, _)) = LATENCY_BUCKETS_MS
            .iter()
            .enumerate()
            .find(|(_, bucket)| ms <= **bucket)
        {
            self.buckets[idx].fetch_add(1, Ordering::Relaxed);
        } else {
            self.overflow.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> LatencySnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total_ms = self.total_ms.load(Ordering::Relaxed);
        let avg_ms = if count > 0 {
            total_ms as f64 / count as f64
        } else {
            0.0
        };
        LatencySnapshot {
            buckets_ms: LATENCY_BUCKETS_MS.to_vec(),
            counts: self
                .buckets
                .iter()
                .map(|bucket| bucket.load(Ordering::Relaxed))
                .collect(),
            overflow: self.overflow.load(Ordering::Relaxed),
            count,
            avg_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HttpMetricsSnapshot {
    pub get_or_create: LatencySnapshot,
    pub finish_game: LatencySnapshot,
    pub fetch_player: LatencySnapshot,
}

/// Per-endpoint latency histograms for the player API.
#[derive(Default)]
pub struct HttpMetrics {
    get_or_create: LatencyMetrics,
    finish_game: LatencyMetrics,
    fetch_player: LatencyMetrics,
}

impl HttpMetrics {
    pub fn record_get_or_create(&self, duration: Duration) {
        self.get_or_create.record(duration);
    }

    pub fn record_finish_game(&self, duration: Duration) {
        self.finish_game.record(duration);
    }

    pub fn record_fetch_player(&self, duration: Duration) {
        self.fetch_player.record(duration);
    }

    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            get_or_create: self.get_or_create.snapshot(),
            finish_game: self.finish_game.snapshot(),
            fetch_player: self.fetch_player.snapshot(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct StoreMetricsSnapshot {
    pub durable_errors: u64,
    pub fallback_reads: u64,
    pub fallback_writes: u64,
}

/// Backend-selection counters. This is the only place (besides logs) where
/// the durable-vs-fallback choice is observable; the API contract never
/// exposes it.
#[derive(Default)]
pub struct StoreMetrics {
    durable_errors: AtomicU64,
    fallback_reads: AtomicU64,
    fallback_writes: AtomicU64,
}

impl StoreMetrics {
    pub fn inc_durable_errors(&self) {
        self.durable_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback_reads(&self) {
        self.fallback_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback_writes(&self) {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            durable_errors: self.durable_errors.load(Ordering::Relaxed),
            fallback_reads: self.fallback_reads.load(Ordering::Relaxed),
            fallback_writes: self.fallback_writes.load(Ordering::Relaxed),
        }
    }
}
