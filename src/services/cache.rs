use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::models::ThompsonScore;

pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Per-session cache of base sampler scores keyed by job id
///
/// Any interaction changes the posteriors, so callers invalidate the whole
/// cache rather than individual entries.
pub struct ScoreCache {
    scores: Cache<Uuid, ThompsonScore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ScoreCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let scores = moka::future::CacheBuilder::new(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            scores,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, job_id: &Uuid) -> Option<ThompsonScore> {
        match self.scores.get(job_id).await {
            Some(score) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%job_id, "Score cache hit");
                Some(score)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%job_id, "Score cache miss");
                None
            }
        }
    }

    pub async fn insert(&self, job_id: Uuid, score: ThompsonScore) {
        self.scores.insert(job_id, score).await;
    }

    /// Drop every cached score
    pub fn invalidate_all(&self) {
        self.scores.invalidate_all();
        tracing::debug!("Score cache invalidated");
    }

    /// Apply pending evictions and expirations now
    pub async fn run_maintenance(&self) {
        self.scores.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            entries: self.scores.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 },
        }
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY, Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl std::fmt::Debug for ScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreCache").field("stats", &self.stats()).finish()
    }
}

/// Cache statistics
///
/// `entries` is approximate until `run_maintenance` has been called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}
