use std::collections::VecDeque;
use std::time::Duration;

use crate::models::{PerformanceMetrics, PerformanceSummary};

pub const DEFAULT_LATENCY_BUDGET_MS: f64 = 10.0;
pub const DEFAULT_EMA_ALPHA: f64 = 0.1;
/// Latency samples kept for percentile queries
pub const WINDOW_SIZE: usize = 1_000;

/// Scoring latency tracker
///
/// Keeps an exponential moving average for the cheap `within_budget` check
/// and a bounded window of raw samples for percentiles.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    budget_ms: f64,
    ema_alpha: f64,
    avg_latency_ms: f64,
    window: VecDeque<f64>,
    budget_overruns: u64,
    cache_hits: u64,
    cache_lookups: u64,
}

impl PerformanceMonitor {
    pub fn new(budget_ms: f64, ema_alpha: f64) -> Self {
        Self {
            budget_ms,
            ema_alpha: ema_alpha.clamp(0.0, 1.0),
            avg_latency_ms: 0.0,
            window: VecDeque::with_capacity(WINDOW_SIZE),
            budget_overruns: 0,
            cache_hits: 0,
            cache_lookups: 0,
        }
    }

    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }

    /// Record one scoring latency, returning true if it overran the budget
    pub fn record(&mut self, elapsed: Duration) -> bool {
        let latency_ms = elapsed.as_secs_f64() * 1000.0;
        self.record_ms(latency_ms)
    }

    pub fn record_ms(&mut self, latency_ms: f64) -> bool {
        self.avg_latency_ms = self.ema_alpha * latency_ms + (1.0 - self.ema_alpha) * self.avg_latency_ms;

        if self.window.len() == WINDOW_SIZE {
            self.window.pop_front();
        }
        self.window.push_back(latency_ms);

        let overran = latency_ms > self.budget_ms;
        if overran {
            self.budget_overruns += 1;
        }
        overran
    }

    pub fn record_cache_lookup(&mut self, hit: bool) {
        self.cache_lookups += 1;
        if hit {
            self.cache_hits += 1;
        }
    }

    pub fn average_latency_ms(&self) -> f64 {
        self.avg_latency_ms
    }

    pub fn is_within_budget(&self) -> bool {
        self.avg_latency_ms < self.budget_ms
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics {
            avg_latency_ms: self.avg_latency_ms,
            within_budget: self.is_within_budget(),
        }
    }

    /// Nearest-rank percentile over the sample window, 0.0 when empty
    pub fn percentile(&self, p: f64) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f64> = self.window.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let rank = (p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
        sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
    }

    pub fn cache_hit_rate(&self) -> f64 {
        if self.cache_lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.cache_lookups as f64
        }
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            samples: self.window.len(),
            avg_latency_ms: self.avg_latency_ms,
            p95_latency_ms: self.percentile(0.95),
            budget_overruns: self.budget_overruns,
            cache_hit_rate: self.cache_hit_rate(),
            within_budget: self.is_within_budget(),
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_BUDGET_MS, DEFAULT_EMA_ALPHA)
    }
}
