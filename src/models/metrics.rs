use serde::{Deserialize, Serialize};

/// Current posterior parameters of both profiles
///
/// Persisting these across sessions is the caller's job; they are fed back
/// through `EngineConfig` on the next start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(rename = "exploitAlpha")]
    pub exploit_alpha: f64,
    #[serde(rename = "exploitBeta")]
    pub exploit_beta: f64,
    #[serde(rename = "exploreAlpha")]
    pub explore_alpha: f64,
    #[serde(rename = "exploreBeta")]
    pub explore_beta: f64,
    #[serde(rename = "profileBlend")]
    pub profile_blend: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            exploit_alpha: 1.0,
            exploit_beta: 1.0,
            explore_alpha: 1.0,
            explore_beta: 1.0,
            profile_blend: 0.5,
        }
    }
}

/// Rolling latency against the scoring budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Exponential moving average, milliseconds
    #[serde(rename = "avgLatencyMs")]
    pub avg_latency_ms: f64,
    #[serde(rename = "withinBudget")]
    pub within_budget: bool,
}

/// Windowed latency statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub samples: usize,
    #[serde(rename = "avgLatencyMs")]
    pub avg_latency_ms: f64,
    #[serde(rename = "p95LatencyMs")]
    pub p95_latency_ms: f64,
    #[serde(rename = "budgetOverruns")]
    pub budget_overruns: u64,
    #[serde(rename = "cacheHitRate")]
    pub cache_hit_rate: f64,
    #[serde(rename = "withinBudget")]
    pub within_budget: bool,
}
