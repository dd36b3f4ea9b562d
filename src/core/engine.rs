//! Scoring engine: sampler, occupational enhancement, cache and latency
//! tracking for one user session.
//!
//! Mutating operations take `&mut self`; scoring itself only reads the
//! sampler, calculator and cache, so a batch can fan out over shared borrows.
//! Callers that need to share an engine across tasks go through
//! [`crate::services::session`].

use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::core::occupational::OccupationalScorer;
use crate::core::performance::{PerformanceMonitor, DEFAULT_EMA_ALPHA, DEFAULT_LATENCY_BUDGET_MS};
use crate::core::sampler::{score_neutral, DualProfileSampler, Priors};
use crate::models::{
    combined_score, Job, JobInteraction, ModelParameters, PerformanceMetrics, PerformanceSummary, ScoredJob,
    ThompsonScore, UserProfile,
};
use crate::services::cache::{CacheStats, ScoreCache, DEFAULT_MAX_CAPACITY, DEFAULT_TTL_SECS};

/// Share of the occupational score in the enhanced professional score
pub const DEFAULT_ENHANCEMENT_WEIGHT: f64 = 0.30;

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Blend occupational compatibility into the professional score
    pub occupational_enhancement: bool,
    pub enhancement_weight: f64,
    /// Starting posteriors and blend, usually restored from a previous session
    pub parameters: ModelParameters,
    pub latency_budget_ms: f64,
    pub ema_alpha: f64,
    /// Batch fan-out; defaults to the available parallelism
    pub max_concurrency: Option<usize>,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            occupational_enhancement: false,
            enhancement_weight: DEFAULT_ENHANCEMENT_WEIGHT,
            parameters: ModelParameters::default(),
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
            ema_alpha: DEFAULT_EMA_ALPHA,
            max_concurrency: None,
            cache_capacity: DEFAULT_MAX_CAPACITY,
            cache_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

/// Result of scoring one job before metrics are recorded
struct Evaluation {
    score: ThompsonScore,
    /// None when the cache was bypassed
    cache_hit: Option<bool>,
}

/// Thompson Sampling scoring engine
pub struct ScoringEngine {
    sampler: DualProfileSampler,
    occupational: Option<OccupationalScorer>,
    cache: ScoreCache,
    monitor: PerformanceMonitor,
    occupational_enhancement: bool,
    enhancement_weight: f64,
    max_concurrency: Option<usize>,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            sampler: DualProfileSampler::from_priors(Priors::from_parameters(&config.parameters)),
            occupational: None,
            cache: ScoreCache::new(config.cache_capacity, config.cache_ttl),
            monitor: PerformanceMonitor::new(config.latency_budget_ms, config.ema_alpha),
            occupational_enhancement: config.occupational_enhancement,
            enhancement_weight: config.enhancement_weight.clamp(0.0, 1.0),
            max_concurrency: config.max_concurrency,
        }
    }

    /// Engine with default settings resuming from persisted parameters
    pub fn with_parameters(parameters: ModelParameters) -> Self {
        Self::new(EngineConfig {
            parameters,
            ..EngineConfig::default()
        })
    }

    pub fn with_occupational_scorer(mut self, scorer: OccupationalScorer) -> Self {
        self.occupational = Some(scorer);
        self
    }

/// Toggle the occupational blend for this instance
    ///
    /// The cache holds base sampler scores only, so it survives the toggle.
    pub fn set_occupational_enhancement(&mut self, enabled: bool) {
        if self.occupational_enhancement != enabled {
            self.occupational_enhancement = enabled;
            tracing::info!(enabled, "Occupational enhancement toggled");
        }
    }

    pub fn occupational_enhancement(&self) -> bool {
        self.occupational_enhancement
    }

    /// Score one job, from cache when possible
    pub async fn score_job(&mut self, job: &Job, profile: Option<&UserProfile>) -> ThompsonScore {
        let start = Instant::now();
        let evaluation = self.evaluate(job, profile).await;
        self.record_lookup(evaluation.cache_hit);
        self.record_latency(start.elapsed(), 1);
        evaluation.score
    }

    /// Score a batch concurrently, best first
    ///
    /// Every input job appears exactly once in the output. The whole call is
    /// one latency sample, measured as the caller sees it.
    pub async fn score_jobs(&mut self, jobs: Vec<Job>, profile: &UserProfile) -> Vec<ScoredJob> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let concurrency = self.concurrency();
        let engine: &Self = self;
        let results: Vec<(Job, Evaluation)> = stream::iter(jobs)
            .map(move |job| async move {
                let evaluation = engine.evaluate(&job, Some(profile)).await;
                (job, evaluation)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut scored = Vec::with_capacity(results.len());
        for (job, evaluation) in results {
            self.record_lookup(evaluation.cache_hit);
            scored.push(ScoredJob {
                job,
                score: evaluation.score,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .combined
                .partial_cmp(&a.score.combined)
                .unwrap_or(Ordering::Equal)
        });

        self.record_latency(start.elapsed(), scored.len());
        tracing::debug!(jobs = scored.len(), concurrency, "Batch scored");
        scored
    }

    /// Learn from a swipe and drop every cached score
    pub fn process_interaction(&mut self, interaction: JobInteraction) {
        self.sampler.update_model(interaction);
        self.cache.invalidate_all();
    }

    pub fn model_parameters(&self) -> ModelParameters {
        self.sampler.parameters()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.monitor.metrics()
    }

    pub fn performance_summary(&self) -> PerformanceSummary {
        self.monitor.summary()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Score without touching engine state
    ///
    /// Uses neutral priors, no occupational blend and no cache, so it can
    /// answer while the engine is busy elsewhere. There are no known
    /// industries, so every job counts as a new domain and the exploration
    /// bonus always lies in [0.0975, 0.195].
    pub fn score_job_now(&self, job: &Job) -> ThompsonScore {
        score_neutral(job)
    }

    pub async fn run_maintenance(&self) {
        self.cache.run_maintenance().await;
        tracing::debug!(stats = ?self.cache.stats(), "Cache maintenance complete");
    }

    fn concurrency(&self) -> usize {
        self.max_concurrency
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1)
    }

    /// Base sampler score from the cache when possible, then the
    /// occupational blend
    ///
    /// A profile-less call scores against an empty profile and bypasses the
    /// cache in both directions.
    async fn evaluate(&self, job: &Job, profile: Option<&UserProfile>) -> Evaluation {
        let Some(profile) = profile else {
            return Evaluation {
                score: self.sampler.score_job(job, &UserProfile::default()),
                cache_hit: None,
            };
        };

        let (base, cache_hit) = match self.cache.get(&job.id).await {
            Some(score) => (score, true),
            None => {
                let score = self.sampler.score_job(job, profile);
                self.cache.insert(job.id, score).await;
                (score, false)
            }
        };

        Evaluation {
            score: self.enhance(job, profile, base).await,
            cache_hit: Some(cache_hit),
        }
    }

    async fn enhance(&self, job: &Job, profile: &UserProfile, score: ThompsonScore) -> ThompsonScore {
        if !self.occupational_enhancement {
            return score;
        }

        let (Some(scorer), Some(code)) = (&self.occupational, job.occupation_code.as_deref()) else {
            return score;
        };

        let occupational = scorer.compute_score(job, &profile.professional, code).await;
        let professional = (score.professional * (1.0 - self.enhancement_weight)
            + occupational * self.enhancement_weight)
            .clamp(0.0, 1.0);

        ThompsonScore {
            professional,
            combined: combined_score(score.personal, professional, score.exploration_bonus),
            ..score
        }
    }

    fn record_lookup(&mut self, cache_hit: Option<bool>) {
        if let Some(hit) = cache_hit {
            self.monitor.record_cache_lookup(hit);
        }
    }

    fn record_latency(&mut self, elapsed: Duration, jobs: usize) {
        if self.monitor.record(elapsed) {
            tracing::warn!(
                jobs,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.monitor.budget_ms(),
                "Scoring exceeded latency budget"
            );
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("parameters", &self.model_parameters())
            .field("occupational_enhancement", &self.occupational_enhancement)
            .field("metrics", &self.monitor.metrics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfessionalProfile, SwipeAction, UserPreferences};
    use crate::services::InMemoryOccupationStore;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn create_profile() -> UserProfile {
        UserProfile::new(
            UserPreferences {
                preferred_locations: vec!["Remote".to_string()],
                industries: vec!["software".to_string()],
            },
            ProfessionalProfile::with_skills(["python", "sql"]),
        )
    }

    fn create_jobs(count: usize) -> Vec<Job> {
        (0..count)
            .map(|i| Job::new(format!("Engineer {}", i), "Acme Software").with_requirements(["python", "aws"]))
            .collect()
    }

    /// Posteriors concentrated near 1.0 so samples are effectively fixed
    fn confident_parameters() -> ModelParameters {
        ModelParameters {
            exploit_alpha: 1_000_000.0,
            exploit_beta: 1.0,
            explore_alpha: 1_000_000.0,
            explore_beta: 1.0,
            profile_blend: 0.5,
        }
    }

    #[tokio::test]
    async fn test_score_job_is_cached() {
        let mut engine = ScoringEngine::default();
        let job = Job::new("Engineer", "Acme");
        let profile = create_profile();

        let first = engine.score_job(&job, Some(&profile)).await;
        let second = engine.score_job(&job, Some(&profile)).await;
        assert_eq!(first, second);

        let stats = engine.cache_stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[tokio::test]
    async fn test_interaction_invalidates_cache() {
        let mut engine = ScoringEngine::default();
        let job = Job::new("Engineer", "Acme");

        let profile = create_profile();

        engine.score_job(&job, Some(&profile)).await;
        engine.process_interaction(JobInteraction::new(job.id, SwipeAction::Reject));
        engine.score_job(&job, Some(&profile)).await;

        assert_eq!(engine.cache_stats().miss_count, 2);
        assert!((engine.model_parameters().profile_blend - 0.49).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_batch_returns_every_job_sorted() {
        let mut engine = ScoringEngine::new(EngineConfig {
            max_concurrency: Some(3),
            ..EngineConfig::default()
        });
        let jobs = create_jobs(20);
        let ids: HashSet<_> = jobs.iter().map(|j| j.id).collect();

        let scored = engine.score_jobs(jobs, &create_profile()).await;

        assert_eq!(scored.len(), 20);
        assert_eq!(scored.iter().map(|s| s.job.id).collect::<HashSet<_>>(), ids);
        assert!(scored.windows(2).all(|w| w[0].score.combined >= w[1].score.combined));

        // One latency sample for the call, one cache lookup per job
        let summary = engine.performance_summary();
        assert_eq!(summary.samples, 1);
        assert_eq!(engine.cache_stats().miss_count, 20);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut engine = ScoringEngine::default();
        assert!(engine.score_jobs(Vec::new(), &create_profile()).await.is_empty());
    }

    #[tokio::test]
    async fn test_enhancement_blends_professional() {
        let scorer = OccupationalScorer::new(Arc::new(InMemoryOccupationStore::new()));
        let mut engine = ScoringEngine::new(EngineConfig {
            occupational_enhancement: true,
            parameters: confident_parameters(),
            ..EngineConfig::default()
        })
        .with_occupational_scorer(scorer);

        // Unknown code: occupational score is the exact skills match, 2/3
        let job = Job::new("Cloud Engineer", "Acme")
            .with_requirements(["python", "sql", "aws"])
            .with_occupation_code("15-1299.00");
        let score = engine.score_job(&job, Some(&create_profile())).await;

        assert!((score.professional - (0.7 + 0.3 * 2.0 / 3.0)).abs() < 1e-3, "{:?}", score);
        let expected = combined_score(score.personal, score.professional, score.exploration_bonus);
        assert_eq!(score.combined, expected);
    }

    #[tokio::test]
    async fn test_enhancement_skipped_without_code() {
        let scorer = OccupationalScorer::new(Arc::new(InMemoryOccupationStore::new()));
        let mut engine = ScoringEngine::new(EngineConfig {
            occupational_enhancement: true,
            parameters: confident_parameters(),
            ..EngineConfig::default()
        })
        .with_occupational_scorer(scorer);

        let job = Job::new("Cloud Engineer", "Acme").with_requirements(["python", "sql", "aws"]);
        let score = engine.score_job(&job, Some(&create_profile())).await;
        assert!(score.professional > 0.99);
    }

    fn create_enhanced_engine() -> ScoringEngine {
        let scorer = OccupationalScorer::new(Arc::new(InMemoryOccupationStore::new()));
        ScoringEngine::new(EngineConfig {
            occupational_enhancement: true,
            parameters: confident_parameters(),
            ..EngineConfig::default()
        })
        .with_occupational_scorer(scorer)
    }

    fn create_coded_job() -> Job {
        Job::new("Cloud Engineer", "Acme")
            .with_requirements(["python", "sql", "aws"])
            .with_occupation_code("15-1299.00")
    }

    #[tokio::test]
    async fn test_profileless_score_does_not_mask_enhancement() {
        let mut engine = create_enhanced_engine();
        let job = create_coded_job();

        let bare = engine.score_job(&job, None).await;
        assert!(bare.professional > 0.99);

        let enhanced = engine.score_job(&job, Some(&create_profile())).await;
        assert!((enhanced.professional - (0.7 + 0.3 * 2.0 / 3.0)).abs() < 1e-3, "{:?}", enhanced);
        assert_eq!(engine.cache_stats().hit_count, 0);
    }

    #[tokio::test]
    async fn test_cached_score_matches_fresh_score() {
        let mut engine = create_enhanced_engine();
        let job = create_coded_job();
        let profile = create_profile();

        let fresh = engine.score_job(&job, Some(&profile)).await;
        let cached = engine.score_job(&job, Some(&profile)).await;

        assert_eq!(engine.cache_stats().hit_count, 1);
        assert_eq!(fresh, cached);
    }

    #[tokio::test]
    async fn test_toggle_applies_to_cached_scores() {
        let mut engine = create_enhanced_engine();
        engine.set_occupational_enhancement(false);
        let job = create_coded_job();
        let profile = create_profile();

        let plain = engine.score_job(&job, Some(&profile)).await;
        assert!(plain.professional > 0.99);

        engine.set_occupational_enhancement(true);
        assert!(engine.occupational_enhancement());
        let enhanced = engine.score_job(&job, Some(&profile)).await;

        assert_eq!(engine.cache_stats().hit_count, 1);
        assert_eq!(enhanced.personal, plain.personal);
        assert!((enhanced.professional - (0.7 + 0.3 * 2.0 / 3.0)).abs() < 1e-3);
    }

    #[test]
    fn test_score_job_now_bounds() {
        let engine = ScoringEngine::default();
        let job = Job::new("Engineer", "Acme").with_requirements(["rust"]);
        for _ in 0..1_000 {
            let score = engine.score_job_now(&job);
            assert!((0.0..=1.0).contains(&score.personal));
            assert!((0.0..=1.0).contains(&score.professional));
            assert!((0.0..=0.95).contains(&score.combined));
            // Always a new domain for the empty profile
            assert!((0.0975 - 1e-12..=0.195 + 1e-12).contains(&score.exploration_bonus));
        }
    }

    #[test]
    fn test_with_parameters_round_trips() {
        let parameters = ModelParameters {
            exploit_alpha: 4.0,
            exploit_beta: 2.0,
            explore_alpha: 1.5,
            explore_beta: 3.0,
            profile_blend: 0.62,
        };
        let engine = ScoringEngine::with_parameters(parameters);
        assert_eq!(engine.model_parameters(), parameters);
    }
}
