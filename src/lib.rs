//! Jobfeed Scorer - real-time Thompson Sampling scorer for the job discovery feed
//!
//! Ranks job postings for one user with a dual-profile Thompson sampler
//! (exploitation and exploration posteriors blended by observed behaviour),
//! optionally blended with a five-dimension occupational compatibility score.
//!
//! ```no_run
//! use jobfeed_scorer::{Job, ScoringEngine, SwipeAction, JobInteraction, UserProfile};
//!
//! # async fn feed(profile: UserProfile, jobs: Vec<Job>) {
//! let mut engine = ScoringEngine::default();
//! let ranked = engine.score_jobs(jobs, &profile).await;
//! if let Some(top) = ranked.first() {
//!     engine.process_interaction(JobInteraction::new(top.job.id, SwipeAction::Accept));
//! }
//! # }
//! ```

pub mod config;
pub mod core;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::{
    BetaPosterior, CrossDomainExplorer, DimensionWeights, EngineConfig, OccupationalScorer, ScoringEngine,
};
pub use crate::models::{
    Job, JobInteraction, ModelParameters, PerformanceMetrics, ProfessionalProfile, ScoredJob, SwipeAction,
    ThompsonScore, UserPreferences, UserProfile,
};
pub use crate::services::{InMemoryOccupationStore, SessionHandle, SkillMatcher, TaxonomySkillMatcher};
