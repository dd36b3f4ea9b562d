// Core algorithm exports
pub mod beta;
pub mod engine;
pub mod explorer;
pub mod occupational;
pub mod performance;
pub mod sampler;
pub mod similarity;

pub use beta::{sample_beta, sample_beta_with, BetaPosterior};
pub use engine::{EngineConfig, ScoringEngine};
pub use explorer::CrossDomainExplorer;
pub use occupational::{DimensionWeights, OccupationalBreakdown, OccupationalScorer};
pub use performance::PerformanceMonitor;
pub use sampler::{DualProfileSampler, Priors};
pub use similarity::{cosine_similarity, jaccard_similarity};
