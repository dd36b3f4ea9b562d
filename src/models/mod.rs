// Model exports
pub mod domain;
pub mod metrics;
pub mod occupation;

pub use domain::{
    combined_score, Job, JobInteraction, ProfessionalProfile, RiasecProfile, ScoredJob, SwipeAction,
    ThompsonScore, UserPreferences, UserProfile, MAX_COMBINED_SCORE,
};
pub use metrics::{ModelParameters, PerformanceMetrics, PerformanceSummary};
pub use occupation::{
    experience_level_years, ActivityProfile, ActivityRating, EducationRequirements,
    ExperienceRequirements, InterestProfile, OccupationCredentials,
};
