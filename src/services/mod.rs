// Service exports
pub mod cache;
pub mod occupation_data;
pub mod session;
pub mod skill_matcher;

pub use cache::{CacheStats, ScoreCache};
pub use occupation_data::{InMemoryOccupationStore, OccupationDataError, OccupationDataSource};
pub use session::{ScoringSession, SessionCommand, SessionError, SessionHandle};
pub use skill_matcher::{LazyTaxonomyMatcher, SkillMatchError, SkillMatcher, TaxonomySkillMatcher};
