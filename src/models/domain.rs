use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::similarity::cosine_similarity;

/// Job posting as delivered by the feed source
///
/// Read-only to the scorer. Display fields are carried through untouched so
/// the feed can render the card from the same value it ranked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Required skills
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Standardized occupation code, e.g. "15-1252.00"
    #[serde(rename = "occupationCode", default)]
    pub occupation_code: Option<String>,
    #[serde(default = "default_sector")]
    pub sector: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(rename = "jobType", default)]
    pub job_type: Option<String>,
    #[serde(rename = "experienceLevel", default)]
    pub experience_level: Option<String>,
    #[serde(rename = "postedDate", default)]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(rename = "isRemote", default)]
    pub is_remote: bool,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(rename = "preferredSkills", default)]
    pub preferred_skills: Vec<String>,
}

fn default_location() -> String { "Remote".to_string() }
fn default_sector() -> String { "Technology".to_string() }

impl Job {
    /// Minimal job with a fresh identity; remaining fields take their defaults
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            company: company.into(),
            location: default_location(),
            description: String::new(),
            requirements: Vec::new(),
            occupation_code: None,
            sector: default_sector(),
            benefits: Vec::new(),
            job_type: None,
            experience_level: None,
            posted_date: None,
            is_remote: false,
            salary: None,
            preferred_skills: Vec::new(),
        }
    }

    pub fn with_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_occupation_code(mut self, code: impl Into<String>) -> Self {
        self.occupation_code = Some(code.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }
}

/// Thompson Sampling score components
///
/// Produced fresh by every scoring call and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThompsonScore {
    pub personal: f64,
    pub professional: f64,
    pub combined: f64,
    #[serde(rename = "explorationBonus")]
    pub exploration_bonus: f64,
    pub timestamp: DateTime<Utc>,
}

impl ThompsonScore {
    /// Build a score from its parts, deriving `combined`
    ///
    /// combined = min(0.95, (personal + professional) / 2 + exploration_bonus)
    pub fn from_parts(personal: f64, professional: f64, exploration_bonus: f64) -> Self {
        Self {
            personal,
            professional,
            combined: combined_score(personal, professional, exploration_bonus),
            exploration_bonus,
            timestamp: Utc::now(),
        }
    }
}

/// Upper bound of the combined score
pub const MAX_COMBINED_SCORE: f64 = 0.95;

#[inline]
pub fn combined_score(personal: f64, professional: f64, exploration_bonus: f64) -> f64 {
    ((personal + professional) / 2.0 + exploration_bonus).clamp(0.0, MAX_COMBINED_SCORE)
}

/// A job together with the score it was ranked by
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredJob {
    pub job: Job,
    pub score: ThompsonScore,
}

/// Swipe actions for job cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Accept,
    Reject,
    Save,
}

/// User interaction with a job, consumed once by the posterior update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInteraction {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
    pub action: SwipeAction,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "scoreAtDecision", default)]
    pub score_at_decision: Option<ThompsonScore>,
}

impl JobInteraction {
    pub fn new(job_id: Uuid, action: SwipeAction) -> Self {
        Self {
            job_id,
            action,
            timestamp: Utc::now(),
            score_at_decision: None,
        }
    }

    pub fn with_score(mut self, score: ThompsonScore) -> Self {
        self.score_at_decision = Some(score);
        self
    }
}

/// User profile as seen by the scorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub professional: ProfessionalProfile,
}

impl UserProfile {
    pub fn new(preferences: UserPreferences, professional: ProfessionalProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            preferences,
            professional,
        }
    }
}

/// Feed preferences used by the sampler heuristics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "preferredLocations", default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
}

/// Professional profile information
///
/// Every occupation-derived field is optional so that profiles created before
/// taxonomy data existed keep scoring, falling back to neutral sub-scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    /// Education level on the 1-12 ordinal scale (4 = high school, 8 = bachelor, 12 = doctorate)
    #[serde(rename = "educationLevel", default)]
    pub education_level: Option<u8>,
    #[serde(rename = "yearsOfExperience", default)]
    pub years_of_experience: Option<f64>,
    /// Work activity id (e.g. "4.A.2.a.4") to importance, 0.0-7.0
    #[serde(rename = "workActivities", default)]
    pub work_activities: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub interests: Option<RiasecProfile>,
    /// Ability id to proficiency, 0.0-7.0
    #[serde(default)]
    pub abilities: Option<HashMap<String, f64>>,
}

impl ProfessionalProfile {
    pub fn with_skills<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skills: skills.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Holland RIASEC interest profile, each dimension 0.0-7.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiasecProfile {
    pub realistic: f64,
    pub investigative: f64,
    pub artistic: f64,
    pub social: f64,
    pub enterprising: f64,
    pub conventional: f64,
}

impl RiasecProfile {
    pub fn new(
        realistic: f64,
        investigative: f64,
        artistic: f64,
        social: f64,
        enterprising: f64,
        conventional: f64,
    ) -> Self {
        Self {
            realistic,
            investigative,
            artistic,
            social,
            enterprising,
            conventional,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.realistic,
            self.investigative,
            self.artistic,
            self.social,
            self.enterprising,
            self.conventional,
        ]
    }

    /// Cosine similarity between the two six-dimensional vectors
    pub fn similarity(&self, other: &RiasecProfile) -> f64 {
        cosine_similarity(&self.as_array(), &other.as_array())
    }
}
