//! Five-dimension occupational compatibility.
//!
//! | dimension       | weight |
//! |-----------------|--------|
//! | skills          | 0.30   |
//! | education       | 0.15   |
//! | experience      | 0.15   |
//! | work activities | 0.25   |
//! | interests       | 0.15   |
//!
//! Work activities describe how people work rather than what sector they
//! work in, which is what lets a hospital data analyst surface for a fintech
//! analytics role.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::core::similarity::{cosine_similarity, jaccard_similarity};
use crate::models::{
    experience_level_years, ActivityProfile, EducationRequirements, ExperienceRequirements, Job,
    ProfessionalProfile, RiasecProfile,
};
use crate::services::{OccupationDataSource, SkillMatcher};

/// Score for a dimension the user has no data for
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Bonus when the user holds every required skill (exact fallback only)
pub const COVERAGE_BONUS: f64 = 0.15;
/// Bonus per activity shared between both top lists
pub const TOP_ACTIVITY_BONUS: f64 = 0.05;
pub const TOP_ACTIVITY_COUNT: usize = 5;
/// Soft target for one occupational computation
const SCORING_TARGET_MS: f64 = 8.0;

/// Weights of the five dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionWeights {
    pub skills: f64,
    pub education: f64,
    pub experience: f64,
    pub work_activities: f64,
    pub interests: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            skills: 0.30,
            education: 0.15,
            experience: 0.15,
            work_activities: 0.25,
            interests: 0.15,
        }
    }
}

/// Per-dimension result of an occupational computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupationalBreakdown {
    pub skills: f64,
    pub education: f64,
    pub experience: f64,
    pub work_activities: f64,
    pub interests: f64,
    pub total: f64,
    /// False when the reference data was incomplete and only skills were scored
    pub complete: bool,
}

impl OccupationalBreakdown {
    fn skills_only(skills: f64) -> Self {
        Self {
            skills,
            education: NEUTRAL_SCORE,
            experience: NEUTRAL_SCORE,
            work_activities: NEUTRAL_SCORE,
            interests: NEUTRAL_SCORE,
            total: skills,
            complete: false,
        }
    }
}

/// Occupational similarity calculator
#[derive(Clone)]
pub struct OccupationalScorer {
    data: Arc<dyn OccupationDataSource>,
    matcher: Option<Arc<dyn SkillMatcher>>,
    weights: DimensionWeights,
}

impl OccupationalScorer {
    pub fn new(data: Arc<dyn OccupationDataSource>) -> Self {
        Self {
            data,
            matcher: None,
            weights: DimensionWeights::default(),
        }
    }

    pub fn with_skill_matcher(mut self, matcher: Arc<dyn SkillMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_weights(mut self, weights: DimensionWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> DimensionWeights {
        self.weights
    }

    /// Compatibility of a job with a profile in [0, 1]
    ///
    /// Incomplete reference data for the code degrades to the skills score.
    pub async fn compute_score(&self, job: &Job, profile: &ProfessionalProfile, occupation_code: &str) -> f64 {
        self.compute_breakdown(job, profile, occupation_code).await.total
    }

    /// Like `compute_score`, reading the code from the job
    pub async fn score_job(&self, job: &Job, profile: &ProfessionalProfile) -> f64 {
        match job.occupation_code.as_deref() {
            Some(code) => self.compute_score(job, profile, code).await,
            None => self.match_skills(&profile.skills, &job.requirements).await,
        }
    }

    pub async fn compute_breakdown(
        &self,
        job: &Job,
        profile: &ProfessionalProfile,
        occupation_code: &str,
    ) -> OccupationalBreakdown {
        let start = Instant::now();

        let (credentials, activities, interests) = tokio::join!(
            self.data.credentials(occupation_code),
            self.data.work_activities(occupation_code),
            self.data.interests(occupation_code),
        );

        let (Some(credentials), Some(activities), Some(interests)) = (credentials, activities, interests) else {
            tracing::debug!(occupation_code, "Occupation data incomplete, scoring skills only");
            let skills = self.match_skills(&profile.skills, &job.requirements).await;
            return OccupationalBreakdown::skills_only(skills);
        };

        let (skills, education, experience, work_activities, interest) = tokio::join!(
            self.match_skills(&profile.skills, &job.requirements),
            async { match_education(profile.education_level, &credentials.education) },
            async { match_experience(profile.years_of_experience, &credentials.experience) },
            async { match_work_activities(profile.work_activities.as_ref(), &activities) },
            async { match_interests(profile.interests.as_ref(), &interests.riasec) },
        );

        let w = &self.weights;
        let total = (skills * w.skills
            + education * w.education
            + experience * w.experience
            + work_activities * w.work_activities
            + interest * w.interests)
            .clamp(0.0, 1.0);

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms > SCORING_TARGET_MS {
            tracing::warn!(occupation_code, elapsed_ms, "Occupational scoring exceeded target");
        }

        OccupationalBreakdown {
            skills,
            education,
            experience,
            work_activities,
            interests: interest,
            total,
            complete: true,
        }
    }

    /// Skills dimension
    ///
    /// Uses the taxonomy matcher when configured and healthy, otherwise the
    /// exact Jaccard fallback.
    pub async fn match_skills(&self, user_skills: &[String], job_requirements: &[String]) -> f64 {
        if user_skills.is_empty() {
            return 0.0;
        }
        if job_requirements.is_empty() {
            return NEUTRAL_SCORE;
        }

        if let Some(matcher) = &self.matcher {
            match matcher.calculate_match_score(user_skills, job_requirements).await {
                Ok(score) => return score.clamp(0.0, 1.0),
                Err(e) => {
                    tracing::debug!(error = %e, "Skill matcher failed, using exact matching");
                }
            }
        }

        exact_skill_match(user_skills, job_requirements)
    }
}

impl std::fmt::Debug for OccupationalScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccupationalScorer")
            .field("weights", &self.weights)
            .field("has_skill_matcher", &self.matcher.is_some())
            .finish()
    }
}

/// Jaccard similarity of lowercase skill sets plus the coverage bonus
pub fn exact_skill_match(user_skills: &[String], job_requirements: &[String]) -> f64 {
    let user: HashSet<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();
    let job: HashSet<String> = job_requirements.iter().map(|s| s.to_lowercase()).collect();

    let similarity = jaccard_similarity(&user, &job);
    let coverage_bonus = if !job.is_empty() && job.is_subset(&user) {
        COVERAGE_BONUS
    } else {
        0.0
    };

    (similarity + coverage_bonus).min(1.0)
}

/// Education dimension on the 1-12 scale
pub fn match_education(user_level: Option<u8>, requirements: &EducationRequirements) -> f64 {
    let Some(user_level) = user_level else {
        return NEUTRAL_SCORE;
    };

    let difference = i32::from(user_level) - i32::from(requirements.required_level);
    match difference {
        0 => 1.0,
        1 => 0.95,
        -1 => 0.70,
        d if d >= 2 => 0.85,
        d => {
            let gap = f64::from(d.abs() - 1);
            (0.40 - gap * 0.10).max(0.20)
        }
    }
}

/// Experience dimension, comparing years against the mapped requirement
pub fn match_experience(user_years: Option<f64>, requirements: &ExperienceRequirements) -> f64 {
    let Some(user_years) = user_years else {
        return NEUTRAL_SCORE;
    };

    let required_years = experience_level_years(requirements.related_work_experience);
    let difference = user_years - required_years;
    let gap = difference.abs();

    if gap <= 1.0 {
        1.0
    } else if gap <= 2.0 {
        0.85
    } else if difference > 0.0 {
        if difference <= 5.0 {
            0.75
        } else {
            0.65
        }
    } else if gap <= 3.0 {
        0.60
    } else {
        (0.30 - (gap - 3.0) * 0.05).max(0.20)
    }
}

/// Work activity dimension
///
/// Cosine similarity over the union of activity ids plus a bonus for every
/// activity in both parties' top five.
pub fn match_work_activities(user_activities: Option<&HashMap<String, f64>>, job_activities: &ActivityProfile) -> f64 {
    let Some(user) = user_activities.filter(|a| !a.is_empty()) else {
        return NEUTRAL_SCORE;
    };
    let job = job_activities.importances();
    if job.is_empty() {
        return NEUTRAL_SCORE;
    }

    let ids: HashSet<&String> = user.keys().chain(job.keys()).collect();
    let mut user_vector = Vec::with_capacity(ids.len());
    let mut job_vector = Vec::with_capacity(ids.len());
    for id in ids {
        user_vector.push(user.get(id).copied().unwrap_or(0.0));
        job_vector.push(job.get(id).copied().unwrap_or(0.0));
    }

    let similarity = cosine_similarity(&user_vector, &job_vector).max(0.0);

    let user_top = top_activities(user, TOP_ACTIVITY_COUNT);
    let job_top = top_activities(&job, TOP_ACTIVITY_COUNT);
    let shared = user_top.intersection(&job_top).count();

    (similarity + shared as f64 * TOP_ACTIVITY_BONUS).min(1.0)
}

/// Ids of the `n` most important activities, ties broken by id
pub fn top_activities(activities: &HashMap<String, f64>, n: usize) -> HashSet<&str> {
    let mut ranked: Vec<(&String, &f64)> = activities.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.into_iter().take(n).map(|(id, _)| id.as_str()).collect()
}

/// Interest dimension
pub fn match_interests(user_interests: Option<&RiasecProfile>, job_interests: &RiasecProfile) -> f64 {
    match user_interests {
        Some(user) => user.similarity(job_interests).max(0.0),
        None => NEUTRAL_SCORE,
    }
}
