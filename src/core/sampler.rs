use rand::Rng;
use std::collections::HashSet;

use crate::core::beta::BetaPosterior;
use crate::models::{Job, JobInteraction, ModelParameters, SwipeAction, ThompsonScore, UserProfile};

/// Base exploration rate before the random factor and domain multiplier
pub const BASE_EXPLORATION_RATE: f64 = 0.15;
/// Multiplier applied when the job lies outside every known industry
pub const CROSS_DOMAIN_MULTIPLIER: f64 = 1.3;
pub const MAX_EXPLORATION_BONUS: f64 = 0.2;
/// Weight of full required-skill coverage in the professional score
pub const SKILL_BONUS_WEIGHT: f64 = 0.1;
pub const LOCATION_BONUS: f64 = 0.05;
/// Blend shift per accept/reject
pub const BLEND_STEP: f64 = 0.01;
/// Chance the non-dominant profile also learns from an interaction
pub const SECONDARY_UPDATE_PROBABILITY: f64 = 0.3;
/// Chance a save counts as a success
pub const SAVE_SUCCESS_PROBABILITY: f64 = 0.8;

/// Snapshot of both posteriors and the blend used for one scoring pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priors {
    pub exploitation: BetaPosterior,
    pub exploration: BetaPosterior,
    /// 0 = pure exploitation, 1 = pure exploration
    pub blend: f64,
}

impl Priors {
    /// Beta(1, 1) for both profiles with an even blend
    pub fn neutral() -> Self {
        Self {
            exploitation: BetaPosterior::uniform(),
            exploration: BetaPosterior::uniform(),
            blend: 0.5,
        }
    }

    pub fn from_parameters(parameters: &ModelParameters) -> Self {
        Self {
            exploitation: BetaPosterior::new(parameters.exploit_alpha, parameters.exploit_beta),
            exploration: BetaPosterior::new(parameters.explore_alpha, parameters.explore_beta),
            blend: parameters.profile_blend.clamp(0.0, 1.0),
        }
    }
}

/// Dual-profile Thompson sampler
///
/// Holds an exploitation posterior (known preferences) and an exploration
/// posterior (discovery), blended by a scalar that drifts with behaviour.
#[derive(Debug, Clone)]
pub struct DualProfileSampler {
    exploitation: BetaPosterior,
    exploration: BetaPosterior,
    profile_blend: f64,
}

impl DualProfileSampler {
    pub fn new(exploitation: BetaPosterior, exploration: BetaPosterior, profile_blend: f64) -> Self {
        Self {
            exploitation,
            exploration,
            profile_blend: profile_blend.clamp(0.0, 1.0),
        }
    }

    pub fn from_priors(priors: Priors) -> Self {
        Self::new(priors.exploitation, priors.exploration, priors.blend)
    }

    pub fn priors(&self) -> Priors {
        Priors {
            exploitation: self.exploitation,
            exploration: self.exploration,
            blend: self.profile_blend,
        }
    }

    pub fn profile_blend(&self) -> f64 {
        self.profile_blend
    }

    pub fn parameters(&self) -> ModelParameters {
        ModelParameters {
            exploit_alpha: self.exploitation.alpha(),
            exploit_beta: self.exploitation.beta(),
            explore_alpha: self.exploration.alpha(),
            explore_beta: self.exploration.beta(),
            profile_blend: self.profile_blend,
        }
    }

    /// Score a job against the current posteriors
    pub fn score_job(&self, job: &Job, profile: &UserProfile) -> ThompsonScore {
        score_with_priors(&self.priors(), job, profile, &mut rand::thread_rng())
    }

    /// Update the posteriors and blend from a user interaction
    pub fn update_model(&mut self, interaction: JobInteraction) {
        self.update_model_with(interaction, &mut rand::thread_rng());
    }

    pub fn update_model_with<R: Rng + ?Sized>(&mut self, interaction: JobInteraction, rng: &mut R) {
        let reward = reward_for(interaction.action, rng);

        if self.profile_blend < 0.5 {
            self.exploitation = self.exploitation.update(reward);
            if rng.gen::<f64>() < SECONDARY_UPDATE_PROBABILITY {
                self.exploration = self.exploration.update(reward);
            }
        } else {
            self.exploration = self.exploration.update(reward);
            if rng.gen::<f64>() < SECONDARY_UPDATE_PROBABILITY {
                self.exploitation = self.exploitation.update(reward);
            }
        }

        self.profile_blend = adjust_blend(self.profile_blend, interaction.action);

        tracing::debug!(
            job_id = %interaction.job_id,
            action = ?interaction.action,
            reward,
            profile_blend = self.profile_blend,
            "Sampler updated"
        );
    }
}

impl Default for DualProfileSampler {
    fn default() -> Self {
        Self::from_priors(Priors::neutral())
    }
}

/// Score a job from a priors snapshot
///
/// Shared by the live sampler and the neutral-prior fallback path, so both
/// honour the same clamping and combined-score cap.
pub fn score_with_priors<R: Rng + ?Sized>(
    priors: &Priors,
    job: &Job,
    profile: &UserProfile,
    rng: &mut R,
) -> ThompsonScore {
    let exploit_sample = priors.exploitation.sample_with(rng);
    let explore_sample = priors.exploration.sample_with(rng);

    let personal = (exploit_sample * (1.0 - priors.blend) + explore_sample * priors.blend).clamp(0.0, 1.0);
    let exploration_bonus = exploration_bonus(job, profile, rng);
    let professional = professional_score(job, profile, personal);

    ThompsonScore::from_parts(personal, professional, exploration_bonus)
}

/// Score a job from neutral priors with an empty profile
pub fn score_neutral(job: &Job) -> ThompsonScore {
    score_with_priors(&Priors::neutral(), job, &UserProfile::default(), &mut rand::thread_rng())
}

/// Exploration bonus in [0, 0.2]
pub fn exploration_bonus<R: Rng + ?Sized>(job: &Job, profile: &UserProfile, rng: &mut R) -> f64 {
    let mut bonus = BASE_EXPLORATION_RATE * rng.gen_range(0.5..=1.0);

    if is_new_domain(job, profile) {
        bonus *= CROSS_DOMAIN_MULTIPLIER;
    }

    bonus.clamp(0.0, MAX_EXPLORATION_BONUS)
}

/// True when no known industry appears in the job title or company
///
/// Plain case-insensitive substring test.
pub fn is_new_domain(job: &Job, profile: &UserProfile) -> bool {
    let title = job.title.to_lowercase();
    let company = job.company.to_lowercase();

    !profile.preferences.industries.iter().any(|industry| {
        let industry = industry.to_lowercase();
        title.contains(&industry) || company.contains(&industry)
    })
}

/// Base score plus skill and location bonuses, capped at 1.0
pub fn professional_score(job: &Job, profile: &UserProfile, base_score: f64) -> f64 {
    let user_skills: HashSet<String> = profile
        .professional
        .skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let matched = job
        .requirements
        .iter()
        .filter(|requirement| user_skills.contains(&requirement.to_lowercase()))
        .count();

    let skill_bonus = matched as f64 / job.requirements.len().max(1) as f64 * SKILL_BONUS_WEIGHT;

    let location_bonus = if profile.preferences.preferred_locations.contains(&job.location) {
        LOCATION_BONUS
    } else {
        0.0
    };

    (base_score + skill_bonus + location_bonus).clamp(0.0, 1.0)
}

fn reward_for<R: Rng + ?Sized>(action: SwipeAction, rng: &mut R) -> bool {
    match action {
        SwipeAction::Accept => true,
        SwipeAction::Reject => false,
        SwipeAction::Save => rng.gen::<f64>() < SAVE_SUCCESS_PROBABILITY,
    }
}

fn adjust_blend(blend: f64, action: SwipeAction) -> f64 {
    match action {
        SwipeAction::Accept => (blend + BLEND_STEP).min(1.0),
        SwipeAction::Reject => (blend - BLEND_STEP).max(0.0),
        SwipeAction::Save => blend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfessionalProfile, UserPreferences};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn create_profile(skills: &[&str], industries: &[&str], locations: &[&str]) -> UserProfile {
        UserProfile::new(
            UserPreferences {
                preferred_locations: locations.iter().map(|s| s.to_string()).collect(),
                industries: industries.iter().map(|s| s.to_string()).collect(),
            },
            ProfessionalProfile::with_skills(skills.iter().copied()),
        )
    }

    fn interaction(action: SwipeAction) -> JobInteraction {
        JobInteraction::new(Uuid::new_v4(), action)
    }

    #[test]
    fn test_score_bounds() {
        let sampler = DualProfileSampler::default();
        let job = Job::new("Backend Engineer", "Acme").with_requirements(["rust", "sql"]);
        let profile = create_profile(&["Rust", "SQL"], &[], &["Remote"]);

        for _ in 0..2_000 {
            let score = sampler.score_job(&job, &profile);
            assert!((0.0..=1.0).contains(&score.personal));
            assert!((0.0..=1.0).contains(&score.professional));
            assert!((0.0..=0.95).contains(&score.combined));
            assert!((0.0..=0.2).contains(&score.exploration_bonus));
        }
    }

    #[test]
    fn test_professional_score_bonuses() {
        let job = Job::new("Analyst", "Acme")
            .with_requirements(["Python", "SQL", "AWS", "Excel"])
            .with_location("Berlin");
        let profile = create_profile(&["python", "sql"], &[], &["Berlin"]);

        // 2 of 4 skills -> 0.05, location -> 0.05
        let score = professional_score(&job, &profile, 0.5);
        assert!((score - 0.6).abs() < 1e-12);

        // Capped
        assert_eq!(professional_score(&job, &profile, 0.98), 1.0);
    }

    #[test]
    fn test_professional_score_without_requirements() {
        let job = Job::new("Analyst", "Acme").with_location("Paris");
        let profile = create_profile(&["python"], &[], &[]);
        assert!((professional_score(&job, &profile, 0.4) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_new_domain_detection() {
        let job = Job::new("Clinical Data Analyst", "Northside Hospital");
        assert!(is_new_domain(&job, &create_profile(&[], &["finance"], &[])));
        assert!(!is_new_domain(&job, &create_profile(&[], &["Hospital"], &[])));
        assert!(!is_new_domain(&job, &create_profile(&[], &["data"], &[])));
        // No known industries: everything is new
        assert!(is_new_domain(&job, &create_profile(&[], &[], &[])));
    }

    #[test]
    fn test_exploration_bonus_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        let job = Job::new("Nurse", "City Clinic");
        let known = create_profile(&[], &["clinic"], &[]);
        let novel = create_profile(&[], &["banking"], &[]);

        let eps = 1e-12;
        for _ in 0..1_000 {
            let b = exploration_bonus(&job, &known, &mut rng);
            assert!(b >= 0.075 - eps && b <= 0.15 + eps, "bonus {}", b);

            let b = exploration_bonus(&job, &novel, &mut rng);
            assert!(b >= 0.0975 - eps && b <= 0.195 + eps, "bonus {}", b);
        }
    }

    #[test]
    fn test_accept_and_reject_move_blend() {
        let mut sampler = DualProfileSampler::default();

        sampler.update_model(interaction(SwipeAction::Accept));
        assert!((sampler.profile_blend() - 0.51).abs() < 1e-12);

        sampler.update_model(interaction(SwipeAction::Reject));
        sampler.update_model(interaction(SwipeAction::Reject));
        assert!((sampler.profile_blend() - 0.49).abs() < 1e-12);

        sampler.update_model(interaction(SwipeAction::Save));
        assert!((sampler.profile_blend() - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_blend_is_clamped() {
        let mut sampler = DualProfileSampler::new(BetaPosterior::uniform(), BetaPosterior::uniform(), 0.0);
        sampler.update_model(interaction(SwipeAction::Reject));
        assert_eq!(sampler.profile_blend(), 0.0);

        let mut sampler = DualProfileSampler::new(BetaPosterior::uniform(), BetaPosterior::uniform(), 1.0);
        sampler.update_model(interaction(SwipeAction::Accept));
        assert_eq!(sampler.profile_blend(), 1.0);
    }

    #[test]
    fn test_dominant_profile_always_updated() {
        let mut rng = StdRng::seed_from_u64(17);

        // Exploitation dominant
        let mut sampler = DualProfileSampler::new(BetaPosterior::uniform(), BetaPosterior::uniform(), 0.2);
        sampler.update_model_with(interaction(SwipeAction::Accept), &mut rng);
        let params = sampler.parameters();
        assert_eq!(params.exploit_alpha, 2.0);
        assert_eq!(params.exploit_beta, 1.0);

        // Exploration dominant
        let mut sampler = DualProfileSampler::new(BetaPosterior::uniform(), BetaPosterior::uniform(), 0.8);
        sampler.update_model_with(interaction(SwipeAction::Reject), &mut rng);
        let params = sampler.parameters();
        assert_eq!(params.explore_alpha, 1.0);
        assert_eq!(params.explore_beta, 2.0);
    }

    #[test]
    fn test_secondary_update_rate() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut sampler = DualProfileSampler::new(BetaPosterior::uniform(), BetaPosterior::uniform(), 0.0);

        // Rejects keep the blend pinned at 0, so exploitation stays dominant
        for _ in 0..10_000 {
            sampler.update_model_with(interaction(SwipeAction::Reject), &mut rng);
        }

        let params = sampler.parameters();
        assert_eq!(params.exploit_beta, 10_001.0);
        let secondary_rate = (params.explore_beta - 1.0) / 10_000.0;
        assert!((secondary_rate - 0.3).abs() < 0.02, "secondary rate {}", secondary_rate);
    }

    #[test]
    fn test_neutral_priors() {
        let priors = Priors::neutral();
        assert_eq!(priors.exploitation, BetaPosterior::uniform());
        assert_eq!(priors.exploration, BetaPosterior::uniform());
        assert_eq!(priors.blend, 0.5);
    }
}
