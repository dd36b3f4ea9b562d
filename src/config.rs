use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::core::engine::EngineConfig;
use crate::core::occupational::DimensionWeights;
use crate::models::ModelParameters;

/// Scorer configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub engine: EngineSettings,
    #[serde(default)]
    #[validate(nested)]
    pub priors: PriorSettings,
    #[serde(default)]
    #[validate(nested)]
    pub cache: CacheSettings,
    #[serde(default)]
    #[validate(nested)]
    pub occupational: OccupationalSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EngineSettings {
    #[serde(default)]
    pub occupational_enhancement: bool,
    #[serde(default = "default_profile_blend")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub initial_profile_blend: f64,
    #[serde(default = "default_latency_budget_ms")]
    #[validate(range(min = 0.1))]
    pub latency_budget_ms: f64,
    #[serde(default = "default_ema_alpha")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub ema_alpha: f64,
    #[validate(range(min = 1))]
    pub max_concurrency: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            occupational_enhancement: false,
            initial_profile_blend: default_profile_blend(),
            latency_budget_ms: default_latency_budget_ms(),
            ema_alpha: default_ema_alpha(),
            max_concurrency: None,
        }
    }
}

fn default_profile_blend() -> f64 { 0.5 }
fn default_latency_budget_ms() -> f64 { 10.0 }
fn default_ema_alpha() -> f64 { 0.1 }

/// Starting Beta parameters for a fresh session
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PriorSettings {
    #[serde(default = "default_prior")]
    #[validate(range(min = 0.01))]
    pub exploit_alpha: f64,
    #[serde(default = "default_prior")]
    #[validate(range(min = 0.01))]
    pub exploit_beta: f64,
    #[serde(default = "default_prior")]
    #[validate(range(min = 0.01))]
    pub explore_alpha: f64,
    #[serde(default = "default_prior")]
    #[validate(range(min = 0.01))]
    pub explore_beta: f64,
}

impl Default for PriorSettings {
    fn default() -> Self {
        Self {
            exploit_alpha: default_prior(),
            exploit_beta: default_prior(),
            explore_alpha: default_prior(),
            explore_beta: default_prior(),
        }
    }
}

fn default_prior() -> f64 { 1.0 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    #[validate(range(min = 1))]
    pub max_capacity: u64,
    #[serde(default = "default_cache_ttl")]
    #[validate(range(min = 1))]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 { 10_000 }
fn default_cache_ttl() -> u64 { 300 }

/// Occupational dimension weights and the enhancement blend
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OccupationalSettings {
    #[serde(default = "default_skills_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub skills: f64,
    #[serde(default = "default_education_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub education: f64,
    #[serde(default = "default_experience_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub experience: f64,
    #[serde(default = "default_work_activities_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub work_activities: f64,
    #[serde(default = "default_interests_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub interests: f64,
    #[serde(default = "default_enhancement_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub enhancement_weight: f64,
}

impl Default for OccupationalSettings {
    fn default() -> Self {
        Self {
            skills: default_skills_weight(),
            education: default_education_weight(),
            experience: default_experience_weight(),
            work_activities: default_work_activities_weight(),
            interests: default_interests_weight(),
            enhancement_weight: default_enhancement_weight(),
        }
    }
}

fn default_skills_weight() -> f64 { 0.30 }
fn default_education_weight() -> f64 { 0.15 }
fn default_experience_weight() -> f64 { 0.15 }
fn default_work_activities_weight() -> f64 { 0.25 }
fn default_interests_weight() -> f64 { 0.15 }
fn default_enhancement_weight() -> f64 { 0.30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Later sources override earlier ones:
    /// 1. Defaults on the structs
    /// 2. `config/default` then `config/local` (any format `config` reads)
    /// 3. Environment variables, e.g. `JOBFEED__ENGINE__LATENCY_BUDGET_MS=8`
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let settings: Self = settings.try_deserialize()?;
        settings
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid configuration: {}", e)))?;
        Ok(settings)
    }

    pub fn model_parameters(&self) -> ModelParameters {
        ModelParameters {
            exploit_alpha: self.priors.exploit_alpha,
            exploit_beta: self.priors.exploit_beta,
            explore_alpha: self.priors.explore_alpha,
            explore_beta: self.priors.explore_beta,
            profile_blend: self.engine.initial_profile_blend,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            occupational_enhancement: self.engine.occupational_enhancement,
            enhancement_weight: self.occupational.enhancement_weight,
            parameters: self.model_parameters(),
            latency_budget_ms: self.engine.latency_budget_ms,
            ema_alpha: self.engine.ema_alpha,
            max_concurrency: self.engine.max_concurrency,
            cache_capacity: self.cache.max_capacity,
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
        }
    }

    pub fn dimension_weights(&self) -> DimensionWeights {
        DimensionWeights {
            skills: self.occupational.skills,
            education: self.occupational.education,
            experience: self.occupational.experience,
            work_activities: self.occupational.work_activities,
            interests: self.occupational.interests,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("JOBFEED")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = Settings::default().dimension_weights();
        assert_eq!(weights, DimensionWeights::default());
        assert_eq!(OccupationalSettings::default().enhancement_weight, 0.30);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_default_engine_config() {
        let config = Settings::default().engine_config();
        assert!(!config.occupational_enhancement);
        assert_eq!(config.latency_budget_ms, 10.0);
        assert_eq!(config.ema_alpha, 0.1);
        assert_eq!(config.parameters, ModelParameters::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("jobfeed-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"engine": {{"occupational_enhancement": true, "initial_profile_blend": 0.3}},
                "priors": {{"exploit_alpha": 5.0}}}}"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(settings.engine.occupational_enhancement);
        let parameters = settings.model_parameters();
        assert_eq!(parameters.exploit_alpha, 5.0);
        assert_eq!(parameters.exploit_beta, 1.0);
        assert_eq!(parameters.profile_blend, 0.3);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let path = std::env::temp_dir().join(format!("jobfeed-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"engine": {"initial_profile_blend": 1.5}}"#).unwrap();

        let result = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Message(_))));
    }
}
