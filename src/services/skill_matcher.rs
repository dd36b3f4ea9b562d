use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors returned by a skill matcher
///
/// The occupational scorer treats any of these as a signal to fall back to
/// exact set matching.
#[derive(Debug, Error)]
pub enum SkillMatchError {
    #[error("Skill taxonomy unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to load skill taxonomy: {0}")]
    Load(#[from] std::io::Error),

    #[error("Invalid skill taxonomy: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fuzzy matcher of user skills against job requirements
#[async_trait]
pub trait SkillMatcher: Send + Sync {
    /// Match score in [0, 1]
    async fn calculate_match_score(
        &self,
        user_skills: &[String],
        job_requirements: &[String],
    ) -> Result<f64, SkillMatchError>;
}

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    skills: Vec<TaxonomyEntry>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyEntry {
    canonical: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Synonym-aware matcher backed by a skill taxonomy
///
/// Every alias maps to its canonical skill; the score is the share of job
/// requirements whose canonical form the user holds.
#[derive(Debug, Clone, Default)]
pub struct TaxonomySkillMatcher {
    canonical: HashMap<String, String>,
}

impl TaxonomySkillMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"skills": [{"canonical": "JavaScript", "aliases": ["js"]}]}`
    pub fn from_json(json: &str) -> Result<Self, SkillMatchError> {
        let document: TaxonomyDocument = serde_json::from_str(json)?;
        let mut matcher = Self::new();
        for entry in document.skills {
            matcher.add_skill(&entry.canonical, entry.aliases.iter().map(String::as_str));
        }
        Ok(matcher)
    }

    pub fn add_skill<'a, I>(&mut self, canonical: &str, aliases: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let key = normalize(canonical);
        self.canonical.insert(key.clone(), key.clone());
        for alias in aliases {
            self.canonical.insert(normalize(alias), key.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    fn canonicalize(&self, skill: &str) -> String {
        let normalized = normalize(skill);
        match self.canonical.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

#[async_trait]
impl SkillMatcher for TaxonomySkillMatcher {
    async fn calculate_match_score(
        &self,
        user_skills: &[String],
        job_requirements: &[String],
    ) -> Result<f64, SkillMatchError> {
        if self.canonical.is_empty() {
            return Err(SkillMatchError::Unavailable("taxonomy is empty".to_string()));
        }
        if job_requirements.is_empty() {
            return Ok(0.5);
        }

        let user: HashSet<String> = user_skills.iter().map(|s| self.canonicalize(s)).collect();
        let required: HashSet<String> = job_requirements.iter().map(|s| self.canonicalize(s)).collect();

        let covered = required.iter().filter(|skill| user.contains(*skill)).count();
        Ok(covered as f64 / required.len() as f64)
    }
}

/// Taxonomy matcher loaded from disk on first use
///
/// A failed load is not retried; every later call reports the matcher as
/// unavailable so callers keep using their fallback.
#[derive(Debug)]
pub struct LazyTaxonomyMatcher {
    path: PathBuf,
    matcher: OnceCell<Option<TaxonomySkillMatcher>>,
}

impl LazyTaxonomyMatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            matcher: OnceCell::new(),
        }
    }

    async fn get(&self) -> Option<&TaxonomySkillMatcher> {
        self.matcher
            .get_or_init(|| async {
                let loaded = match tokio::fs::read_to_string(&self.path).await {
                    Ok(json) => TaxonomySkillMatcher::from_json(&json),
                    Err(e) => Err(SkillMatchError::from(e)),
                };
                match loaded {
                    Ok(matcher) => {
                        tracing::info!(path = %self.path.display(), entries = matcher.len(), "Skill taxonomy loaded");
                        Some(matcher)
                    }
                    Err(e) => {
                        tracing::warn!(path = %self.path.display(), error = %e, "Skill taxonomy failed to load");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

#[async_trait]
impl SkillMatcher for LazyTaxonomyMatcher {
    async fn calculate_match_score(
        &self,
        user_skills: &[String],
        job_requirements: &[String],
    ) -> Result<f64, SkillMatchError> {
        match self.get().await {
            Some(matcher) => matcher.calculate_match_score(user_skills, job_requirements).await,
            None => Err(SkillMatchError::Unavailable(self.path.display().to_string())),
        }
    }
}
