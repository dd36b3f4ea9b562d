use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{ActivityProfile, InterestProfile, OccupationCredentials};

/// Errors that can occur while loading occupation reference data
#[derive(Debug, Error)]
pub enum OccupationDataError {
    #[error("Failed to read occupation data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid occupation data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup of occupation reference records by occupation code
///
/// Unknown codes yield `None`; implementations never fail a lookup.
#[async_trait]
pub trait OccupationDataSource: Send + Sync {
    async fn credentials(&self, code: &str) -> Option<Arc<OccupationCredentials>>;

    async fn work_activities(&self, code: &str) -> Option<Arc<ActivityProfile>>;

    async fn interests(&self, code: &str) -> Option<Arc<InterestProfile>>;
}

/// In-memory occupation store
///
/// Built programmatically or from one JSON document of the form
/// `{"version": "...", "credentials": [...], "workActivities": [...], "interests": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOccupationStore {
    credentials: HashMap<String, Arc<OccupationCredentials>>,
    activities: HashMap<String, Arc<ActivityProfile>>,
    interests: HashMap<String, Arc<InterestProfile>>,
}

#[derive(Debug, Deserialize)]
struct OccupationDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    credentials: Vec<OccupationCredentials>,
    #[serde(rename = "workActivities", default)]
    work_activities: Vec<ActivityProfile>,
    #[serde(default)]
    interests: Vec<InterestProfile>,
}

impl InMemoryOccupationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON occupation document
    pub fn from_json(json: &str) -> Result<Self, OccupationDataError> {
        let document: OccupationDocument = serde_json::from_str(json)?;

        let mut store = Self::new();
        for record in document.credentials {
            store.insert_credentials(record);
        }
        for record in document.work_activities {
            store.insert_work_activities(record);
        }
        for record in document.interests {
            store.insert_interests(record);
        }

        tracing::info!(
            version = document.version.as_deref().unwrap_or("unknown"),
            credentials = store.credentials.len(),
            work_activities = store.activities.len(),
            interests = store.interests.len(),
            "Occupation data loaded"
        );

        Ok(store)
    }

    /// Read and parse a JSON occupation document from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, OccupationDataError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    pub fn insert_credentials(&mut self, record: OccupationCredentials) {
        self.credentials
            .insert(record.occupation_code.clone(), Arc::new(record));
    }

    pub fn insert_work_activities(&mut self, record: ActivityProfile) {
        self.activities
            .insert(record.occupation_code.clone(), Arc::new(record));
    }

    pub fn insert_interests(&mut self, record: InterestProfile) {
        self.interests
            .insert(record.occupation_code.clone(), Arc::new(record));
    }

    /// Number of occupations with a complete record set
    pub fn complete_occupations(&self) -> usize {
        self.credentials
            .keys()
            .filter(|code| self.activities.contains_key(*code) && self.interests.contains_key(*code))
            .count()
    }
}

#[async_trait]
impl OccupationDataSource for InMemoryOccupationStore {
    async fn credentials(&self, code: &str) -> Option<Arc<OccupationCredentials>> {
        self.credentials.get(code).cloned()
    }

    async fn work_activities(&self, code: &str) -> Option<Arc<ActivityProfile>> {
        self.activities.get(code).cloned()
    }

    async fn interests(&self, code: &str) -> Option<Arc<InterestProfile>> {
        self.interests.get(code).cloned()
    }
}
