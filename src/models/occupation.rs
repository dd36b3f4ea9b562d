use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::RiasecProfile;

/// Education and experience requirements of an occupation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupationCredentials {
    #[serde(rename = "occupationCode")]
    pub occupation_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "educationRequirements")]
    pub education: EducationRequirements,
    #[serde(rename = "experienceRequirements")]
    pub experience: ExperienceRequirements,
}

/// Typical required education, 1-12 ordinal scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EducationRequirements {
    #[serde(rename = "requiredLevel")]
    pub required_level: u8,
    #[serde(rename = "percentFrequency", default)]
    pub percent_frequency: f64,
}

/// Related work experience, 1-11 ordinal scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperienceRequirements {
    #[serde(rename = "relatedWorkExperience")]
    pub related_work_experience: u8,
    #[serde(rename = "percentFrequency", default)]
    pub percent_frequency: f64,
}

/// Single work activity rating for an occupation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivityRating {
    pub importance: f64,
    #[serde(default)]
    pub level: f64,
}

/// Work activity importance profile of an occupation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityProfile {
    #[serde(rename = "occupationCode")]
    pub occupation_code: String,
    pub activities: HashMap<String, ActivityRating>,
}

impl ActivityProfile {
    pub fn new<I, S>(occupation_code: impl Into<String>, importances: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            occupation_code: occupation_code.into(),
            activities: importances
                .into_iter()
                .map(|(id, importance)| (id.into(), ActivityRating { importance, level: 0.0 }))
                .collect(),
        }
    }

    /// Activity id to importance
    pub fn importances(&self) -> HashMap<String, f64> {
        self.activities
            .iter()
            .map(|(id, rating)| (id.clone(), rating.importance))
            .collect()
    }
}

/// RIASEC interest profile of an occupation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestProfile {
    #[serde(rename = "occupationCode")]
    pub occupation_code: String,
    pub riasec: RiasecProfile,
}

/// Approximate years of experience for an O*NET related-work-experience level
///
/// | level | meaning               | years |
/// |-------|-----------------------|-------|
/// | 1     | none                  | 0     |
/// | 2-4   | up to 1 month         | 0.08  |
/// | 5-6   | 1-6 months            | 0.25  |
/// | 7     | 6 months - 1 year     | 0.75  |
/// | 8     | 1-2 years             | 1.5   |
/// | 9     | 2-4 years             | 3     |
/// | 10    | 4-10 years            | 7     |
/// | 11    | over 10 years         | 12    |
pub fn experience_level_years(level: u8) -> f64 {
    match level {
        1 => 0.0,
        2..=4 => 0.08,
        5..=6 => 0.25,
        7 => 0.75,
        8 => 1.5,
        9 => 3.0,
        10 => 7.0,
        11 => 12.0,
        _ => 2.0,
    }
}
