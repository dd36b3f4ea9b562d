use std::cmp::Ordering;
use std::collections::HashSet;

/// Distance between two sectors without a table entry
pub const DEFAULT_DOMAIN_DISTANCE: f64 = 0.7;

/// Sector distance table used to rank exploration targets
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossDomainExplorer;

impl CrossDomainExplorer {
    pub fn new() -> Self {
        Self
    }

    /// Distance in [0, 1] between two sectors, case-insensitive
    pub fn domain_distance(&self, from: &str, to: &str) -> f64 {
        let from = from.to_lowercase();
        let to = to.to_lowercase();
        if from == to {
            return 0.0;
        }

        match (from.as_str(), to.as_str()) {
            ("technology", "finance") | ("finance", "technology") => 0.3,
            ("technology", "healthcare") | ("healthcare", "technology") => 0.5,
            ("technology", "education") | ("education", "technology") => 0.4,
            ("finance", "healthcare") | ("healthcare", "finance") => 0.6,
            ("finance", "education") | ("education", "finance") => 0.5,
            ("healthcare", "education") | ("education", "healthcare") => 0.3,
            _ => DEFAULT_DOMAIN_DISTANCE,
        }
    }

    /// Mean distance from every current domain to `candidate`
    pub fn mean_distance(&self, current: &HashSet<String>, candidate: &str) -> f64 {
        if current.is_empty() {
            return DEFAULT_DOMAIN_DISTANCE;
        }
        let total: f64 = current.iter().map(|domain| self.domain_distance(domain, candidate)).sum();
        total / current.len() as f64
    }

    /// Domains not yet explored, furthest from the current ones first
    ///
    /// Ties are ordered by name so the suggestion list is stable.
    pub fn suggest_explorations(&self, current: &HashSet<String>, available: &HashSet<String>) -> Vec<String> {
        let mut ranked: Vec<(f64, &String)> = available
            .difference(current)
            .map(|domain| (self.mean_distance(current, domain), domain))
            .collect();

        ranked.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });

        ranked.into_iter().map(|(_, domain)| domain.clone()).collect()
    }
}
