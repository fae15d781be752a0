use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::{lenient_count, percent_of, sanitize_count};
use crate::Platform;

/// Current per-platform targets. Callers pass a table into the classifier on every
/// evaluation; nothing here is cached.
pub type StandardsTable = BTreeMap<Platform, PerformanceStandard>;

/// Reach and engagement targets for a single tier. Missing or malformed values read as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default, deserialize_with = "lenient_count")]
    pub target_reach: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub target_engagement: f64,
}

impl Threshold {
    pub fn new(target_reach: f64, target_engagement: f64) -> Self {
        Self {
            target_reach: sanitize_count(target_reach),
            target_engagement: sanitize_count(target_engagement),
        }
    }

    /// Engagement rate implied by the two targets; `0` when no reach target is set.
    pub fn derived_rate(&self) -> f64 {
        percent_of(self.target_engagement, self.target_reach)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    #[serde(default, deserialize_with = "lenient_count")]
    pub target_reach: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub target_engagement: f64,
    #[serde(default = "default_reach_label")]
    pub reach_label: String,
    #[serde(default = "default_engagement_label")]
    pub engagement_label: String,
}

impl Default for ReferenceTarget {
    fn default() -> Self {
        Self {
            target_reach: 0.0,
            target_engagement: 0.0,
            reach_label: default_reach_label(),
            engagement_label: default_engagement_label(),
        }
    }
}

fn default_reach_label() -> String {
    "reach".to_string()
}

fn default_engagement_label() -> String {
    "engagement".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerformanceStandard {
    /// Ordered high > standard > low tiers.
    Tiered {
        #[serde(default)]
        high: Threshold,
        #[serde(default)]
        standard: Threshold,
        #[serde(default)]
        low: Threshold,
    },
    Simple(Threshold),
    /// Two independent benchmarks with platform-specific metric names.
    Reference(ReferenceTarget),
}

impl PerformanceStandard {
    pub fn kind(&self) -> &'static str {
        match self {
            PerformanceStandard::Tiered { .. } => "tiered",
            PerformanceStandard::Simple(_) => "simple",
            PerformanceStandard::Reference(_) => "reference",
        }
    }
}

/// Built-in targets. Facebook's tiers pair a reach target with the engagement count
/// that hits the tier's rate target at that reach (5%, 3%, 1.5%).
pub fn default_standards() -> StandardsTable {
    let mut table = StandardsTable::new();
    table.insert(
        Platform::Facebook,
        PerformanceStandard::Tiered {
            high: Threshold::new(2000.0, 100.0),
            standard: Threshold::new(1500.0, 45.0),
            low: Threshold::new(1000.0, 15.0),
        },
    );
    table.insert(
        Platform::Instagram,
        PerformanceStandard::Simple(Threshold::new(900.0, 30.0)),
    );
    table.insert(
        Platform::YouTube,
        PerformanceStandard::Simple(Threshold::new(500.0, 10.0)),
    );
    table.insert(
        Platform::Threads,
        PerformanceStandard::Reference(ReferenceTarget {
            target_reach: 84_000.0,
            target_engagement: 1_585.0,
            reach_label: "views".to_string(),
            engagement_label: "interactions".to_string(),
        }),
    );
    table
}

/// Resolves platform names from a config file or request body. Unknown names are
/// reported back so the caller can log them.
pub fn table_from_named(
    named: BTreeMap<String, PerformanceStandard>,
) -> (StandardsTable, Vec<String>) {
    let mut table = StandardsTable::new();
    let mut unknown = Vec::new();
    for (name, standard) in named {
        match Platform::from_str(&name) {
            Some(platform) => {
                table.insert(platform, standard);
            }
            None => unknown.push(name),
        }
    }
    (table, unknown)
}

pub fn table_to_named(table: &StandardsTable) -> BTreeMap<String, PerformanceStandard> {
    table
        .iter()
        .map(|(platform, standard)| (platform.label().to_string(), standard.clone()))
        .collect()
}
