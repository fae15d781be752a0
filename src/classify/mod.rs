//! Turns an aggregated metrics snapshot into a performance tier.
//!
//! Early exits run in a fixed order: metrics-disabled posts are "not applicable",
//! zero reach is "no data yet", and a platform without a configured standard is
//! "no standard". Only then does the platform's standard kind pick the strategy.

pub mod reference;
pub mod simple;
pub mod tiered;

use serde::Serialize;

use crate::metrics::Aggregate;
use crate::standards::{PerformanceStandard, StandardsTable, Threshold};
use crate::{format_number, format_rate, Platform, Post, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Standard,
    High,
    Fail,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Standard => "standard",
            Severity::High => "high",
            Severity::Fail => "fail",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::None => "gray",
            Severity::Low => "orange",
            Severity::Standard => "green",
            Severity::High => "gold",
            Severity::Fail => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceResult {
    pub label: String,
    pub severity: Severity,
    pub tooltip: String,
}

impl PerformanceResult {
    pub fn new(label: impl Into<String>, severity: Severity, tooltip: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            severity,
            tooltip: tooltip.into(),
        }
    }

    pub fn not_applicable() -> Self {
        Self::new(
            "N/A",
            Severity::None,
            "Metrics are not tracked for this platform or format",
        )
    }

    pub fn no_data() -> Self {
        Self::new(
            "No data yet",
            Severity::None,
            "Reach has not been entered for this window",
        )
    }

    pub fn no_standard(platform: Platform) -> Self {
        Self::new(
            "No standard",
            Severity::None,
            format!("No performance standard is configured for {}", platform.label()),
        )
    }

    pub fn color(&self) -> &'static str {
        self.severity.color()
    }

    pub fn passed(&self) -> bool {
        matches!(
            self.severity,
            Severity::Low | Severity::Standard | Severity::High
        )
    }
}

/// Which of the independent OR-conditions of a threshold held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetHit {
    pub reach: bool,
    pub engagement: bool,
    pub rate: bool,
}

impl TargetHit {
    pub fn passed(&self) -> bool {
        self.reach || self.engagement || self.rate
    }

    /// Display-only detail of the branch that passed.
    pub fn branch_label(&self) -> Option<&'static str> {
        match (self.reach, self.engagement, self.rate) {
            (true, true, _) => Some("reach + engagement"),
            (true, false, _) => Some("reach"),
            (false, true, _) => Some("engagement"),
            (false, false, true) => Some("rate"),
            (false, false, false) => None,
        }
    }
}

/// Reach OR engagement OR rate against one threshold. A zero target makes its
/// branch pass for any measured value.
pub fn check_threshold(threshold: &Threshold, aggregate: &Aggregate) -> TargetHit {
    TargetHit {
        reach: aggregate.reach >= threshold.target_reach,
        engagement: aggregate.engagement >= threshold.target_engagement,
        rate: aggregate.rate >= threshold.derived_rate(),
    }
}

pub fn classify(post: &Post, window: Window, standards: &StandardsTable) -> PerformanceResult {
    evaluate(
        &post.metrics(window).aggregate(),
        post.platform,
        post.metrics_disabled(),
        standards,
    )
}

pub fn evaluate(
    aggregate: &Aggregate,
    platform: Platform,
    metrics_disabled: bool,
    standards: &StandardsTable,
) -> PerformanceResult {
    if metrics_disabled {
        return PerformanceResult::not_applicable();
    }
    if !aggregate.is_measured() {
        return PerformanceResult::no_data();
    }
    let Some(standard) = standards.get(&platform) else {
        return PerformanceResult::no_standard(platform);
    };

    let result = match standard {
        PerformanceStandard::Tiered { high, standard, low } => {
            tiered::evaluate(aggregate, [high, standard, low])
        }
        PerformanceStandard::Simple(threshold) => simple::evaluate(aggregate, threshold),
        PerformanceStandard::Reference(target) => reference::evaluate(aggregate, target),
    };
    tracing::trace!(
        platform = platform.label(),
        kind = standard.kind(),
        severity = result.severity.label(),
        "classified snapshot"
    );
    result
}

fn with_branch(name: &str, hit: &TargetHit) -> String {
    match hit.branch_label() {
        Some(branch) => format!("{} ({})", name, branch),
        None => name.to_string(),
    }
}

fn describe_threshold(threshold: &Threshold) -> String {
    format!(
        "reach ≥ {} or engagement ≥ {} or rate ≥ {}",
        format_number(threshold.target_reach),
        format_number(threshold.target_engagement),
        format_rate(threshold.derived_rate())
    )
}
