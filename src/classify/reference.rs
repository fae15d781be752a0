use crate::classify::{PerformanceResult, Severity};
use crate::format_number;
use crate::metrics::Aggregate;
use crate::standards::ReferenceTarget;

/// Two independent benchmark checks. Rate is not consulted: on these platforms the
/// first metric counts views, so engagement per view says little about the post.
pub fn evaluate(aggregate: &Aggregate, target: &ReferenceTarget) -> PerformanceResult {
    let tooltip = format!(
        "Benchmark: {} ≥ {} | {} ≥ {}",
        target.reach_label,
        format_number(target.target_reach),
        target.engagement_label,
        format_number(target.target_engagement)
    );

    let reach_hit = aggregate.reach >= target.target_reach;
    let engagement_hit = aggregate.engagement >= target.target_engagement;

    match (reach_hit, engagement_hit) {
        (true, true) => PerformanceResult::new("Double target", Severity::High, tooltip),
        (true, false) => PerformanceResult::new(
            format!("{} target met", target.reach_label),
            Severity::Standard,
            tooltip,
        ),
        (false, true) => PerformanceResult::new(
            format!("{} target met", target.engagement_label),
            Severity::Standard,
            tooltip,
        ),
        (false, false) => PerformanceResult::new("Below benchmark", Severity::Fail, tooltip),
    }
}
