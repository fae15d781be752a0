use crate::classify::{check_threshold, describe_threshold, with_branch, PerformanceResult, Severity};
use crate::metrics::Aggregate;
use crate::standards::Threshold;

pub fn evaluate(aggregate: &Aggregate, threshold: &Threshold) -> PerformanceResult {
    let tooltip = format!("Target: {}", describe_threshold(threshold));
    let hit = check_threshold(threshold, aggregate);
    if hit.passed() {
        PerformanceResult::new(with_branch("Met", &hit), Severity::Standard, tooltip)
    } else {
        PerformanceResult::new("Below target", Severity::Fail, tooltip)
    }
}
