use crate::classify::{check_threshold, describe_threshold, with_branch, PerformanceResult, Severity};
use crate::metrics::Aggregate;
use crate::standards::Threshold;

const TIERS: [(&str, Severity); 3] = [
    ("High", Severity::High),
    ("Standard", Severity::Standard),
    ("Low", Severity::Low),
];

/// Tiers are given high first; the first one whose OR-check holds wins.
pub fn evaluate(aggregate: &Aggregate, tiers: [&Threshold; 3]) -> PerformanceResult {
    let tooltip = tooltip(&tiers);

    for ((name, severity), threshold) in TIERS.iter().zip(tiers.iter()) {
        let hit = check_threshold(threshold, aggregate);
        if hit.passed() {
            return PerformanceResult::new(with_branch(name, &hit), *severity, tooltip);
        }
    }

    PerformanceResult::new("Below target", Severity::Fail, tooltip)
}

fn tooltip(tiers: &[&Threshold; 3]) -> String {
    TIERS
        .iter()
        .zip(tiers.iter())
        .map(|((name, _), threshold)| format!("{}: {}", name, describe_threshold(threshold)))
        .collect::<Vec<_>>()
        .join(" | ")
}
