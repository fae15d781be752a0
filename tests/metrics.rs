use post_kpi::metrics::coerce_value;
use post_kpi::{safe_number, Aggregate, MetricsSnapshot};
use serde_json::json;

#[test]
fn safe_number_coerces_malformed_input_to_zero() {
    for raw in ["abc", "NaN", "nan", "inf", "-inf", "infinity", "-Infinity", "", "   ", "12abc", "--3"] {
        assert_eq!(safe_number(raw), 0.0, "input {:?}", raw);
    }
}

#[test]
fn safe_number_strips_thousand_separators() {
    assert_eq!(safe_number("1,234"), 1234.0);
    assert_eq!(safe_number(" 12,345,678 "), 12_345_678.0);
    assert_eq!(safe_number("1,234.5"), 1234.5);
    assert_eq!(safe_number("42"), 42.0);
}

#[test]
fn coerce_value_handles_json_shapes() {
    assert_eq!(coerce_value(&json!(null)), 0.0);
    assert_eq!(coerce_value(&json!(true)), 0.0);
    assert_eq!(coerce_value(&json!([1, 2])), 0.0);
    assert_eq!(coerce_value(&json!("2,500")), 2500.0);
    assert_eq!(coerce_value(&json!(17)), 17.0);
}

#[test]
fn snapshot_deserializes_leniently() {
    let snapshot: MetricsSnapshot = serde_json::from_value(json!({
        "reach": "1,500",
        "likes": "abc",
        "comments": null,
        "shares": -3
    }))
    .unwrap();

    assert_eq!(snapshot, MetricsSnapshot::new(1500.0, 0.0, 0.0, 0.0));

    let empty: MetricsSnapshot = serde_json::from_value(json!({})).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn non_finite_counts_become_zero() {
    let snapshot = MetricsSnapshot::new(f64::NAN, f64::INFINITY, 3.0, f64::NEG_INFINITY);
    assert_eq!(snapshot, MetricsSnapshot::new(0.0, 0.0, 3.0, 0.0));

    let raw = MetricsSnapshot {
        reach: f64::INFINITY,
        likes: f64::NAN,
        comments: 2.0,
        shares: 1.0,
    };
    let aggregate = raw.aggregate();
    assert_eq!(aggregate.reach, 0.0);
    assert_eq!(aggregate.engagement, 3.0);
    assert_eq!(aggregate.rate, 0.0);
}

#[test]
fn rate_is_zero_without_reach() {
    let aggregate = Aggregate::new(0.0, 50.0);
    assert_eq!(aggregate.rate, 0.0);
    assert!(!aggregate.is_measured());
    assert_eq!(aggregate.rate_display(), "-");
}

#[test]
fn rate_is_engagement_per_hundred_reach() {
    let aggregate = MetricsSnapshot::new(200.0, 6.0, 3.0, 1.0).aggregate();
    assert_eq!(aggregate.engagement, 10.0);
    assert!((aggregate.rate - 5.0).abs() < 1e-9);
    assert_eq!(aggregate.rate_display(), "5.00%");
}
