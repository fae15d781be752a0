use chrono::NaiveDate;
use post_kpi::classify::check_threshold;
use post_kpi::standards::default_standards;
use post_kpi::{
    classify, evaluate, Aggregate, MetricsSnapshot, PerformanceStandard, Platform, Post,
    PostFormat, ReferenceTarget, Severity, StandardsTable, Threshold, Window,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn post_with_7d(platform: Platform, format: PostFormat, snapshot: MetricsSnapshot) -> Post {
    let mut post = Post::new("post", date(2025, 1, 1), platform, format);
    post.metrics_7d = snapshot;
    post
}

fn simple_table(platform: Platform, reach: f64, engagement: f64) -> StandardsTable {
    let mut table = StandardsTable::new();
    table.insert(
        platform,
        PerformanceStandard::Simple(Threshold::new(reach, engagement)),
    );
    table
}

#[test]
fn facebook_high_tier_passes_on_reach_alone() {
    let standards = default_standards();
    let post = post_with_7d(
        Platform::Facebook,
        PostFormat::SingleImage,
        MetricsSnapshot::new(2100.0, 40.0, 10.0, 5.0),
    );

    let aggregate = post.metrics_7d.aggregate();
    assert!((aggregate.engagement - 55.0).abs() < 1e-9);

    let result = classify(&post, Window::SevenDay, &standards);
    assert_eq!(result.severity, Severity::High);
    assert_eq!(result.label, "High (reach)");
    assert_eq!(result.color(), "gold");
    assert!(result.tooltip.contains("2,000"));
    assert!(result.tooltip.contains("1,500"));
    assert!(result.tooltip.contains("1,000"));
}

#[test]
fn tiered_stops_at_first_satisfied_tier() {
    let standards = default_standards();
    let cases = [
        (MetricsSnapshot::new(1600.0, 20.0, 0.0, 0.0), Severity::Standard, "Standard (reach)"),
        (MetricsSnapshot::new(1200.0, 10.0, 0.0, 0.0), Severity::Low, "Low (reach)"),
        (MetricsSnapshot::new(500.0, 30.0, 0.0, 0.0), Severity::High, "High (rate)"),
        (MetricsSnapshot::new(2500.0, 80.0, 20.0, 10.0), Severity::High, "High (reach + engagement)"),
        (MetricsSnapshot::new(500.0, 5.0, 0.0, 0.0), Severity::Fail, "Below target"),
    ];

    for (snapshot, severity, label) in cases {
        let post = post_with_7d(Platform::Facebook, PostFormat::MultiImage, snapshot);
        let result = classify(&post, Window::SevenDay, &standards);
        assert_eq!(result.severity, severity, "snapshot {:?}", snapshot);
        assert_eq!(result.label, label);
    }
}

#[test]
fn high_tier_match_is_never_downgraded() {
    let standards = default_standards();
    let snapshots = [
        MetricsSnapshot::new(2000.0, 0.0, 0.0, 0.0),
        MetricsSnapshot::new(10.0, 100.0, 0.0, 0.0),
        MetricsSnapshot::new(100.0, 3.0, 2.0, 0.0),
        MetricsSnapshot::new(50_000.0, 4_000.0, 300.0, 200.0),
    ];

    for snapshot in snapshots {
        let result = evaluate(&snapshot.aggregate(), Platform::Facebook, false, &standards);
        assert_eq!(result.severity, Severity::High, "snapshot {:?}", snapshot);
    }
}

#[test]
fn simple_standard_uses_or_across_metrics() {
    let threshold = Threshold::new(1000.0, 100.0);

    assert!(check_threshold(&threshold, &Aggregate::new(1500.0, 0.0)).passed());
    assert!(check_threshold(&threshold, &Aggregate::new(0.0, 150.0)).passed());
    assert!(!check_threshold(&threshold, &Aggregate::new(900.0, 50.0)).passed());

    let standards = simple_table(Platform::Instagram, 1000.0, 100.0);
    let result = evaluate(&Aggregate::new(1500.0, 0.0), Platform::Instagram, false, &standards);
    assert_eq!(result.severity, Severity::Standard);
    assert_eq!(result.label, "Met (reach)");

    let result = evaluate(&Aggregate::new(900.0, 150.0), Platform::Instagram, false, &standards);
    assert_eq!(result.label, "Met (engagement)");

    let result = evaluate(&Aggregate::new(900.0, 50.0), Platform::Instagram, false, &standards);
    assert_eq!(result.severity, Severity::Fail);
    assert!(result.tooltip.contains("reach ≥ 1,000"));
}

#[test]
fn zero_reach_is_not_yet_measured() {
    let standards = default_standards();
    for platform in [Platform::Facebook, Platform::Instagram, Platform::Threads] {
        let post = post_with_7d(
            platform,
            PostFormat::ShortVideo,
            MetricsSnapshot::new(0.0, 500.0, 400.0, 300.0),
        );
        let aggregate = post.metrics_7d.aggregate();
        assert_eq!(aggregate.rate, 0.0);

        let result = classify(&post, Window::SevenDay, &standards);
        assert_eq!(result.label, "No data yet");
        assert_eq!(result.severity, Severity::None);
    }
}

#[test]
fn disabled_posts_are_not_applicable() {
    let standards = default_standards();
    let snapshot = MetricsSnapshot::new(100_000.0, 5_000.0, 0.0, 0.0);

    let line = post_with_7d(Platform::Line, PostFormat::TextOnly, snapshot);
    let story = post_with_7d(Platform::Facebook, PostFormat::Story, snapshot);
    let comment = post_with_7d(Platform::Instagram, PostFormat::CommentOnly, snapshot);

    for post in [line, story, comment] {
        assert!(post.metrics_disabled());
        let result = classify(&post, Window::SevenDay, &standards);
        assert_eq!(result.label, "N/A");
        assert_eq!(result.severity, Severity::None);
    }
}

#[test]
fn missing_standard_reports_no_standard() {
    let standards = simple_table(Platform::Instagram, 900.0, 30.0);
    let result = evaluate(&Aggregate::new(5000.0, 10.0), Platform::YouTube, false, &standards);
    assert_eq!(result.label, "No standard");
    assert_eq!(result.severity, Severity::None);
    assert!(result.tooltip.contains("YouTube"));
}

#[test]
fn reference_standard_uses_custom_labels_without_rate() {
    let standards = default_standards();

    let both = evaluate(&Aggregate::new(90_000.0, 2_000.0), Platform::Threads, false, &standards);
    assert_eq!(both.label, "Double target");
    assert_eq!(both.severity, Severity::High);

    let views = evaluate(&Aggregate::new(90_000.0, 100.0), Platform::Threads, false, &standards);
    assert_eq!(views.label, "views target met");
    assert_eq!(views.severity, Severity::Standard);

    let interactions =
        evaluate(&Aggregate::new(1_000.0, 2_000.0), Platform::Threads, false, &standards);
    assert_eq!(interactions.label, "interactions target met");

    // 50% engagement per view would clear any rate target; this kind ignores rate.
    let high_rate = evaluate(&Aggregate::new(1_000.0, 500.0), Platform::Threads, false, &standards);
    assert_eq!(high_rate.severity, Severity::Fail);
    assert!(high_rate.tooltip.contains("views ≥ 84,000"));
    assert!(high_rate.tooltip.contains("interactions ≥ 1,585"));
}

#[test]
fn edited_standard_applies_to_next_evaluation() {
    let mut standards = default_standards();
    let post = post_with_7d(
        Platform::Facebook,
        PostFormat::SingleImage,
        MetricsSnapshot::new(2100.0, 40.0, 10.0, 5.0),
    );
    assert_eq!(classify(&post, Window::SevenDay, &standards).severity, Severity::High);

    standards.insert(
        Platform::Facebook,
        PerformanceStandard::Tiered {
            high: Threshold::new(3000.0, 100.0),
            standard: Threshold::new(1500.0, 45.0),
            low: Threshold::new(1000.0, 15.0),
        },
    );
    let result = classify(&post, Window::SevenDay, &standards);
    assert_eq!(result.severity, Severity::Standard);
    assert!(result.tooltip.contains("3,000"));
}

#[test]
fn malformed_standard_fields_default_to_zero() {
    let standard: PerformanceStandard =
        serde_json::from_str(r#"{"kind":"simple","target_reach":"1,000","target_engagement":"n/a"}"#)
            .unwrap();
    assert_eq!(
        standard,
        PerformanceStandard::Simple(Threshold::new(1000.0, 0.0))
    );

    // A zero target leaves its branch trivially satisfied.
    let mut standards = StandardsTable::new();
    standards.insert(Platform::YouTube, standard);
    let result = evaluate(&Aggregate::new(10.0, 0.0), Platform::YouTube, false, &standards);
    assert_eq!(result.severity, Severity::Standard);
    assert_eq!(result.label, "Met (engagement)");

    let tiered: PerformanceStandard =
        serde_json::from_str(r#"{"kind":"tiered","high":{"target_reach":5000}}"#).unwrap();
    match tiered {
        PerformanceStandard::Tiered { high, standard, low } => {
            assert_eq!(high, Threshold::new(5000.0, 0.0));
            assert_eq!(standard, Threshold::default());
            assert_eq!(low, Threshold::default());
        }
        other => panic!("unexpected standard: {:?}", other),
    }
}

#[test]
fn reference_labels_default_when_missing() {
    let standard: PerformanceStandard =
        serde_json::from_str(r#"{"kind":"reference","target_reach":100,"target_engagement":10}"#)
            .unwrap();
    assert_eq!(
        standard,
        PerformanceStandard::Reference(ReferenceTarget {
            target_reach: 100.0,
            target_engagement: 10.0,
            ..ReferenceTarget::default()
        })
    );
}

#[test]
fn thirty_day_window_is_classified_independently() {
    let standards = default_standards();
    let mut post = Post::new("p", date(2025, 1, 1), Platform::YouTube, PostFormat::ShortVideo);
    post.metrics_30d = MetricsSnapshot::new(800.0, 5.0, 1.0, 0.0);

    assert_eq!(classify(&post, Window::SevenDay, &standards).label, "No data yet");
    assert_eq!(classify(&post, Window::ThirtyDay, &standards).label, "Met (reach)");
}
