use chrono::NaiveDate;
use post_kpi::reconcile::{derive_post_id, flatten, unflatten, FlatPostRecord};
use post_kpi::{MetricsSnapshot, Owners, Platform, Post, PostFormat, PostStatus, Purpose};
use serde_json::json;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_post() -> Post {
    let mut post = Post::new("1717171717000", date(2025, 3, 14), Platform::Instagram, PostFormat::MultiImage);
    post.status = PostStatus::Published;
    post.purpose = Purpose::StoreAd;
    post.topic = "Spring gift box launch".to_string();
    post.post_type = "gift".to_string();
    post.sub_type = "Mid-Autumn".to_string();
    post.owners = Owners {
        project: "Ming".to_string(),
        post: "Yi".to_string(),
        design: "Wei".to_string(),
    };
    post.metrics_7d = MetricsSnapshot::new(1200.0, 40.0, 5.0, 3.0);
    post.metrics_30d = MetricsSnapshot::new(3400.0, 90.0, 12.0, 8.0);
    post
}

#[test]
fn flatten_then_unflatten_restores_post() {
    let post = sample_post();
    let record = flatten(&post);

    assert_eq!(record.reach_7d, 1200.0);
    assert_eq!(record.engagement_7d, 48.0);
    assert_eq!(record.reach_1m, 3400.0);
    assert_eq!(record.engagement_1m, 110.0);

    let restored = unflatten(&record, date(2030, 1, 1)).unwrap();
    assert_eq!(restored, post);
}

#[test]
fn stale_engagement_column_is_regenerated() {
    let post = sample_post();
    let mut record = flatten(&post);
    record.engagement_7d = 999.0;
    record.engagement_1m = 1.0;

    let restored = unflatten(&record, date(2030, 1, 1)).unwrap();
    assert_eq!(restored.metrics_7d, post.metrics_7d);
    assert_eq!(restored.metrics_30d, post.metrics_30d);

    let rewritten = flatten(&restored);
    assert_eq!(rewritten.engagement_7d, 48.0);
    assert_eq!(rewritten.engagement_1m, 110.0);
}

#[test]
fn flat_columns_keep_spreadsheet_names() {
    let value = serde_json::to_value(flatten(&sample_post())).unwrap();
    for column in [
        "id", "date", "platform", "topic", "type", "sub_type", "purpose", "format",
        "owner_project", "owner_post", "owner_design", "status",
        "reach_7d", "likes_7d", "comments_7d", "shares_7d", "engagement_7d",
        "reach_1m", "likes_1m", "comments_1m", "shares_1m", "engagement_1m",
    ] {
        assert!(value.get(column).is_some(), "missing column {}", column);
    }
    assert_eq!(value["date"], "2025-03-14");
    assert_eq!(value["platform"], "Instagram");
    assert_eq!(value["purpose"], "store-ad");
    assert_eq!(value["sub_type"], "Mid-Autumn");
    assert_eq!(value["owner_design"], "Wei");
}

#[test]
fn spreadsheet_values_are_accepted() {
    let record: FlatPostRecord = serde_json::from_value(json!({
        "id": "42",
        "date": "2025-01-05",
        "platform": "Facebook",
        "type": "喜餅",
        "sub_type": "新春",
        "purpose": "門市廣告",
        "format": "單圖",
        "status": "已發布",
        "owner_project": "夢涵",
        "owner_post": "一千",
        "owner_design": "千惟"
    }))
    .unwrap();

    let post = unflatten(&record, date(2030, 1, 1)).unwrap();
    assert_eq!(post.format, PostFormat::SingleImage);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.purpose, Purpose::StoreAd);
    assert_eq!(post.sub_type, "新春");
    assert_eq!(post.owners.project, "夢涵");
    assert_eq!(post.owners.design, "千惟");

    for (raw, format) in [
        ("多圖", PostFormat::MultiImage),
        ("假多圖", PostFormat::PseudoCarousel),
        ("短影音", PostFormat::ShortVideo),
        ("限動", PostFormat::Story),
        ("純文字", PostFormat::TextOnly),
        ("留言處", PostFormat::CommentOnly),
    ] {
        assert_eq!(PostFormat::from_str(raw), Some(format), "format {}", raw);
    }
    assert_eq!(PostStatus::from_str("已排程"), Some(PostStatus::Scheduled));
    assert_eq!(PostStatus::from_str("草稿"), Some(PostStatus::Draft));
    assert_eq!(Purpose::from_str("廣告"), Some(Purpose::Ad));
    assert_eq!(Purpose::from_str("導購"), Some(Purpose::Conversion));
    assert_eq!(Purpose::from_str("互動"), Some(Purpose::Engagement));
    assert_eq!(Purpose::from_str("公告"), Some(Purpose::Announcement));
}

#[test]
fn imported_row_is_coerced() {
    let record: FlatPostRecord = serde_json::from_value(json!({
        "id": 1700000000000u64,
        "date": "2025-02-03",
        "platform": "LINE@",
        "format": "story",
        "status": "published",
        "reach_7d": "1,234",
        "likes_7d": "n/a",
        "comments_7d": null,
        "engagement_7d": 77
    }))
    .unwrap();

    let post = unflatten(&record, date(2030, 1, 1)).unwrap();
    assert_eq!(post.id, "1700000000000");
    assert_eq!(post.platform, Platform::Line);
    assert_eq!(post.format, PostFormat::Story);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.metrics_7d, MetricsSnapshot::new(1234.0, 0.0, 0.0, 0.0));
    assert_eq!(post.metrics_30d, MetricsSnapshot::default());
    assert!(post.metrics_disabled());
}

#[test]
fn unreadable_date_falls_back_to_today() {
    let mut record = flatten(&sample_post());
    record.date = "not a date".to_string();

    let today = date(2026, 10, 16);
    let post = unflatten(&record, today).unwrap();
    assert_eq!(post.publish_date, today);

    record.date = "2025/04/01".to_string();
    assert_eq!(unflatten(&record, today).unwrap().publish_date, date(2025, 4, 1));

    record.date = "2025-04-02T00:00:00".to_string();
    assert_eq!(unflatten(&record, today).unwrap().publish_date, date(2025, 4, 2));
}

#[test]
fn unknown_platform_or_format_is_rejected() {
    let mut record = flatten(&sample_post());
    record.platform = "MySpace".to_string();
    assert!(unflatten(&record, date(2025, 1, 1)).is_err());

    let mut record = flatten(&sample_post());
    record.format = "hologram".to_string();
    assert!(unflatten(&record, date(2025, 1, 1)).is_err());
}

#[test]
fn missing_id_is_derived_stably() {
    let mut record = flatten(&sample_post());
    record.id = String::new();

    let first = unflatten(&record, date(2025, 1, 1)).unwrap();
    let second = unflatten(&record, date(2025, 1, 1)).unwrap();
    assert!(first.id.starts_with("post_"));
    assert_eq!(first.id, second.id);
    assert_eq!(
        first.id,
        derive_post_id(date(2025, 3, 14), Platform::Instagram, "Spring gift box launch")
    );
}
