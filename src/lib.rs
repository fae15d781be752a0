pub mod classify;
pub mod config;
pub mod draft;
pub mod freshness;
pub mod metrics;
pub mod reconcile;
pub mod standards;
pub mod store;
pub mod summary;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use classify::{classify, evaluate, PerformanceResult, Severity};
pub use freshness::{due_alert, post_window_state, window_state, DueAlert, WindowState};
pub use metrics::{safe_number, Aggregate, MetricsSnapshot};
pub use standards::{PerformanceStandard, ReferenceTarget, StandardsTable, Threshold};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Facebook,
    Instagram,
    #[serde(rename = "LINE", alias = "LINE@", alias = "Line")]
    Line,
    YouTube,
    Threads,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Line,
        Platform::YouTube,
        Platform::Threads,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "facebook" | "fb" => Some(Platform::Facebook),
            "instagram" | "ig" => Some(Platform::Instagram),
            "line" | "line@" => Some(Platform::Line),
            "youtube" | "yt" => Some(Platform::YouTube),
            "threads" => Some(Platform::Threads),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Line => "LINE",
            Platform::YouTube => "YouTube",
            Platform::Threads => "Threads",
        }
    }

    /// Platforms whose posts are never measured.
    pub fn metrics_disabled(self) -> bool {
        matches!(self, Platform::Line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostFormat {
    SingleImage,
    MultiImage,
    PseudoCarousel,
    ShortVideo,
    Story,
    TextOnly,
    CommentOnly,
}

impl PostFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "single-image" | "image" | "單圖" => Some(PostFormat::SingleImage),
            "multi-image" | "carousel" | "多圖" => Some(PostFormat::MultiImage),
            "pseudo-carousel" | "假多圖" => Some(PostFormat::PseudoCarousel),
            "short-video" | "reel" | "video" | "短影音" => Some(PostFormat::ShortVideo),
            "story" | "限動" => Some(PostFormat::Story),
            "text-only" | "text" | "純文字" => Some(PostFormat::TextOnly),
            "comment-only" | "comment" | "留言處" => Some(PostFormat::CommentOnly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostFormat::SingleImage => "single-image",
            PostFormat::MultiImage => "multi-image",
            PostFormat::PseudoCarousel => "pseudo-carousel",
            PostFormat::ShortVideo => "short-video",
            PostFormat::Story => "story",
            PostFormat::TextOnly => "text-only",
            PostFormat::CommentOnly => "comment-only",
        }
    }

    pub fn metrics_disabled(self) -> bool {
        matches!(self, PostFormat::Story | PostFormat::CommentOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl PostStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "draft" | "草稿" => Some(PostStatus::Draft),
            "scheduled" | "已排程" => Some(PostStatus::Scheduled),
            "published" | "已發布" => Some(PostStatus::Published),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    #[default]
    Engagement,
    Ad,
    StoreAd,
    Conversion,
    Announcement,
}

impl Purpose {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "engagement" | "互動" => Some(Purpose::Engagement),
            "ad" | "ads" | "廣告" => Some(Purpose::Ad),
            "store-ad" | "門市廣告" => Some(Purpose::StoreAd),
            "conversion" | "導購" => Some(Purpose::Conversion),
            "announcement" | "公告" => Some(Purpose::Announcement),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Purpose::Engagement => "engagement",
            Purpose::Ad => "ad",
            Purpose::StoreAd => "store-ad",
            Purpose::Conversion => "conversion",
            Purpose::Announcement => "announcement",
        }
    }

    pub fn is_advertising(self) -> bool {
        matches!(self, Purpose::Ad | Purpose::StoreAd)
    }
}

/// Measurement window after publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "7d")]
    SevenDay,
    #[serde(rename = "30d", alias = "1m")]
    ThirtyDay,
}

impl Window {
    pub const ALL: [Window; 2] = [Window::SevenDay, Window::ThirtyDay];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "7d" | "7" | "7-day" | "week" => Some(Window::SevenDay),
            "30d" | "30" | "1m" | "30-day" | "month" => Some(Window::ThirtyDay),
            _ => None,
        }
    }

    pub fn days(self) -> u64 {
        match self {
            Window::SevenDay => 7,
            Window::ThirtyDay => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Window::SevenDay => "7-day",
            Window::ThirtyDay => "30-day",
        }
    }

    /// Column suffix used by the flat record layout.
    pub fn column_suffix(self) -> &'static str {
        match self {
            Window::SevenDay => "7d",
            Window::ThirtyDay => "1m",
        }
    }
}

/// People responsible for a post: project lead, copywriter, designer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Owners {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub post: String,
    #[serde(default)]
    pub design: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub publish_date: NaiveDate,
    pub platform: Platform,
    pub format: PostFormat,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub purpose: Purpose,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub post_type: String,
    #[serde(default)]
    pub sub_type: String,
    #[serde(default)]
    pub owners: Owners,
    #[serde(default)]
    pub metrics_7d: MetricsSnapshot,
    #[serde(default)]
    pub metrics_30d: MetricsSnapshot,
}

impl Post {
    pub fn new(id: impl Into<String>, publish_date: NaiveDate, platform: Platform, format: PostFormat) -> Self {
        Self {
            id: id.into(),
            publish_date,
            platform,
            format,
            status: PostStatus::default(),
            purpose: Purpose::default(),
            topic: String::new(),
            post_type: String::new(),
            sub_type: String::new(),
            owners: Owners::default(),
            metrics_7d: MetricsSnapshot::default(),
            metrics_30d: MetricsSnapshot::default(),
        }
    }

    /// LINE posts, stories and comment-only posts are never classified and never overdue.
    pub fn metrics_disabled(&self) -> bool {
        self.platform.metrics_disabled() || self.format.metrics_disabled()
    }

    pub fn metrics(&self, window: Window) -> &MetricsSnapshot {
        match window {
            Window::SevenDay => &self.metrics_7d,
            Window::ThirtyDay => &self.metrics_30d,
        }
    }

    pub fn metrics_mut(&mut self, window: Window) -> &mut MetricsSnapshot {
        match window {
            Window::SevenDay => &mut self.metrics_7d,
            Window::ThirtyDay => &mut self.metrics_30d,
        }
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
        self.clear_metrics_if_disabled();
    }

    pub fn set_format(&mut self, format: PostFormat) {
        self.format = format;
        self.clear_metrics_if_disabled();
    }

    fn clear_metrics_if_disabled(&mut self) {
        if self.metrics_disabled() {
            self.metrics_7d = MetricsSnapshot::default();
            self.metrics_30d = MetricsSnapshot::default();
        }
    }
}

pub fn format_number(value: f64) -> String {
    let rounded = metrics::finite_or_zero(value).round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_rate(value: f64) -> String {
    format!("{:.2}%", metrics::finite_or_zero(value))
}
