//! Boundary adapter between the nested [`Post`] and the flat column layout used
//! by storage (one JSON object per row, spreadsheet-style column names).
//!
//! Stored `engagement_*` columns are derived data: they are written fresh from
//! `likes + comments + shares` and ignored on read.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::metrics::lenient_count;
use crate::{MetricsSnapshot, Owners, Platform, Post, PostFormat, PostStatus, Purpose, Window};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatPostRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub platform: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub topic: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub post_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub format: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub owner_project: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub owner_post: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub owner_design: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reach_7d: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_7d: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments_7d: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares_7d: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub engagement_7d: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reach_1m: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_1m: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments_1m: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares_1m: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub engagement_1m: f64,
}

impl FlatPostRecord {
    pub fn snapshot(&self, window: Window) -> MetricsSnapshot {
        match window {
            Window::SevenDay => {
                MetricsSnapshot::new(self.reach_7d, self.likes_7d, self.comments_7d, self.shares_7d)
            }
            Window::ThirtyDay => {
                MetricsSnapshot::new(self.reach_1m, self.likes_1m, self.comments_1m, self.shares_1m)
            }
        }
    }

    fn set_snapshot(&mut self, window: Window, snapshot: &MetricsSnapshot) {
        let engagement = snapshot.engagement();
        match window {
            Window::SevenDay => {
                self.reach_7d = snapshot.reach;
                self.likes_7d = snapshot.likes;
                self.comments_7d = snapshot.comments;
                self.shares_7d = snapshot.shares;
                self.engagement_7d = engagement;
            }
            Window::ThirtyDay => {
                self.reach_1m = snapshot.reach;
                self.likes_1m = snapshot.likes;
                self.comments_1m = snapshot.comments;
                self.shares_1m = snapshot.shares;
                self.engagement_1m = engagement;
            }
        }
    }
}

pub fn flatten(post: &Post) -> FlatPostRecord {
    let mut record = FlatPostRecord {
        id: post.id.clone(),
        date: post.publish_date.format("%Y-%m-%d").to_string(),
        platform: post.platform.label().to_string(),
        topic: post.topic.clone(),
        post_type: post.post_type.clone(),
        sub_type: post.sub_type.clone(),
        purpose: post.purpose.label().to_string(),
        format: post.format.label().to_string(),
        owner_project: post.owners.project.clone(),
        owner_post: post.owners.post.clone(),
        owner_design: post.owners.design.clone(),
        status: post.status.label().to_string(),
        ..FlatPostRecord::default()
    };
    for window in Window::ALL {
        record.set_snapshot(window, post.metrics(window));
    }
    record
}

/// Rebuilds a post from a stored row. An unreadable date falls back to `today`;
/// an unknown platform or format rejects the row.
pub fn unflatten(record: &FlatPostRecord, today: NaiveDate) -> Result<Post, String> {
    let platform = Platform::from_str(&record.platform)
        .ok_or_else(|| format!("unknown platform: {:?}", record.platform))?;
    let format = PostFormat::from_str(&record.format)
        .ok_or_else(|| format!("unknown post format: {:?}", record.format))?;

    let publish_date = parse_date(&record.date).unwrap_or_else(|| {
        tracing::warn!(id = %record.id, date = %record.date, "unreadable publish date; using today");
        today
    });

    let status = PostStatus::from_str(&record.status).unwrap_or_else(|| {
        if !record.status.trim().is_empty() {
            tracing::warn!(id = %record.id, status = %record.status, "unknown status; treating as draft");
        }
        PostStatus::default()
    });
    let purpose = Purpose::from_str(&record.purpose).unwrap_or_default();

    let id = if record.id.trim().is_empty() {
        derive_post_id(publish_date, platform, &record.topic)
    } else {
        record.id.trim().to_string()
    };

    Ok(Post {
        id,
        publish_date,
        platform,
        format,
        status,
        purpose,
        topic: record.topic.clone(),
        post_type: record.post_type.clone(),
        sub_type: record.sub_type.clone(),
        owners: Owners {
            project: record.owner_project.clone(),
            post: record.owner_post.clone(),
            design: record.owner_design.clone(),
        },
        metrics_7d: record.snapshot(Window::SevenDay),
        metrics_30d: record.snapshot(Window::ThirtyDay),
    })
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(date_part, pattern).ok())
}

pub fn derive_post_id(publish_date: NaiveDate, platform: Platform, topic: &str) -> String {
    let payload = format!("{}:{}:{}", publish_date, platform.label(), topic.trim());
    format!("post_{:x}", stable_hash64(&payload))
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}
