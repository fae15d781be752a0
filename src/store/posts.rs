use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::reconcile::{flatten, unflatten, FlatPostRecord};
use crate::store::write_atomic;
use crate::{MetricsSnapshot, Platform, Post, PostFormat, PostStatus, Purpose, Window};

/// Partial edit of a post's identity fields. Moving a post onto LINE or a
/// story/comment-only format clears both metric windows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub publish_date: Option<NaiveDate>,
    pub platform: Option<Platform>,
    pub format: Option<PostFormat>,
    pub status: Option<PostStatus>,
    pub purpose: Option<Purpose>,
    pub topic: Option<String>,
    pub post_type: Option<String>,
    pub sub_type: Option<String>,
    pub owner_project: Option<String>,
    pub owner_post: Option<String>,
    pub owner_design: Option<String>,
}

impl PostUpdate {
    pub fn apply(self, post: &mut Post) {
        if let Some(date) = self.publish_date {
            post.publish_date = date;
        }
        if let Some(platform) = self.platform {
            post.set_platform(platform);
        }
        if let Some(format) = self.format {
            post.set_format(format);
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(purpose) = self.purpose {
            post.purpose = purpose;
        }
        if let Some(topic) = self.topic {
            post.topic = topic;
        }
        if let Some(post_type) = self.post_type {
            post.post_type = post_type;
        }
        if let Some(sub_type) = self.sub_type {
            post.sub_type = sub_type;
        }
        if let Some(owner) = self.owner_project {
            post.owners.project = owner;
        }
        if let Some(owner) = self.owner_post {
            post.owners.post = owner;
        }
        if let Some(owner) = self.owner_design {
            post.owners.design = owner;
        }
    }
}

pub struct PostStore {
    path: PathBuf,
    posts: RwLock<Vec<Post>>,
}

impl PostStore {
    /// Reads flat records from `path`. Rows that cannot become a post are skipped
    /// with a warning rather than failing the whole load.
    pub async fn load(path: PathBuf, today: NaiveDate) -> Result<Self, String> {
        let records: Vec<FlatPostRecord> = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read posts: {}", err))?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse posts: {}", err))?
            }
        } else {
            Vec::new()
        };

        let mut posts = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            match unflatten(record, today) {
                Ok(post) => posts.push(post),
                Err(err) => tracing::warn!(row, error = %err, "skipping malformed post record"),
            }
        }
        tracing::debug!(count = posts.len(), path = %path.display(), "loaded posts");

        Ok(Self {
            path,
            posts: RwLock::new(posts),
        })
    }

    /// Newest publish date first.
    pub async fn list(&self) -> Vec<Post> {
        let guard = self.posts.read().await;
        let mut posts = guard.clone();
        posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        posts
    }

    pub async fn get(&self, post_id: &str) -> Option<Post> {
        let guard = self.posts.read().await;
        guard.iter().find(|post| post.id == post_id).cloned()
    }

    pub async fn insert(&self, post: Post) -> Result<Post, String> {
        let mut guard = self.posts.write().await;
        if guard.iter().any(|existing| existing.id == post.id) {
            return Err(format!("post already exists: {}", post.id));
        }
        guard.push(post.clone());
        self.persist(&guard).await?;
        Ok(post)
    }

    pub async fn update_fields(&self, post_id: &str, update: PostUpdate) -> Result<Post, String> {
        let mut guard = self.posts.write().await;
        let post = guard
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or_else(|| format!("post not found: {}", post_id))?;
        update.apply(post);
        let updated = post.clone();
        self.persist(&guard).await?;
        Ok(updated)
    }

    pub async fn update_metrics(
        &self,
        post_id: &str,
        window: Window,
        snapshot: MetricsSnapshot,
    ) -> Result<Post, String> {
        let mut guard = self.posts.write().await;
        let post = guard
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or_else(|| format!("post not found: {}", post_id))?;
        if post.metrics_disabled() {
            return Err(format!(
                "metrics are not tracked for {} {} posts",
                post.platform.label(),
                post.format.label()
            ));
        }
        let sanitized = MetricsSnapshot::new(
            snapshot.reach,
            snapshot.likes,
            snapshot.comments,
            snapshot.shares,
        );
        *post.metrics_mut(window) = sanitized;
        let updated = post.clone();
        self.persist(&guard).await?;
        Ok(updated)
    }

    pub async fn delete(&self, post_id: &str) -> Result<bool, String> {
        let mut guard = self.posts.write().await;
        let before = guard.len();
        guard.retain(|post| post.id != post_id);
        let removed = guard.len() != before;
        if removed {
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    async fn persist(&self, posts: &[Post]) -> Result<(), String> {
        let records: Vec<FlatPostRecord> = posts.iter().map(flatten).collect();
        let payload = serde_json::to_string_pretty(&records)
            .map_err(|err| format!("failed to serialize posts: {}", err))?;
        write_atomic(&self.path, payload, "posts").await
    }
}
