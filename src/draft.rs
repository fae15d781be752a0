use chrono::NaiveDate;
use serde::Deserialize;

use crate::reconcile::parse_date;
use crate::{Owners, Platform, Post, PostFormat, PostStatus, Purpose};

/// A new post scheduled on one or more platforms at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub publish_date: Option<String>,
    pub platforms: Vec<String>,
    pub format: String,
    pub topic: Option<String>,
    pub post_type: Option<String>,
    pub sub_type: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub owners: Owners,
}

impl PostDraft {
    /// One post per requested platform, sharing everything else. Ids are
    /// `post_{seed}_{index}`; the publish date defaults to `today`.
    pub fn into_posts(self, today: NaiveDate, id_seed: u128) -> Result<Vec<Post>, String> {
        let topic = self.topic.unwrap_or_default().trim().to_string();
        if topic.is_empty() {
            return Err("topic is required".to_string());
        }
        if self.platforms.is_empty() {
            return Err("at least one platform is required".to_string());
        }

        let publish_date = match self.publish_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                parse_date(raw).ok_or_else(|| format!("invalid publish date: {}", raw))?
            }
            _ => today,
        };
        let format = PostFormat::from_str(&self.format)
            .ok_or_else(|| format!("invalid post format: {}", self.format))?;
        let purpose = match self.purpose.as_deref() {
            Some(raw) => Purpose::from_str(raw).ok_or_else(|| format!("invalid purpose: {}", raw))?,
            None => Purpose::default(),
        };
        let status = match self.status.as_deref() {
            Some(raw) => PostStatus::from_str(raw).ok_or_else(|| format!("invalid status: {}", raw))?,
            None => PostStatus::default(),
        };

        let mut posts = Vec::with_capacity(self.platforms.len());
        for (idx, name) in self.platforms.iter().enumerate() {
            let platform = Platform::from_str(name)
                .ok_or_else(|| format!("invalid platform: {}", name))?;
            let mut post = Post::new(
                format!("post_{}_{}", id_seed, idx),
                publish_date,
                platform,
                format,
            );
            post.topic = topic.clone();
            post.post_type = self.post_type.clone().unwrap_or_default();
            post.sub_type = self.sub_type.clone().unwrap_or_default();
            post.owners = self.owners.clone();
            post.purpose = purpose;
            post.status = status;
            posts.push(post);
        }
        Ok(posts)
    }
}
