//! Per-platform totals over published posts for one measurement window.
//!
//! Stories and comment-only posts count toward post totals but never toward
//! reach or engagement. LINE has no metrics at all, and Threads reports views
//! rather than reach, so neither contributes to the overall reach figure or
//! shows an engagement rate.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::metrics::percent_of;
use crate::reconcile::parse_date;
use crate::{format_rate, Platform, Post, PostStatus, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurposeFilter {
    #[default]
    All,
    Advertising,
    NonAdvertising,
}

impl PurposeFilter {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(PurposeFilter::All),
            "ad" | "ads" | "advertising" => Some(PurposeFilter::Advertising),
            "non-ad" | "non-advertising" | "organic" => Some(PurposeFilter::NonAdvertising),
            _ => None,
        }
    }

    fn matches(self, post: &Post) -> bool {
        match self {
            PurposeFilter::All => true,
            PurposeFilter::Advertising => post.purpose.is_advertising(),
            PurposeFilter::NonAdvertising => !post.purpose.is_advertising(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    pub purpose: PurposeFilter,
    pub platform: Option<Platform>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SummaryFilter {
    /// Restricts to one calendar month.
    pub fn for_month(mut self, year: i32, month: u32) -> Self {
        self.from = NaiveDate::from_ymd_opt(year, month, 1);
        self.to = self.from.and_then(|first| {
            let (next_year, next_month) = if first.month() == 12 {
                (first.year() + 1, 1)
            } else {
                (first.year(), first.month() + 1)
            };
            NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|next| next.pred_opt())
        });
        self
    }

    /// Inclusive date range; either end may be open.
    pub fn for_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, String> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(format!("range start {} is after range end {}", from, to));
            }
        }
        self.from = from;
        self.to = to;
        Ok(self)
    }

    /// Applies either a `YYYY-MM` month or a `from`/`to` range, as given on the
    /// command line or in a query string. Blank values count as absent.
    pub fn with_period(
        self,
        month: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, String> {
        let month = non_blank(month);
        let from = non_blank(from).map(parse_bound).transpose()?;
        let to = non_blank(to).map(parse_bound).transpose()?;

        match month {
            Some(_) if from.is_some() || to.is_some() => {
                Err("use either a month or a from/to range, not both".to_string())
            }
            Some(raw) => {
                let (year, month) = parse_month(raw)?;
                Ok(self.for_month(year, month))
            }
            None if from.is_some() || to.is_some() => self.for_range(from, to),
            None => Ok(self),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(platform) = self.platform {
            if post.platform != platform {
                return false;
            }
        }
        if let Some(from) = self.from {
            if post.publish_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if post.publish_date > to {
                return false;
            }
        }
        self.purpose.matches(post)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformRow {
    pub platform: Platform,
    pub posts: usize,
    pub reach: f64,
    pub engagement: f64,
    pub rate: Option<f64>,
}

impl PlatformRow {
    pub fn rate_display(&self) -> String {
        self.rate.map(format_rate).unwrap_or_else(|| "-".to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub window: Window,
    pub published_posts: usize,
    pub total_reach: f64,
    pub total_engagement: f64,
    pub platforms: Vec<PlatformRow>,
    /// Published posts per post type; untyped posts are not counted.
    pub type_counts: BTreeMap<String, usize>,
}

/// `YYYY-MM`, limited to months chrono can represent.
pub fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let raw = raw.trim();
    let invalid = || format!("invalid month: {}", raw);
    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok((year, month))
}

fn parse_bound(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date: {}", raw))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|raw| !raw.is_empty())
}

pub fn summarize(posts: &[Post], window: Window, filter: &SummaryFilter) -> Summary {
    let published: Vec<&Post> = posts
        .iter()
        .filter(|post| post.status == PostStatus::Published && filter.matches(post))
        .collect();

    let measurable = |post: &&&Post| !post.format.metrics_disabled();

    let total_reach = published
        .iter()
        .filter(measurable)
        .filter(|post| !matches!(post.platform, Platform::Line | Platform::Threads))
        .map(|post| post.metrics(window).aggregate().reach)
        .sum::<f64>();
    let total_engagement = published
        .iter()
        .filter(measurable)
        .filter(|post| post.platform != Platform::Line)
        .map(|post| post.metrics(window).aggregate().engagement)
        .sum::<f64>();

    let platforms = Platform::ALL
        .into_iter()
        .filter(|platform| filter.platform.map_or(true, |wanted| wanted == *platform))
        .map(|platform| {
            let on_platform: Vec<&&Post> = published
                .iter()
                .filter(|post| post.platform == platform)
                .collect();
            let (reach, engagement) = on_platform
                .iter()
                .filter(|post| !post.format.metrics_disabled())
                .map(|post| post.metrics(window).aggregate())
                .fold((0.0, 0.0), |(reach, engagement), aggregate| {
                    (reach + aggregate.reach, engagement + aggregate.engagement)
                });
            let rate = if reach > 0.0 && !matches!(platform, Platform::Line | Platform::Threads) {
                Some(percent_of(engagement, reach))
            } else {
                None
            };
            PlatformRow {
                platform,
                posts: on_platform.len(),
                reach,
                engagement,
                rate,
            }
        })
        .collect();

    let mut type_counts = BTreeMap::new();
    for post in &published {
        let post_type = post.post_type.trim();
        if !post_type.is_empty() {
            *type_counts.entry(post_type.to_string()).or_insert(0) += 1;
        }
    }

    Summary {
        window,
        published_posts: published.len(),
        total_reach,
        total_engagement,
        platforms,
        type_counts,
    }
}
