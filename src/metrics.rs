use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parses an untrusted numeric string. Thousand separators are stripped first;
/// anything that does not parse to a finite number becomes `0`.
pub fn safe_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | '，' | '_') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

/// Same contract as [`safe_number`] for values that arrive as JSON/TOML.
pub fn coerce_value(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Value::String(raw) => safe_number(raw),
        _ => 0.0,
    }
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Counts are never negative or non-finite.
pub fn sanitize_count(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

/// `part / whole * 100`, or `0` when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    let part = finite_or_zero(part);
    let whole = finite_or_zero(whole);
    if whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// `deserialize_with` helper: accepts numbers, numeric strings (with separators),
/// null, or garbage, and never fails.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_value(&value))
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_number(deserializer).map(sanitize_count)
}

/// Raw counts for one measurement window of one post.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default, deserialize_with = "lenient_count")]
    pub reach: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares: f64,
}

impl MetricsSnapshot {
    pub fn new(reach: f64, likes: f64, comments: f64, shares: f64) -> Self {
        Self {
            reach: sanitize_count(reach),
            likes: sanitize_count(likes),
            comments: sanitize_count(comments),
            shares: sanitize_count(shares),
        }
    }

    pub fn engagement(&self) -> f64 {
        sanitize_count(self.likes) + sanitize_count(self.comments) + sanitize_count(self.shares)
    }

    pub fn is_empty(&self) -> bool {
        sanitize_count(self.reach) == 0.0 && self.engagement() == 0.0
    }

    pub fn aggregate(&self) -> Aggregate {
        Aggregate::new(sanitize_count(self.reach), self.engagement())
    }
}

/// Derived values the classifier and freshness tracker work from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Aggregate {
    pub reach: f64,
    pub engagement: f64,
    pub rate: f64,
}

impl Aggregate {
    pub fn new(reach: f64, engagement: f64) -> Self {
        let reach = sanitize_count(reach);
        let engagement = sanitize_count(engagement);
        Self {
            reach,
            engagement,
            rate: percent_of(engagement, reach),
        }
    }

    /// Zero reach means the window has not been measured yet.
    pub fn is_measured(&self) -> bool {
        self.reach > 0.0
    }

    pub fn rate_display(&self) -> String {
        if !self.is_measured() {
            return "-".to_string();
        }
        format!("{:.2}%", self.rate)
    }
}
