//! News articles and aggregate sentiment counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Sentiment class assigned by the analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentClass {
    /// Bullish.
    Alcista,
    /// Bearish.
    Bajista,
    Neutral,
}

impl SentimentClass {
    /// All classes in display order.
    pub const ALL: [SentimentClass; 3] = [Self::Alcista, Self::Bajista, Self::Neutral];

    /// Wire representation, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alcista => "ALCISTA",
            Self::Bajista => "BAJISTA",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alcista => "Alcista",
            Self::Bajista => "Bajista",
            Self::Neutral => "Neutral",
        }
    }

    /// Next class in a `None → Alcista → Bajista → Neutral → None` cycle.
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Alcista),
            Some(Self::Alcista) => Some(Self::Bajista),
            Some(Self::Bajista) => Some(Self::Neutral),
            Some(Self::Neutral) => None,
        }
    }

    /// Previous class in the same cycle.
    pub fn cycle_back(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Neutral),
            Some(Self::Neutral) => Some(Self::Bajista),
            Some(Self::Bajista) => Some(Self::Alcista),
            Some(Self::Alcista) => None,
        }
    }
}

impl std::fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_commodity() -> String {
    "SOJA".to_string()
}

/// Null or blank commodities fall back to the default, like a missing key.
fn commodity_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(default_commodity))
}

/// An analyzed news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub source: String,
    pub url: String,
    /// Publication timestamp, when the source provides one.
    pub published_at: Option<DateTime<Utc>>,
    /// `None` until the backend has analyzed the article.
    pub sentiment: Option<SentimentClass>,
    /// Model confidence in `[0, 1]`.
    pub confidence: Option<f64>,
    #[serde(default = "default_commodity", deserialize_with = "commodity_or_default")]
    pub commodity: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Best timestamp to show for the article.
    pub fn display_time(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Confidence as a whole percentage.
    pub fn confidence_percent(&self) -> Option<u8> {
        self.confidence
            .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}

/// Response of `/api/news`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsList {
    pub total: usize,
    pub articles: Vec<Article>,
}

/// Aggregate sentiment counts with derived percentages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentStats {
    pub total: u64,
    pub alcista: u64,
    pub bajista: u64,
    pub neutral: u64,
    /// Articles not yet analyzed.
    pub unanalyzed: u64,
    pub alcista_percentage: f64,
    pub bajista_percentage: f64,
    pub neutral_percentage: f64,
}

impl SentimentStats {
    /// Build stats from raw counts. Each percentage is rounded to one decimal
    /// independently of the others.
    pub fn from_counts(total: u64, alcista: u64, bajista: u64, neutral: u64, unanalyzed: u64) -> Self {
        Self {
            total,
            alcista,
            bajista,
            neutral,
            unanalyzed,
            alcista_percentage: percentage(alcista, total),
            bajista_percentage: percentage(bajista, total),
            neutral_percentage: percentage(neutral, total),
        }
    }

    /// Count for a single class.
    pub fn count(&self, class: SentimentClass) -> u64 {
        match class {
            SentimentClass::Alcista => self.alcista,
            SentimentClass::Bajista => self.bajista,
            SentimentClass::Neutral => self.neutral,
        }
    }

    /// Percentage for a single class.
    pub fn percentage(&self, class: SentimentClass) -> f64 {
        match class {
            SentimentClass::Alcista => self.alcista_percentage,
            SentimentClass::Bajista => self.bajista_percentage,
            SentimentClass::Neutral => self.neutral_percentage,
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
