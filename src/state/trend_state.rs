//! Time-bucketed sentiment aggregates produced by the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day sentiment counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    #[serde(default)]
    pub alcista: u64,
    #[serde(default)]
    pub bajista: u64,
    #[serde(default)]
    pub neutral: u64,
}

impl DailyTrend {
    pub fn total(&self) -> u64 {
        self.alcista + self.bajista + self.neutral
    }
}

/// Sentiment breakdown for one news source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDistribution {
    pub source: String,
    #[serde(default)]
    pub alcista: u64,
    #[serde(default)]
    pub bajista: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub total: u64,
}

impl SourceDistribution {
    /// Share of this source in `grand_total`, as a whole percentage.
    pub fn share_of(&self, grand_total: u64) -> f64 {
        if grand_total == 0 {
            0.0
        } else {
            self.total as f64 / grand_total as f64 * 100.0
        }
    }
}

/// Confidence-weighted daily score in `[-1, 1]`
/// (+1 fully bullish, -1 fully bearish).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub sentiment_score: f64,
}

/// Fraction of the value range, measured from the top, where the series
/// crosses zero.
///
/// Used to split the timeline into a bullish (above) and bearish (below)
/// part. Returns `None` for an empty series, `0.0` when nothing is
/// positive, `1.0` when nothing is negative, and a value strictly between
/// 0 and 1 otherwise.
pub fn zero_crossing_offset(points: &[TimelinePoint]) -> Option<f64> {
    let first = points.first()?.sentiment_score;
    let (min, max) = points
        .iter()
        .map(|p| p.sentiment_score)
        .fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if max <= 0.0 {
        return Some(0.0);
    }
    if min >= 0.0 {
        return Some(1.0);
    }
    Some(max / (max - min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn series(scores: &[f64]) -> Vec<TimelinePoint> {
        let start = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| TimelinePoint {
                date: start + chrono::Days::new(i as u64),
                sentiment_score: *s,
            })
            .collect()
    }

    #[test]
    fn test_offset_mixed_signs_is_strictly_inside() {
        let offset = zero_crossing_offset(&series(&[0.6, -0.2, 0.1, -0.4])).unwrap();
        assert!(offset > 0.0 && offset < 1.0);
        // max 0.6, min -0.4 => 0.6 / 1.0
        assert!((offset - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_offset_all_positive_is_one() {
        assert_eq!(zero_crossing_offset(&series(&[0.1, 0.5, 0.0])), Some(1.0));
    }

    #[test]
    fn test_offset_all_negative_is_zero() {
        assert_eq!(zero_crossing_offset(&series(&[-0.1, -0.9])), Some(0.0));
        assert_eq!(zero_crossing_offset(&series(&[0.0, 0.0])), Some(0.0));
    }

    #[test]
    fn test_offset_empty_series() {
        assert_eq!(zero_crossing_offset(&[]), None);
    }

    #[test]
    fn test_daily_total_sums_classes() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let trends = vec![
            DailyTrend { date, alcista: 2, bajista: 1, neutral: 0 },
            DailyTrend { date, alcista: 1, bajista: 0, neutral: 4 },
        ];
        assert_eq!(trends[0].total(), 3);
        assert_eq!(trends[1].total(), 5);
    }

    #[test]
    fn test_source_share() {
        let dist = SourceDistribution {
            source: "Infocampo".to_string(),
            alcista: 1,
            bajista: 1,
            neutral: 2,
            total: 4,
        };
        assert_eq!(dist.share_of(16), 25.0);
        assert_eq!(dist.share_of(0), 0.0);
    }
}
