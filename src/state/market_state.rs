//! Market-related state: live quotes, price history, divergence alerts and
//! the generated daily summary.
//!
//! Everything here is secondary to the sentiment dashboard. Failures are
//! swallowed by the loaders and show up as an empty panel, never as an error
//! in the primary view.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix of commodity price series in a history response.
pub const COMMODITY_SERIES_SUFFIX: &str = "_usd";
/// Official dollar rate (ARS) series key.
pub const DOLAR_OFICIAL_KEY: &str = "dolar_oficial";
/// Parallel ("blue") dollar rate (ARS) series key.
pub const DOLAR_BLUE_KEY: &str = "dolar_blue";
/// Gap between the blue and official rates, in percent.
pub const BRECHA_KEY: &str = "brecha_pct";

/// Periods (in days) the price history panel cycles through.
pub const HISTORY_PERIODS: [u32; 3] = [7, 30, 90];

/// A single quote from `/api/market/current`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Backend key, e.g. `soja_cbot` or `dolar_blue`.
    pub key: String,
    /// Ticker symbol.
    pub symbol: String,
    pub status: QuoteStatus,
}

/// Whether the backend could price a quote.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteStatus {
    Available {
        price: Decimal,
        currency: String,
        change_percent: Decimal,
    },
    Unavailable(String),
}

impl Quote {
    /// Display name for well-known keys, falling back to the raw key.
    pub fn label(&self) -> String {
        let base = self.key.split('_').next().unwrap_or(&self.key);
        match (base, self.key.as_str()) {
            (_, "dolar_blue") => "Dólar Blue".to_string(),
            ("dolar", _) => "Dólar Oficial".to_string(),
            ("soja", _) => "Soja".to_string(),
            ("maiz", _) => "Maíz".to_string(),
            ("trigo", _) => "Trigo".to_string(),
            _ => self.key.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, QuoteStatus::Available { .. })
    }
}

/// Current quotes keyed by backend name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    /// Backend timestamp, passed through verbatim.
    pub timestamp: Option<String>,
    pub quotes: Vec<Quote>,
}

impl MarketSnapshot {
    pub fn quote(&self, key: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.key == key)
    }
}

/// A commodity present in a price history response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryCommodity {
    pub key: String,
    pub name: String,
}

/// One day of prices. Series keys are dynamic (`soja_usd`, `dolar_blue`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Response of `/api/market/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub commodities: Vec<HistoryCommodity>,
    #[serde(default, rename = "data")]
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Commodity price series (`*_usd`, USD/ton) present in at least one
    /// point, in stable order. Dollar quotes and the exchange gap are in
    /// other units and are left out.
    pub fn series_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .points
            .iter()
            .flat_map(|p| p.values.keys().map(String::as_str))
            .filter(|k| k.ends_with(COMMODITY_SERIES_SUFFIX))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// `(index, value)` pairs for one series, skipping days without a value.
    pub fn series(&self, key: &str) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.values.get(key).map(|v| (i as f64, *v)))
            .collect()
    }

    /// Lowest and highest value across the commodity price series.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series_keys()
            .into_iter()
            .filter_map(|k| self.series_bounds(k))
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    /// Lowest and highest value of a single series.
    pub fn series_bounds(&self, key: &str) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.values.get(key).copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Most recent value of a series.
    pub fn latest(&self, key: &str) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.values.get(key).copied())
    }
}

/// Kind of sentiment/price divergence reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DivergenceKind {
    /// Bullish news while the price fell.
    BullishDivergence,
    /// Bearish news while the price rose.
    BearishDivergence,
    /// Biased news, flat price.
    NeutralPrice,
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

/// Response of `/api/market/divergence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    #[serde(default)]
    pub divergence_type: DivergenceKind,
    #[serde(default)]
    pub commodity: String,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub price_change_pct: f64,
    /// 0 to 3.
    #[serde(default)]
    pub signal_strength: u8,
    #[serde(default)]
    pub news_count: u32,
    #[serde(default)]
    pub description: String,
}

impl Divergence {
    /// Only true divergences are surfaced as alerts.
    pub fn is_alert(&self) -> bool {
        matches!(
            self.divergence_type,
            DivergenceKind::BullishDivergence | DivergenceKind::BearishDivergence
        )
    }
}

/// Counts embedded in the daily summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryCounts {
    #[serde(default)]
    pub alcista: u64,
    #[serde(default)]
    pub bajista: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub total: u64,
}

/// Overall market mood derived from the summary score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Alcista,
    Bajista,
    Mixto,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alcista => "Alcista",
            Self::Bajista => "Bajista",
            Self::Mixto => "Mixto",
        }
    }
}

/// Response of `/api/summary/daily`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub summary: String,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub stats: SummaryCounts,
    #[serde(default)]
    pub top_commodities: BTreeMap<String, u64>,
    pub generated_at: DateTime<Utc>,
}

impl DailySummary {
    pub fn mood(&self) -> Mood {
        if self.sentiment_score > 0.3 {
            Mood::Alcista
        } else if self.sentiment_score < -0.3 {
            Mood::Bajista
        } else {
            Mood::Mixto
        }
    }
}

/// State for the secondary market panels.
#[derive(Debug)]
pub struct MarketState {
    /// Latest quotes; `None` until loaded or after a failed poll.
    pub snapshot: Option<MarketSnapshot>,
    /// Whether the first quote poll is still pending.
    pub loading: bool,
    /// Price history for `history_days`.
    pub history: Option<PriceHistory>,
    /// Selected history window.
    pub history_days: u32,
    /// Whether a history request is in flight.
    pub history_loading: bool,
    /// Whether the last history request failed (panel is hidden).
    pub history_failed: bool,
    /// Soja price history backing the dollar correlation panel.
    pub correlation: Option<PriceHistory>,
    /// Divergence alerts only; non-alert results are dropped by the loader.
    pub divergences: Vec<Divergence>,
    pub summary: Option<DailySummary>,
    /// Last successful quote poll.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            snapshot: None,
            loading: true,
            history: None,
            history_days: HISTORY_PERIODS[1],
            history_loading: false,
            history_failed: false,
            correlation: None,
            divergences: Vec::new(),
            summary: None,
            last_updated: None,
        }
    }
}

impl MarketState {
    /// History period that follows the current one.
    pub fn next_history_period(&self) -> u32 {
        let idx = HISTORY_PERIODS
            .iter()
            .position(|d| *d == self.history_days)
            .map_or(0, |i| (i + 1) % HISTORY_PERIODS.len());
        HISTORY_PERIODS[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_history_parses_dynamic_series() {
        let json = r#"{
            "period": "30d",
            "data": [
                {"date": "2026-02-01", "soja_usd": 380.5, "maiz_usd": 170.2},
                {"date": "2026-02-02", "soja_usd": 382.0, "dolar_blue": 1250.0}
            ],
            "commodities": [{"key": "soja", "name": "Soja (CBOT)"}]
        }"#;
        let history: PriceHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.series("soja_usd"), vec![(0.0, 380.5), (1.0, 382.0)]);
        assert_eq!(history.series("maiz_usd"), vec![(0.0, 170.2)]);
    }

    #[test]
    fn test_price_series_exclude_dollar_and_gap() {
        let json = r#"{
            "period": "30d",
            "data": [
                {"date": "2026-02-01", "soja_usd": 380.5},
                {"date": "2026-02-02", "soja_usd": 384.1},
                {"date": "2026-02-03", "dolar_oficial": 1050.0, "dolar_blue": 1250.0,
                 "brecha_pct": 19.05}
            ],
            "commodities": [{"key": "soja", "name": "Soja (CBOT)"}]
        }"#;
        let history: PriceHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.series_keys(), vec!["soja_usd"]);
        assert_eq!(history.value_bounds(), Some((380.5, 384.1)));
        assert_eq!(history.series_bounds(BRECHA_KEY), Some((19.05, 19.05)));
        assert_eq!(history.latest(DOLAR_BLUE_KEY), Some(1250.0));
        assert_eq!(history.latest("soja_usd"), Some(384.1));
        assert_eq!(history.latest("maiz_usd"), None);
    }

    #[test]
    fn test_divergence_alerts_only_for_true_divergences() {
        let json = r#"{"divergence_type": "BEARISH_DIVERGENCE", "commodity": "TRIGO",
            "sentiment_score": -0.5, "price_change_pct": 4.2, "signal_strength": 2,
            "news_count": 8, "description": "..."}"#;
        let divergence: Divergence = serde_json::from_str(json).unwrap();
        assert!(divergence.is_alert());

        let none: Divergence =
            serde_json::from_str(r#"{"divergence_type": "NONE", "message": "pocas noticias"}"#)
                .unwrap();
        assert!(!none.is_alert());

        let neutral: Divergence =
            serde_json::from_str(r#"{"divergence_type": "NEUTRAL_PRICE"}"#).unwrap();
        assert!(!neutral.is_alert());
    }

    #[test]
    fn test_summary_mood_thresholds() {
        let mut summary: DailySummary = serde_json::from_str(
            r#"{"summary": "Jornada mixta", "sentiment_score": 0.31,
                "stats": {"alcista": 4, "bajista": 1, "neutral": 2, "total": 7},
                "generated_at": "2026-02-01T12:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(summary.mood(), Mood::Alcista);
        summary.sentiment_score = 0.3;
        assert_eq!(summary.mood(), Mood::Mixto);
        summary.sentiment_score = -0.31;
        assert_eq!(summary.mood(), Mood::Bajista);
    }

    #[test]
    fn test_history_period_cycles() {
        let mut market = MarketState::default();
        assert_eq!(market.history_days, 30);
        assert_eq!(market.next_history_period(), 90);
        market.history_days = 90;
        assert_eq!(market.next_history_period(), 7);
        market.history_days = 12;
        assert_eq!(market.next_history_period(), 7);
    }

    #[test]
    fn test_quote_labels() {
        let quote = |key: &str| Quote {
            key: key.to_string(),
            symbol: String::new(),
            status: QuoteStatus::Unavailable("n/a".to_string()),
        };
        assert_eq!(quote("soja_cbot").label(), "Soja");
        assert_eq!(quote("dolar").label(), "Dólar Oficial");
        assert_eq!(quote("dolar_blue").label(), "Dólar Blue");
        assert_eq!(quote("girasol").label(), "girasol");
        assert!(!quote("dolar").is_available());
    }
}
