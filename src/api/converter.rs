//! Data conversion utilities for API responses.
//!
//! Wire types mirror the backend JSON exactly; `DataConverter` turns them
//! into the state types the dashboard works with.

use crate::state::{MarketSnapshot, Quote, QuoteStatus, SentimentStats};
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// `/api/stats` body. Percentages sent by the backend are ignored and
/// derived from the counts instead.
#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub alcista: u64,
    #[serde(default)]
    pub bajista: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default, rename = "null")]
    pub unanalyzed: u64,
}

/// `{ "data": [...] }` envelope used by the trend endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `/api/sources` body.
#[derive(Debug, Deserialize)]
pub(crate) struct SourcesResponse {
    #[serde(default)]
    pub sources: Vec<String>,
}

/// `/api/market/current` body.
#[derive(Debug, Deserialize)]
pub(crate) struct MarketResponse {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub data: Vec<(String, WireQuote)>,
}

/// Read a JSON object as its entries, in document order.
fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// A priced quote or the backend's per-quote failure marker.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireQuote {
    Priced {
        price: Decimal,
        #[serde(default)]
        currency: String,
        #[serde(default)]
        change_percent: Decimal,
        #[serde(default)]
        symbol: String,
    },
    Failed {
        error: String,
        #[serde(default)]
        symbol: String,
    },
}

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    /// Convert a stats body, deriving one-decimal percentages.
    pub(crate) fn convert_stats(stats: StatsResponse) -> SentimentStats {
        SentimentStats::from_counts(
            stats.total,
            stats.alcista,
            stats.bajista,
            stats.neutral,
            stats.unanalyzed,
        )
    }

    /// Convert the market quote map, keeping the order of the response.
    pub(crate) fn convert_market(response: MarketResponse) -> MarketSnapshot {
        let quotes = response
            .data
            .into_iter()
            .map(|(key, quote)| Self::convert_quote(key, quote))
            .collect();

        MarketSnapshot {
            timestamp: response.timestamp,
            quotes,
        }
    }

    fn convert_quote(key: String, quote: WireQuote) -> Quote {
        match quote {
            WireQuote::Priced {
                price,
                currency,
                change_percent,
                symbol,
            } => Quote {
                key,
                symbol,
                status: QuoteStatus::Available {
                    price,
                    currency,
                    change_percent,
                },
            },
            WireQuote::Failed { error, symbol } => Quote {
                key,
                symbol,
                status: QuoteStatus::Unavailable(error),
            },
        }
    }
}
