//! Query string construction.

use crate::state::{DATE_FORMAT, SentimentClass};
use chrono::NaiveDate;

/// Ordered query parameters. Keys may repeat (`source=A&source=B`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Blank values are dropped.
    pub fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        if !value.trim().is_empty() {
            self.pairs.push((key, value));
        }
        self
    }

    /// Append a parameter only when a value is present.
    pub fn push_opt<T: ToString>(&mut self, key: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn as_slice(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Values recorded for `key`, in insertion order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Filter parameters shared by every filtered endpoint.
///
/// Unset fields are never sent, not even as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    pub sentiment: Option<SentimentClass>,
    /// Sent as one `source` parameter per entry.
    pub sources: Vec<String>,
    pub commodity: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterParams {
    /// Append the set fields to `query`.
    pub fn append_to(&self, query: &mut QueryParams) {
        query.push_opt("sentiment", self.sentiment.map(|s| s.as_str()));
        for source in &self.sources {
            query.push("source", source);
        }
        query.push_opt("commodity", self.commodity.as_deref());
        query.push_opt("date_from", self.date_from.map(|d| d.format(DATE_FORMAT)));
        query.push_opt("date_to", self.date_to.map(|d| d.format(DATE_FORMAT)));
    }

    /// The parameters as a standalone query.
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        self.append_to(&mut query);
        query
    }
}
