//! Sentiment backend integration.
//!
//! This module provides a typed interface to the backend REST API: query
//! construction, the HTTP client, and conversion of wire payloads into
//! dashboard state types.

mod client;
mod converter;
mod query;
mod traits;

pub use client::{ApiClient, ApiClientBuilder};
pub use converter::DataConverter;
pub use query::{FilterParams, QueryParams};
pub use traits::SentimentApi;

#[cfg(test)]
pub use traits::MockSentimentApi;
