//! The backend surface the dashboard depends on.

use super::FilterParams;
use crate::error::Result;
use crate::state::{
    DailySummary, DailyTrend, Divergence, MarketSnapshot, NewsList, PipelineResponse,
    PipelineStatus, PriceHistory, SentimentStats, SourceDistribution, TimelinePoint,
};
use async_trait::async_trait;

/// One method per backend endpoint.
///
/// Every transport failure and non-success status surfaces as
/// [`crate::Error::FetchFailed`]; malformed bodies as [`crate::Error::Decode`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentApi: Send + Sync {
    /// `GET /api/news`
    async fn fetch_news(&self, limit: u32, filters: &FilterParams) -> Result<NewsList>;

    /// `GET /api/stats`
    async fn fetch_stats(&self) -> Result<SentimentStats>;

    /// `POST /api/pipeline/run`
    async fn trigger_pipeline(&self) -> Result<PipelineResponse>;

    /// `GET /api/pipeline/status`
    async fn fetch_pipeline_status(&self) -> Result<PipelineStatus>;

    /// `GET /api/trends/daily`
    async fn fetch_daily_trends(&self, days: u32, filters: &FilterParams)
    -> Result<Vec<DailyTrend>>;

    /// `GET /api/trends/by-source`
    async fn fetch_source_trends(&self, filters: &FilterParams) -> Result<Vec<SourceDistribution>>;

    /// `GET /api/trends/timeline`
    async fn fetch_sentiment_timeline(
        &self,
        days: u32,
        filters: &FilterParams,
    ) -> Result<Vec<TimelinePoint>>;

    /// `GET /api/sources`
    async fn fetch_sources(&self) -> Result<Vec<String>>;

    /// `GET /api/market/current`
    async fn fetch_market_current(&self) -> Result<MarketSnapshot>;

    /// `GET /api/market/history`; `commodities` is comma-separated.
    async fn fetch_market_history(&self, days: u32, commodities: &str) -> Result<PriceHistory>;

    /// `GET /api/market/divergence`
    async fn fetch_divergence(&self, commodity: &str, days: u32) -> Result<Divergence>;

    /// `GET /api/summary/daily`
    async fn fetch_daily_summary(&self) -> Result<DailySummary>;
}
