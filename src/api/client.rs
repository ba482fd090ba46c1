//! HTTP client for the sentiment backend.

use super::converter::{DataEnvelope, MarketResponse, SourcesResponse, StatsResponse};
use super::{DataConverter, FilterParams, QueryParams, SentimentApi};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::state::{
    DailySummary, DailyTrend, Divergence, MarketSnapshot, NewsList, PipelineResponse,
    PipelineStatus, PriceHistory, SentimentStats, SourceDistribution, TimelinePoint,
};
use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: ApiConfig,
}

impl ApiClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the backend base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        ApiClient::new(self.config)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the sentiment backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("agromate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `resource` names what is being loaded in the user-facing message.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
        resource: &str,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, params = ?query.as_slice(), "GET");

        let response = self
            .http
            .get(&url)
            .query(query.as_slice())
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "request failed");
                Error::fetch_failed(resource, &self.base_url)
            })?;

        self.decode(response, &url, || Error::fetch_failed(resource, &self.base_url))
            .await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        url: &str,
        on_failure: impl Fn() -> Error,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "backend returned an error status");
            return Err(on_failure());
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(%url, error = %e, "failed to read response body");
            on_failure()
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(%url, error = %e, "unexpected response shape");
            Error::decode(e.to_string())
        })
    }
}

#[async_trait]
impl SentimentApi for ApiClient {
    async fn fetch_news(&self, limit: u32, filters: &FilterParams) -> Result<NewsList> {
        let mut query = QueryParams::new();
        query.push("limit", limit);
        filters.append_to(&mut query);
        self.get_json("/api/news", &query, "las noticias").await
    }

    async fn fetch_stats(&self) -> Result<SentimentStats> {
        let stats: StatsResponse = self
            .get_json("/api/stats", &QueryParams::new(), "las estadísticas")
            .await?;
        Ok(DataConverter::convert_stats(stats))
    }

    async fn trigger_pipeline(&self) -> Result<PipelineResponse> {
        let url = self.url("/api/pipeline/run");
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "pipeline trigger failed");
                Error::trigger_failed(&self.base_url)
            })?;

        self.decode(response, &url, || Error::trigger_failed(&self.base_url))
            .await
    }

    async fn fetch_pipeline_status(&self) -> Result<PipelineStatus> {
        self.get_json(
            "/api/pipeline/status",
            &QueryParams::new(),
            "los datos del pipeline",
        )
        .await
    }

    async fn fetch_daily_trends(
        &self,
        days: u32,
        filters: &FilterParams,
    ) -> Result<Vec<DailyTrend>> {
        let mut query = QueryParams::new();
        query.push("days", days);
        filters.append_to(&mut query);
        let envelope: DataEnvelope<DailyTrend> = self
            .get_json("/api/trends/daily", &query, "las tendencias diarias")
            .await?;
        Ok(envelope.data)
    }

    async fn fetch_source_trends(&self, filters: &FilterParams) -> Result<Vec<SourceDistribution>> {
        let envelope: DataEnvelope<SourceDistribution> = self
            .get_json(
                "/api/trends/by-source",
                &filters.to_query(),
                "las tendencias por fuente",
            )
            .await?;
        Ok(envelope.data)
    }

    async fn fetch_sentiment_timeline(
        &self,
        days: u32,
        filters: &FilterParams,
    ) -> Result<Vec<TimelinePoint>> {
        let mut query = QueryParams::new();
        query.push("days", days);
        filters.append_to(&mut query);
        let envelope: DataEnvelope<TimelinePoint> = self
            .get_json(
                "/api/trends/timeline",
                &query,
                "los datos de evolución del sentimiento",
            )
            .await?;
        Ok(envelope.data)
    }

    async fn fetch_sources(&self) -> Result<Vec<String>> {
        let response: SourcesResponse = self
            .get_json("/api/sources", &QueryParams::new(), "las fuentes")
            .await?;
        Ok(response.sources)
    }

    async fn fetch_market_current(&self) -> Result<MarketSnapshot> {
        let response: MarketResponse = self
            .get_json("/api/market/current", &QueryParams::new(), "las cotizaciones")
            .await?;
        Ok(DataConverter::convert_market(response))
    }

    async fn fetch_market_history(&self, days: u32, commodities: &str) -> Result<PriceHistory> {
        let mut query = QueryParams::new();
        query.push("days", days).push("commodity", commodities);
        self.get_json("/api/market/history", &query, "los precios históricos")
            .await
    }

    async fn fetch_divergence(&self, commodity: &str, days: u32) -> Result<Divergence> {
        let mut query = QueryParams::new();
        query.push("commodity", commodity).push("days", days);
        self.get_json(
            "/api/market/divergence",
            &query,
            "los datos de divergencia",
        )
        .await
    }

    async fn fetch_daily_summary(&self) -> Result<DailySummary> {
        self.get_json(
            "/api/summary/daily",
            &QueryParams::new(),
            "los datos del resumen diario",
        )
        .await
    }
}
