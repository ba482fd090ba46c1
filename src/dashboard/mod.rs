//! Data loading for the dashboard.
//!
//! The loaders here are plain async functions over [`SentimentApi`]; the
//! [`Orchestrator`] runs them on background tasks and reports back through
//! the action channel.

mod orchestrator;

pub use orchestrator::Orchestrator;

use crate::api::SentimentApi;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::state::{Action, DashboardData, Divergence, FilterState, Store};
use futures::future::join_all;
use tracing::{debug, warn};

/// Issue the five primary reads concurrently and join them all-or-nothing.
///
/// Every filtered read uses the same `filters` snapshot. The first error
/// fails the whole load; partial results are dropped.
pub async fn fetch_dashboard(
    api: &dyn SentimentApi,
    filters: &FilterState,
    settings: &DashboardConfig,
) -> Result<DashboardData> {
    let params = filters.to_params();

    let (news, stats, daily_trends, source_trends, timeline) = tokio::try_join!(
        api.fetch_news(settings.news_limit, &params),
        api.fetch_stats(),
        api.fetch_daily_trends(settings.trend_days, &params),
        api.fetch_source_trends(&params),
        api.fetch_sentiment_timeline(settings.trend_days, &params),
    )?;

    debug!(
        articles = news.articles.len(),
        total = stats.total,
        "dashboard data loaded"
    );

    Ok(DashboardData {
        news,
        stats,
        daily_trends,
        source_trends,
        timeline,
    })
}

/// Query divergence for every configured commodity and keep the alerts.
///
/// Failures are logged and skipped.
pub async fn fetch_alerts(api: &dyn SentimentApi, settings: &DashboardConfig) -> Vec<Divergence> {
    let requests = settings
        .divergence_commodities
        .iter()
        .map(|commodity| api.fetch_divergence(commodity, settings.divergence_days));

    join_all(requests)
        .await
        .into_iter()
        .zip(&settings.divergence_commodities)
        .filter_map(|(result, commodity)| match result {
            Ok(divergence) => divergence.is_alert().then_some(divergence),
            Err(e) => {
                warn!(%commodity, error = %e, "divergence check failed");
                None
            }
        })
        .collect()
}

/// Reduce `action`, starting the backend work it asks for.
///
/// Filter changes always end in a fresh primary load tagged with the
/// store's newest sequence number.
pub fn handle_action(store: &mut Store, orchestrator: &Orchestrator, action: Action) {
    match action {
        Action::Reload => reload(store, orchestrator),
        Action::ApplyFilters | Action::ClearFilters => {
            store.reduce(action);
            reload(store, orchestrator);
        }
        Action::TriggerUpdate => {
            store.reduce(Action::UpdateStarted);
            orchestrator.spawn_trigger_update();
        }
        Action::LoadSources => {
            orchestrator.spawn_sources();
        }
        Action::RefreshMarket => {
            orchestrator.spawn_market_refresh();
        }
        Action::CycleHistoryPeriod => {
            store.reduce(action);
            orchestrator.spawn_history(store.market.history_days);
        }
        _ => store.reduce(action),
    }
}

fn reload(store: &mut Store, orchestrator: &Orchestrator) {
    store.reduce(Action::LoadStarted);
    let seq = store.dashboard.latest_load();
    orchestrator.spawn_load(seq, store.filters.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FilterParams, MockSentimentApi};
    use crate::error::Error;
    use crate::state::{
        DivergenceKind, FilterUpdate, NewsList, PipelineResponse, SentimentClass, SentimentStats,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio_test::{assert_err, assert_ok};

    /// A mock whose five primary reads all succeed.
    pub(crate) fn healthy_api() -> MockSentimentApi {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_news()
            .returning(|_, _| Ok(NewsList::default()));
        api.expect_fetch_stats()
            .returning(|| Ok(SentimentStats::from_counts(10, 3, 2, 5, 0)));
        api.expect_fetch_daily_trends()
            .returning(|_, _| Ok(Vec::new()));
        api.expect_fetch_source_trends()
            .returning(|_| Ok(Vec::new()));
        api.expect_fetch_sentiment_timeline()
            .returning(|_, _| Ok(Vec::new()));
        api
    }

    fn divergence(commodity: &str, kind: DivergenceKind) -> Divergence {
        Divergence {
            divergence_type: kind,
            commodity: commodity.to_string(),
            sentiment_score: 0.6,
            price_change_pct: -2.1,
            signal_strength: 3,
            news_count: 12,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_all_reads_succeed() {
        let api = healthy_api();
        let data = assert_ok!(
            fetch_dashboard(&api, &FilterState::default(), &DashboardConfig::default()).await
        );
        assert_eq!(data.stats.alcista_percentage, 30.0);
        assert!(data.news.articles.is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_read_fails_the_load() {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_news()
            .returning(|_, _| Ok(NewsList::default()));
        api.expect_fetch_stats()
            .returning(|| Err(Error::fetch_failed("las estadísticas", "http://localhost:8000")));
        api.expect_fetch_daily_trends()
            .returning(|_, _| Ok(Vec::new()));
        api.expect_fetch_source_trends()
            .returning(|_| Ok(Vec::new()));
        api.expect_fetch_sentiment_timeline()
            .returning(|_, _| Ok(Vec::new()));

        let err = assert_err!(
            fetch_dashboard(&api, &FilterState::default(), &DashboardConfig::default()).await
        );
        assert!(err.to_string().contains("las estadísticas"));
    }

    #[tokio::test]
    async fn test_filtered_reads_share_one_snapshot() {
        let filters = FilterState::new()
            .update(FilterUpdate::Sentiment(Some(SentimentClass::Bajista)))
            .update(FilterUpdate::ToggleSource("Infocampo".to_string()));
        let expected = filters.to_params();
        let settings = DashboardConfig::default();

        let mut api = MockSentimentApi::new();
        let want = expected.clone();
        api.expect_fetch_news()
            .withf(move |limit, params| *limit == 50 && *params == want)
            .times(1)
            .returning(|_, _| Ok(NewsList::default()));
        api.expect_fetch_stats()
            .times(1)
            .returning(|| Ok(SentimentStats::default()));
        let want = expected.clone();
        api.expect_fetch_daily_trends()
            .withf(move |days, params| *days == 7 && *params == want)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let want = expected.clone();
        api.expect_fetch_source_trends()
            .withf(move |params| *params == want)
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let want = expected;
        api.expect_fetch_sentiment_timeline()
            .withf(move |days, params| *days == 7 && *params == want)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        assert_ok!(fetch_dashboard(&api, &filters, &settings).await);
    }

    #[tokio::test]
    async fn test_alerts_skip_failures_and_quiet_signals() {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_divergence()
            .returning(|commodity, days| {
                assert_eq!(days, 7);
                match commodity {
                    "soja" => Ok(divergence("SOJA", DivergenceKind::BullishDivergence)),
                    "maiz" => Ok(divergence("MAIZ", DivergenceKind::None)),
                    _ => Err(Error::fetch_failed("los datos de divergencia", "http://x")),
                }
            });

        let alerts = fetch_alerts(&api, &DashboardConfig::default()).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].commodity, "SOJA");
    }

    /// A mock that expects exactly one news read with `params`.
    fn api_expecting_news(params: FilterParams) -> MockSentimentApi {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_news()
            .withf(move |limit, p| *limit == 50 && *p == params)
            .times(1)
            .returning(|_, _| Ok(NewsList::default()));
        api.expect_fetch_stats()
            .returning(|| Ok(SentimentStats::default()));
        api.expect_fetch_daily_trends()
            .returning(|_, _| Ok(Vec::new()));
        api.expect_fetch_source_trends()
            .returning(|_| Ok(Vec::new()));
        api.expect_fetch_sentiment_timeline()
            .returning(|_, _| Ok(Vec::new()));
        api
    }

    fn wired(api: MockSentimentApi) -> (Store, Orchestrator, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Store::new(tx.clone());
        let orchestrator = Orchestrator::new(Arc::new(api), tx, DashboardConfig::default());
        (store, orchestrator, rx)
    }

    async fn next_load(rx: &mut mpsc::UnboundedReceiver<Action>) -> (u64, bool) {
        loop {
            match rx.recv().await {
                Some(Action::LoadCompleted { seq, result }) => return (seq, result.is_ok()),
                Some(_) => continue,
                None => panic!("channel closed before the load completed"),
            }
        }
    }

    #[tokio::test]
    async fn test_clear_filters_reloads_without_filters() {
        let (mut store, orchestrator, mut rx) = wired(api_expecting_news(FilterParams::default()));
        store.filters = store
            .filters
            .update(FilterUpdate::Sentiment(Some(SentimentClass::Bajista)))
            .update(FilterUpdate::ToggleSource("Agrofy".to_string()));

        handle_action(&mut store, &orchestrator, Action::ClearFilters);
        assert_eq!(store.filters, FilterState::default());
        assert!(store.dashboard.is_loading());

        let (seq, ok) = next_load(&mut rx).await;
        assert_eq!(seq, store.dashboard.latest_load());
        assert!(ok);
    }

    #[tokio::test]
    async fn test_apply_filters_reloads_with_the_draft() {
        let draft = FilterState::new()
            .update(FilterUpdate::Sentiment(Some(SentimentClass::Alcista)))
            .update(FilterUpdate::Commodity(Some("soja".to_string())));
        let (mut store, orchestrator, mut rx) = wired(api_expecting_news(draft.to_params()));
        handle_action(&mut store, &orchestrator, Action::OpenFilters);
        store.filter_panel.draft = draft.clone();

        handle_action(&mut store, &orchestrator, Action::ApplyFilters);
        assert_eq!(store.filters, draft);
        assert!(!store.filter_panel.open);

        let (seq, ok) = next_load(&mut rx).await;
        assert_eq!(seq, store.dashboard.latest_load());
        assert!(ok);
    }

    #[tokio::test]
    async fn test_each_reload_is_tagged_with_a_newer_sequence() {
        let (mut store, orchestrator, mut rx) = wired(healthy_api());

        handle_action(&mut store, &orchestrator, Action::Reload);
        let first = store.dashboard.latest_load();
        let (seq, _) = next_load(&mut rx).await;
        assert_eq!(seq, first);

        handle_action(&mut store, &orchestrator, Action::ClearFilters);
        let (seq, _) = next_load(&mut rx).await;
        assert!(seq > first);
        assert_eq!(seq, store.dashboard.latest_load());
    }

    #[tokio::test]
    async fn test_trigger_marks_updating_and_calls_the_backend() {
        let mut api = MockSentimentApi::new();
        api.expect_trigger_pipeline().times(1).returning(|| {
            Err(Error::trigger_failed("http://localhost:8000"))
        });
        let (mut store, orchestrator, mut rx) = wired(api);

        handle_action(&mut store, &orchestrator, Action::TriggerUpdate);
        assert!(store.dashboard.is_updating());

        let finished = rx.recv().await;
        assert!(matches!(finished, Some(Action::UpdateFinished(Err(_)))));
        if let Some(action) = finished {
            handle_action(&mut store, &orchestrator, action);
        }
        assert!(!store.dashboard.is_updating());
    }

    #[tokio::test]
    async fn test_successful_trigger_reports_the_backend_message() {
        let mut api = MockSentimentApi::new();
        api.expect_trigger_pipeline().times(1).returning(|| {
            Ok(PipelineResponse {
                status: "running".to_string(),
                message: "Pipeline started".to_string(),
            })
        });
        let (mut store, orchestrator, mut rx) = wired(api);

        handle_action(&mut store, &orchestrator, Action::TriggerUpdate);
        match rx.recv().await {
            Some(action @ Action::UpdateFinished(Ok(_))) => {
                handle_action(&mut store, &orchestrator, action)
            }
            other => panic!("unexpected {other:?}"),
        }
        let notification = store.app.notification.as_ref().map(|n| n.message.as_str());
        assert_eq!(notification, Some("Pipeline iniciado: Pipeline started"));
    }
}
