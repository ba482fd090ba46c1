//! Background task coordination.
//!
//! Each operation runs on its own task and reports its outcome as an
//! [`Action`]. The UI loop stays the single writer of state, and no task
//! ever waits on another: overlapping loads and triggers run side by side.

use super::{fetch_alerts, fetch_dashboard};
use crate::api::SentimentApi;
use crate::config::DashboardConfig;
use crate::state::{Action, FilterState};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, info, warn};

/// Runs dashboard operations against the backend.
pub struct Orchestrator {
    api: Arc<dyn SentimentApi>,
    action_tx: mpsc::UnboundedSender<Action>,
    settings: DashboardConfig,
    poller: Option<JoinHandle<()>>,
}

fn send(tx: &mpsc::UnboundedSender<Action>, action: Action) {
    if tx.send(action).is_err() {
        debug!("action channel closed; dropping result");
    }
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn SentimentApi>,
        action_tx: mpsc::UnboundedSender<Action>,
        settings: DashboardConfig,
    ) -> Self {
        Self {
            api,
            action_tx,
            settings,
            poller: None,
        }
    }

    /// Load the primary dashboard for `filters`, tagged with `seq`.
    pub fn spawn_load(&self, seq: u64, filters: FilterState) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let settings = self.settings.clone();

        tokio::spawn(async move {
            debug!(seq, active_filters = filters.active_count(), "load started");
            let result = fetch_dashboard(api.as_ref(), &filters, &settings)
                .await
                .map_err(|e| e.to_string());
            send(&tx, Action::LoadCompleted { seq, result });
        })
    }

    /// Ask the backend to re-run its pipeline, then reload after the
    /// configured delay. The pipeline itself is never awaited.
    pub fn spawn_trigger_update(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let delay = self.settings.update_reload_delay();

        tokio::spawn(async move {
            match api.trigger_pipeline().await {
                Ok(response) => {
                    info!(status = %response.status, "pipeline triggered");
                    send(&tx, Action::UpdateFinished(Ok(response)));
                    tokio::time::sleep(delay).await;
                    send(&tx, Action::Reload);
                }
                Err(e) => {
                    warn!(error = %e, "pipeline trigger failed");
                    send(&tx, Action::UpdateFinished(Err(e.to_string())));
                }
            }
        })
    }

    /// Fetch the source names offered by the filter panel.
    pub fn spawn_sources(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let sources = api.fetch_sources().await.unwrap_or_else(|e| {
                warn!(error = %e, "failed to load sources");
                Vec::new()
            });
            send(&tx, Action::SourcesLoaded(sources));
        })
    }

    /// Refresh quotes and pipeline freshness once.
    pub fn spawn_market_refresh(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        tokio::spawn(async move { refresh_market(api.as_ref(), &tx).await })
    }

    /// Fetch the price history for `days`.
    pub fn spawn_history(&self, days: u32) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let commodities = self.settings.history_commodities.clone();

        tokio::spawn(async move {
            let history = match api.fetch_market_history(days, &commodities).await {
                Ok(history) => Some(history),
                Err(e) => {
                    warn!(days, error = %e, "failed to load price history");
                    None
                }
            };
            send(&tx, Action::HistoryLoaded { days, history });
        })
    }

    /// Fetch the commodity and dollar series behind the correlation panel.
    pub fn spawn_correlation(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let days = self.settings.correlation_days;
        let commodity = self.settings.correlation_commodity.clone();

        tokio::spawn(async move {
            let history = api
                .fetch_market_history(days, &commodity)
                .await
                .inspect_err(|e| warn!(days, %commodity, error = %e, "failed to load dollar correlation"))
                .ok();
            send(&tx, Action::CorrelationLoaded(history));
        })
    }

    /// Check every configured commodity for divergence alerts.
    pub fn spawn_divergences(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        let settings = self.settings.clone();

        tokio::spawn(async move {
            let alerts = fetch_alerts(api.as_ref(), &settings).await;
            send(&tx, Action::DivergencesLoaded(alerts));
        })
    }

    /// Fetch the generated daily summary.
    pub fn spawn_summary(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let summary = match api.fetch_daily_summary().await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(error = %e, "failed to load daily summary");
                    None
                }
            };
            send(&tx, Action::SummaryLoaded(summary));
        })
    }

    /// Start polling quotes on the configured interval. The first poll runs
    /// immediately. Polling stops when the orchestrator is dropped.
    pub fn start_polling(&mut self) {
        let Some(period) = self.settings.market_refresh_interval() else {
            info!("market polling disabled");
            return;
        };
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }

        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();

        self.poller = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(interval);

            while ticks.next().await.is_some() {
                if tx.is_closed() {
                    break;
                }
                refresh_market(api.as_ref(), &tx).await;
            }
        }));
        debug!(period_secs = period.as_secs(), "market polling started");
    }

    /// Stop the market poller if running.
    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            debug!("market polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Delay between a successful trigger and the follow-up reload.
    pub fn reload_delay(&self) -> Duration {
        self.settings.update_reload_delay()
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

async fn refresh_market(api: &dyn SentimentApi, tx: &mpsc::UnboundedSender<Action>) {
    let (market, status) = tokio::join!(api.fetch_market_current(), api.fetch_pipeline_status());

    let market = market
        .inspect_err(|e| warn!(error = %e, "failed to load market data"))
        .ok();
    let status = status
        .inspect_err(|e| warn!(error = %e, "failed to load pipeline status"))
        .ok();

    send(tx, Action::MarketLoaded(market));
    send(tx, Action::PipelineStatusLoaded(status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSentimentApi;
    use crate::dashboard::tests::healthy_api;
    use crate::error::Error;
    use crate::state::{MarketSnapshot, PipelineResponse, PipelineStatus, PriceHistory};
    use pretty_assertions::assert_eq;

    fn orchestrator(api: MockSentimentApi) -> (Orchestrator, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Orchestrator::new(Arc::new(api), tx, DashboardConfig::default()),
            rx,
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Action>) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn accepted() -> PipelineResponse {
        PipelineResponse {
            status: "running".to_string(),
            message: "Pipeline started".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_reports_with_its_sequence_number() {
        let (orch, mut rx) = orchestrator(healthy_api());
        orch.spawn_load(7, FilterState::default()).await.unwrap();

        match rx.try_recv() {
            Ok(Action::LoadCompleted { seq, result }) => {
                assert_eq!(seq, 7);
                assert!(result.is_ok());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_triggers_both_reach_the_backend() {
        let mut api = MockSentimentApi::new();
        api.expect_trigger_pipeline()
            .times(2)
            .returning(|| Ok(accepted()));
        let (orch, mut rx) = orchestrator(api);

        let first = orch.spawn_trigger_update();
        let second = orch.spawn_trigger_update();
        first.await.unwrap();
        second.await.unwrap();

        let actions = drain(&mut rx);
        let finished = actions
            .iter()
            .filter(|a| matches!(a, Action::UpdateFinished(Ok(_))))
            .count();
        let reloads = actions
            .iter()
            .filter(|a| matches!(a, Action::Reload))
            .count();
        assert_eq!(finished, 2);
        assert_eq!(reloads, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_waits_for_the_configured_delay() {
        let mut api = MockSentimentApi::new();
        api.expect_trigger_pipeline().returning(|| Ok(accepted()));
        let (orch, mut rx) = orchestrator(api);
        let delay = orch.reload_delay();

        let handle = orch.spawn_trigger_update();
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(Action::UpdateFinished(Ok(_)))));

        tokio::time::advance(delay - Duration::from_millis(1)).await;
        settle().await;
        assert!(rx.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        handle.await.unwrap();
        assert!(matches!(rx.try_recv(), Ok(Action::Reload)));
    }

    #[tokio::test]
    async fn test_failed_trigger_does_not_reload() {
        let mut api = MockSentimentApi::new();
        api.expect_trigger_pipeline()
            .returning(|| Err(Error::trigger_failed("http://localhost:8000")));
        let (orch, mut rx) = orchestrator(api);

        orch.spawn_trigger_update().await.unwrap();
        let actions = drain(&mut rx);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::UpdateFinished(Err(msg)) if msg.contains("No se pudo iniciar")));
    }

    #[tokio::test]
    async fn test_secondary_failures_are_swallowed() {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_sources()
            .returning(|| Err(Error::fetch_failed("las fuentes", "http://x")));
        api.expect_fetch_market_history()
            .returning(|_, _| Err(Error::fetch_failed("los precios históricos", "http://x")));
        api.expect_fetch_daily_summary()
            .returning(|| Err(Error::decode("missing field")));
        let (orch, mut rx) = orchestrator(api);

        orch.spawn_sources().await.unwrap();
        orch.spawn_history(90).await.unwrap();
        orch.spawn_summary().await.unwrap();

        let actions = drain(&mut rx);
        assert!(matches!(&actions[0], Action::SourcesLoaded(s) if s.is_empty()));
        assert!(matches!(
            &actions[1],
            Action::HistoryLoaded { days: 90, history: None }
        ));
        assert!(matches!(&actions[2], Action::SummaryLoaded(None)));
    }

    #[tokio::test]
    async fn test_correlation_requests_the_configured_commodity() {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_market_history()
            .withf(|days, commodities| *days == 30 && commodities == "soja")
            .times(1)
            .returning(|_, _| Ok(PriceHistory::default()));
        let (orch, mut rx) = orchestrator(api);

        orch.spawn_correlation().await.unwrap();
        assert!(matches!(rx.try_recv(), Ok(Action::CorrelationLoaded(Some(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_runs_on_interval_until_dropped() {
        let mut api = MockSentimentApi::new();
        api.expect_fetch_market_current()
            .returning(|| Ok(MarketSnapshot::default()));
        api.expect_fetch_pipeline_status()
            .returning(|| Ok(PipelineStatus::default()));
        let (mut orch, mut rx) = orchestrator(api);

        orch.start_polling();
        assert!(orch.is_polling());
        settle().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        drop(orch);
        tokio::time::advance(Duration::from_secs(180)).await;
        settle().await;

        let polls = drain(&mut rx)
            .iter()
            .filter(|a| matches!(a, Action::MarketLoaded(Some(_))))
            .count();
        assert_eq!(polls, 2);
    }
}
