//! State management for Agromate.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Async work never
//! writes state directly: it sends an [`Action`] back through the store's
//! channel and the UI loop reduces it.

mod app_state;
mod dashboard_state;
mod filter_state;
mod market_state;
mod news_state;
mod pipeline_state;
mod trend_state;

pub use app_state::{AppState, InputMode, View};
pub use dashboard_state::{DashboardData, DashboardState, LoadOutcome, LoadPhase};
pub use filter_state::{
    DATE_FORMAT, FilterField, FilterPanelState, FilterState, FilterUpdate, parse_date,
};
pub use market_state::{
    BRECHA_KEY, COMMODITY_SERIES_SUFFIX, DOLAR_BLUE_KEY, DOLAR_OFICIAL_KEY, DailySummary,
    Divergence, DivergenceKind, HISTORY_PERIODS, HistoryCommodity, MarketSnapshot, MarketState,
    Mood, PriceHistory, PricePoint, Quote, QuoteStatus, SummaryCounts,
};
pub use news_state::{Article, NewsList, SentimentClass, SentimentStats};
pub use pipeline_state::{Freshness, PipelineResponse, PipelineStatus};
pub use trend_state::{
    DailyTrend, SourceDistribution, TimelinePoint, zero_crossing_offset,
};

use crate::error::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    NextView,
    ToggleHelp,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,

    // Primary load cycle
    /// Start a load with the applied filters (initial load and retry).
    Reload,
    LoadStarted,
    LoadCompleted {
        seq: u64,
        result: std::result::Result<DashboardData, String>,
    },

    // Backend pipeline
    /// Ask the backend to re-scrape and re-analyze.
    TriggerUpdate,
    UpdateStarted,
    UpdateFinished(std::result::Result<PipelineResponse, String>),

    // Filters
    OpenFilters,
    CloseFilters,
    FilterFocusNext,
    FilterFocusPrev,
    /// Left (`false`) / right (`true`) on the focused field.
    FilterCycle(bool),
    FilterToggle,
    FilterInput(char),
    FilterBackspace,
    /// Replace the applied filters with the panel draft, then reload.
    ApplyFilters,
    /// Reset the applied filters, then reload.
    ClearFilters,

    // Secondary panels
    LoadSources,
    SourcesLoaded(Vec<String>),
    RefreshMarket,
    MarketLoaded(Option<MarketSnapshot>),
    PipelineStatusLoaded(Option<PipelineStatus>),
    CycleHistoryPeriod,
    HistoryLoaded {
        days: u32,
        history: Option<PriceHistory>,
    },
    CorrelationLoaded(Option<PriceHistory>),
    DivergencesLoaded(Vec<Divergence>),
    SummaryLoaded(Option<DailySummary>),

    // UI
    ShowNotification(Notification),
    DismissNotification,
    Tick,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
    pub created_at: Instant,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    fn with_level(message: impl Into<String>, level: NotificationLevel, duration_secs: u64) -> Self {
        Self {
            message: message.into(),
            level,
            duration_secs,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Success, 4)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Warning, 5)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Error, 10)
    }

    /// Whether the notification has outlived its duration at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= Duration::from_secs(self.duration_secs)
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Applied filters; the snapshot every load is issued with.
    pub filters: FilterState,
    /// Filter panel editing state.
    pub filter_panel: FilterPanelState,
    /// Primary dashboard data and load phase.
    pub dashboard: DashboardState,
    /// Secondary market panels.
    pub market: MarketState,
    /// Backend pipeline freshness.
    pub pipeline_status: Option<PipelineStatus>,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::default(),
            filters: FilterState::default(),
            filter_panel: FilterPanelState::default(),
            dashboard: DashboardState::default(),
            market: MarketState::default(),
            pipeline_status: None,
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.app.current_view = view,
            Action::NextView => self.app.current_view = self.app.current_view.next(),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.dashboard.select_first(),
            Action::GoToBottom => self.dashboard.select_last(),

            // Primary load cycle
            Action::Reload | Action::LoadStarted => {
                self.dashboard.begin_load();
            }
            Action::LoadCompleted { seq, result } => {
                if let Err(message) = &result {
                    tracing::error!(seq, %message, "dashboard load failed");
                }
                self.dashboard.complete_load(seq, result, chrono::Utc::now());
            }

            // Backend pipeline
            Action::TriggerUpdate | Action::UpdateStarted => self.dashboard.begin_update(),
            Action::UpdateFinished(result) => {
                self.dashboard.finish_update();
                self.app.notification = Some(match result {
                    Ok(response) => {
                        Notification::success(format!("Pipeline iniciado: {}", response.message))
                    }
                    Err(message) => Notification::error(message),
                });
            }

            // Filters
            Action::OpenFilters => {
                self.filter_panel.open_with(&self.filters);
                self.app.input_mode = InputMode::Filter;
            }
            Action::CloseFilters => self.close_filter_panel(),
            Action::FilterFocusNext => self.filter_panel.focus_next(),
            Action::FilterFocusPrev => self.filter_panel.focus_prev(),
            Action::FilterCycle(forward) => self.filter_panel.cycle(forward),
            Action::FilterToggle => self.filter_panel.toggle(),
            Action::FilterInput(c) => self.filter_panel.push_char(c),
            Action::FilterBackspace => self.filter_panel.pop_char(),
            Action::ApplyFilters => {
                self.filters = self.filter_panel.finish();
                if let Some(error) = self.filter_panel.error.clone() {
                    self.app.notification = Some(Notification::warning(error));
                }
                self.close_filter_panel();
            }
            Action::ClearFilters => {
                self.filters = self.filters.clear();
                self.filter_panel.draft = self.filters.clone();
                self.close_filter_panel();
            }

            // Secondary panels
            Action::LoadSources => {}
            Action::SourcesLoaded(sources) => self.filter_panel.set_available_sources(sources),
            Action::RefreshMarket => {}
            Action::MarketLoaded(snapshot) => {
                if snapshot.is_some() {
                    self.market.last_updated = Some(chrono::Utc::now());
                }
                self.market.snapshot = snapshot;
                self.market.loading = false;
            }
            Action::PipelineStatusLoaded(status) => {
                if status.is_some() {
                    self.pipeline_status = status;
                }
            }
            Action::CycleHistoryPeriod => {
                self.market.history_days = self.market.next_history_period();
                self.market.history_loading = true;
            }
            Action::HistoryLoaded { days, history } => {
                if days == self.market.history_days {
                    self.market.history_failed = history.is_none();
                    self.market.history = history;
                    self.market.history_loading = false;
                }
            }
            Action::DivergencesLoaded(divergences) => self.market.divergences = divergences,
            Action::CorrelationLoaded(history) => {
                self.market.correlation = history.filter(|h| !h.is_empty());
            }
            Action::SummaryLoaded(summary) => self.market.summary = summary,

            // UI
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }
            Action::Tick => {
                if self
                    .app
                    .notification
                    .as_ref()
                    .is_some_and(|n| n.is_expired(Instant::now()))
                {
                    self.app.notification = None;
                }
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    fn close_filter_panel(&mut self) {
        self.filter_panel.close();
        self.app.input_mode = InputMode::Normal;
    }

    fn scroll(&mut self, delta: i32) {
        if matches!(self.app.current_view, View::News | View::Overview) {
            self.dashboard.scroll(delta);
        }
    }
}
