//! Primary dashboard state machine.
//!
//! `Idle → Loading → {Ready, Error}` for the read cycle, plus an orthogonal
//! count of in-flight pipeline triggers. Loads are numbered; only the
//! completion of the most recent load is applied.

use super::{DailyTrend, NewsList, SentimentStats, SourceDistribution, TimelinePoint};
use chrono::{DateTime, Utc};

/// Phase of the read cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Failed load with its display message.
    Error(String),
}

/// Everything one load cycle produces. Replaced as a whole, never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub news: NewsList,
    pub stats: SentimentStats,
    pub daily_trends: Vec<DailyTrend>,
    pub source_trends: Vec<SourceDistribution>,
    pub timeline: Vec<TimelinePoint>,
}

/// Outcome of applying a load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was started after this one; the result was dropped.
    Stale,
}

/// State for the primary dashboard.
#[derive(Debug, Default)]
pub struct DashboardState {
    phase: LoadPhase,
    data: Option<DashboardData>,
    latest_load: u64,
    pending_updates: usize,
    /// Selected article in the news list.
    pub selected_article: Option<usize>,
    /// When the current data was applied.
    pub last_loaded: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// Data of the last successful load. `None` unless the phase is `Ready`
    /// or a reload is in progress after a success.
    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            LoadPhase::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Sequence number of the most recently started load.
    pub fn latest_load(&self) -> u64 {
        self.latest_load
    }

    /// Enter `Loading` and return the number identifying this load.
    pub fn begin_load(&mut self) -> u64 {
        self.latest_load += 1;
        self.phase = LoadPhase::Loading;
        self.latest_load
    }

    /// Apply the result of load `seq`.
    ///
    /// Success replaces all data; failure drops all data so an error is never
    /// shown next to stale results.
    pub fn complete_load(
        &mut self,
        seq: u64,
        result: std::result::Result<DashboardData, String>,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if seq != self.latest_load {
            tracing::debug!(seq, latest = self.latest_load, "dropping stale load result");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(data) => {
                let len = data.news.articles.len();
                self.selected_article = self
                    .selected_article
                    .filter(|i| *i < len)
                    .or((len > 0).then_some(0));
                self.data = Some(data);
                self.last_loaded = Some(now);
                self.phase = LoadPhase::Ready;
            }
            Err(message) => {
                self.data = None;
                self.selected_article = None;
                self.phase = LoadPhase::Error(message);
            }
        }
        LoadOutcome::Applied
    }

    /// Whether at least one pipeline trigger is in flight.
    pub fn is_updating(&self) -> bool {
        self.pending_updates > 0
    }

    pub fn pending_updates(&self) -> usize {
        self.pending_updates
    }

    /// Record a new pipeline trigger. Never refused: triggers overlap freely.
    pub fn begin_update(&mut self) {
        self.pending_updates += 1;
    }

    pub fn finish_update(&mut self) {
        self.pending_updates = self.pending_updates.saturating_sub(1);
    }

    /// Articles of the current data, or an empty slice.
    pub fn articles(&self) -> &[super::Article] {
        self.data
            .as_ref()
            .map(|d| d.news.articles.as_slice())
            .unwrap_or_default()
    }

    /// Move the article selection by `delta`, clamped to the list.
    pub fn scroll(&mut self, delta: i32) {
        let len = self.articles().len();
        if len == 0 {
            self.selected_article = None;
            return;
        }
        let current = self.selected_article.unwrap_or(0) as i64;
        let next = (current + delta as i64).clamp(0, len as i64 - 1);
        self.selected_article = Some(next as usize);
    }

    pub fn select_first(&mut self) {
        self.selected_article = (!self.articles().is_empty()).then_some(0);
    }

    pub fn select_last(&mut self) {
        self.selected_article = self.articles().len().checked_sub(1);
    }

    pub fn selected(&self) -> Option<&super::Article> {
        self.selected_article.and_then(|i| self.articles().get(i))
    }
}
