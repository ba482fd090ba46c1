//! Filter selection model.
//!
//! `FilterState` is an immutable snapshot: every update returns a new value,
//! so a snapshot handed to an in-flight load never changes underneath it.
//! Absence of a field always means "unconstrained"; empty sets and blank
//! strings are normalized away on the way in.

use super::SentimentClass;
use crate::api::FilterParams;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Date format accepted in the filter panel and sent to the backend.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The user's current filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    source: Option<BTreeSet<String>>,
    sentiment: Option<SentimentClass>,
    commodity: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

/// A single-field change to a filter snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    /// Replace the whole source set.
    Sources(BTreeSet<String>),
    /// Add the source if absent, remove it otherwise.
    ToggleSource(String),
    Sentiment(Option<SentimentClass>),
    Commodity(Option<String>),
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
}

impl FilterState {
    /// The unconstrained snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new snapshot with one field replaced.
    #[must_use]
    pub fn update(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::Sources(sources) => next.source = normalize_sources(sources),
            FilterUpdate::ToggleSource(source) => {
                let mut sources = next.source.take().unwrap_or_default();
                if !sources.remove(&source) {
                    sources.insert(source);
                }
                next.source = normalize_sources(sources);
            }
            FilterUpdate::Sentiment(sentiment) => next.sentiment = sentiment,
            FilterUpdate::Commodity(commodity) => next.commodity = normalize_text(commodity),
            FilterUpdate::DateFrom(date) => next.date_from = date,
            FilterUpdate::DateTo(date) => next.date_to = date,
        }
        next
    }

    /// The canonical all-unset snapshot, whatever the current state.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::default()
    }

    pub fn sources(&self) -> Option<&BTreeSet<String>> {
        self.source.as_ref()
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.source.as_ref().is_some_and(|s| s.contains(source))
    }

    pub fn sentiment(&self) -> Option<SentimentClass> {
        self.sentiment
    }

    pub fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }

    pub fn date_from(&self) -> Option<NaiveDate> {
        self.date_from
    }

    pub fn date_to(&self) -> Option<NaiveDate> {
        self.date_to
    }

    /// Number of constrained fields.
    pub fn active_count(&self) -> usize {
        [
            self.source.is_some(),
            self.sentiment.is_some(),
            self.commodity.is_some(),
            self.date_from.is_some(),
            self.date_to.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Parameter shape shared by every filtered endpoint.
    pub fn to_params(&self) -> FilterParams {
        FilterParams {
            sentiment: self.sentiment,
            sources: self
                .source
                .as_ref()
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default(),
            commodity: self.commodity.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

fn normalize_sources(sources: BTreeSet<String>) -> Option<BTreeSet<String>> {
    let sources: BTreeSet<String> = sources
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!sources.is_empty()).then_some(sources)
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a filter date; blank input means "unset".
pub fn parse_date(input: &str) -> crate::Result<Option<NaiveDate>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map(Some)
        .map_err(|_| crate::Error::invalid_input(format!("Fecha inválida: {input} (usar AAAA-MM-DD)")))
}

/// A field of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    Source,
    Sentiment,
    Commodity,
    DateFrom,
    DateTo,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        Self::Source,
        Self::Sentiment,
        Self::Commodity,
        Self::DateFrom,
        Self::DateTo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Source => "Fuente",
            Self::Sentiment => "Sentimiento",
            Self::Commodity => "Commodity",
            Self::DateFrom => "Desde",
            Self::DateTo => "Hasta",
        }
    }

    /// Whether the field is edited by typing.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Commodity | Self::DateFrom | Self::DateTo)
    }

    fn offset(&self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0) as isize;
        Self::ALL[(idx + delta).rem_euclid(len) as usize]
    }
}

/// Editing state of the filter panel.
///
/// The panel works on a draft; the applied `FilterState` only changes when
/// the draft is applied.
#[derive(Debug, Clone, Default)]
pub struct FilterPanelState {
    /// Whether the panel is open.
    pub open: bool,
    /// Focused field.
    pub focus: FilterField,
    /// Snapshot being edited.
    pub draft: FilterState,
    /// Text being typed into the focused text field.
    pub input_buffer: String,
    /// Sources offered for selection.
    pub available_sources: Vec<String>,
    /// Highlighted entry in `available_sources`.
    pub source_cursor: usize,
    /// Validation message for the last commit.
    pub error: Option<String>,
}

impl FilterPanelState {
    /// Open the panel with a draft copied from the applied filters.
    pub fn open_with(&mut self, applied: &FilterState) {
        self.open = true;
        self.draft = applied.clone();
        self.error = None;
        self.focus = FilterField::default();
        self.load_buffer();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.input_buffer.clear();
        self.error = None;
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        self.commit_buffer();
        self.focus = self.focus.offset(delta);
        self.load_buffer();
    }

    /// Left/right on the focused field.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FilterField::Sentiment => {
                let current = self.draft.sentiment();
                let next = if forward {
                    SentimentClass::cycle(current)
                } else {
                    SentimentClass::cycle_back(current)
                };
                self.draft = self.draft.update(FilterUpdate::Sentiment(next));
            }
            FilterField::Source if !self.available_sources.is_empty() => {
                let len = self.available_sources.len();
                self.source_cursor = if forward {
                    (self.source_cursor + 1) % len
                } else {
                    (self.source_cursor + len - 1) % len
                };
            }
            _ => {}
        }
    }

    /// Space on the focused field.
    pub fn toggle(&mut self) {
        match self.focus {
            FilterField::Source => {
                if let Some(source) = self.available_sources.get(self.source_cursor) {
                    self.draft = self.draft.update(FilterUpdate::ToggleSource(source.clone()));
                }
            }
            FilterField::Sentiment => self.cycle(true),
            _ => self.push_char(' '),
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.focus.is_text() {
            self.input_buffer.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus.is_text() {
            self.input_buffer.pop();
        }
    }

    /// Replace the list of selectable sources.
    pub fn set_available_sources(&mut self, sources: Vec<String>) {
        self.available_sources = sources;
        if self.source_cursor >= self.available_sources.len() {
            self.source_cursor = 0;
        }
    }

    /// Write the text buffer into the draft's focused field.
    ///
    /// Invalid dates leave the field unset and record a message.
    pub fn commit_buffer(&mut self) {
        let text = self.input_buffer.clone();
        let update = match self.focus {
            FilterField::Commodity => Some(FilterUpdate::Commodity(Some(text))),
            FilterField::DateFrom | FilterField::DateTo => {
                let date = match parse_date(&text) {
                    Ok(date) => {
                        self.error = None;
                        date
                    }
                    Err(e) => {
                        self.error = Some(e.to_string());
                        None
                    }
                };
                Some(if self.focus == FilterField::DateFrom {
                    FilterUpdate::DateFrom(date)
                } else {
                    FilterUpdate::DateTo(date)
                })
            }
            _ => None,
        };
        if let Some(update) = update {
            self.draft = self.draft.update(update);
        }
    }

    fn load_buffer(&mut self) {
        self.input_buffer = match self.focus {
            FilterField::Commodity => self.draft.commodity().unwrap_or_default().to_string(),
            FilterField::DateFrom => format_date(self.draft.date_from()),
            FilterField::DateTo => format_date(self.draft.date_to()),
            _ => String::new(),
        };
    }

    /// Commit pending text and return the snapshot to apply.
    pub fn finish(&mut self) -> FilterState {
        self.commit_buffer();
        self.draft.clone()
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
