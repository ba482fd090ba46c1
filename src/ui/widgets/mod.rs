//! TUI widgets.

mod filter_panel;
mod help;
mod insights;
mod market;
mod news_list;
mod notifications;
mod stats_cards;
mod status_bar;
mod tab_bar;
mod trends;

pub use filter_panel::FilterPanel;
pub use help::HelpPanel;
pub use insights::{DivergenceAlerts, SummaryPanel};
pub use market::{
    DollarCorrelationChart, EMPTY_CORRELATION_MESSAGE, EMPTY_HISTORY_MESSAGE,
    MARKET_UNAVAILABLE_MESSAGE, PriceHistoryChart, QuoteTable,
};
pub use news_list::{EMPTY_NEWS_MESSAGE, NewsList};
pub use notifications::render_notification;
pub use stats_cards::StatsCards;
pub use status_bar::StatusBar;
pub use tab_bar::TabBar;
pub use trends::{DailyTrendChart, EMPTY_TIMELINE_MESSAGE, SourceTable, TimelineChart};

use ratatui::style::Color;

use crate::state::SentimentClass;

/// Color used for a sentiment class everywhere in the UI.
///
/// Unanalyzed articles (`None`) are dimmed.
pub fn sentiment_color(sentiment: Option<SentimentClass>) -> Color {
    match sentiment {
        Some(SentimentClass::Alcista) => Color::Green,
        Some(SentimentClass::Bajista) => Color::Red,
        Some(SentimentClass::Neutral) => Color::Yellow,
        None => Color::DarkGray,
    }
}

/// Truncate a string to at most `max_chars` characters, ending in "...".
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}
