//! UI rendering using ratatui.
//!
//! Every frame is drawn from the [`Store`] alone; widgets never fetch or
//! mutate anything.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{
    DailyTrendChart, DivergenceAlerts, DollarCorrelationChart, FilterPanel, HelpPanel, NewsList,
    PriceHistoryChart, QuoteTable, SourceTable, StatsCards, StatusBar, SummaryPanel, TabBar, TimelineChart,
};

use crate::state::{DashboardData, LoadPhase, Store, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Shown while the first load of a primary view is in flight.
pub const LOADING_MESSAGE: &str = "Cargando análisis de mercado...";

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, show_status_bar: bool) {
        let layout = Layout::new(frame.area(), show_status_bar);

        if show_status_bar {
            StatusBar::render(frame, layout.status_area, store);
        }
        TabBar::render(frame, layout.tab_area, store);

        let view = store.app.current_view;
        if view.is_primary() {
            match store.dashboard.data() {
                Some(data) => render_primary(frame, layout.main_area, store, data),
                None => render_placeholder(frame, layout.main_area, store.dashboard.phase()),
            }
        } else {
            render_market(frame, layout.main_area, store);
        }

        if store.filter_panel.open {
            FilterPanel::render(frame, frame.area(), &store.filter_panel);
        }

        if store.app.show_help {
            HelpPanel::render(frame, frame.area());
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }
    }
}

fn render_primary(frame: &mut Frame, area: Rect, store: &Store, data: &DashboardData) {
    match store.app.current_view {
        View::Overview => render_overview(frame, area, store, data),
        View::News => NewsList::render(frame, area, &store.dashboard),
        View::Trends => {
            let chunks = RatatuiLayout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let top = RatatuiLayout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[0]);
            DailyTrendChart::render(frame, top[0], &data.daily_trends);
            SourceTable::render(frame, top[1], &data.source_trends);
            TimelineChart::render(frame, chunks[1], &data.timeline);
        }
        View::Market => render_market(frame, area, store),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, store: &Store, data: &DashboardData) {
    let alerts = &store.market.divergences;
    let summary = store.market.summary.as_ref();
    let summary_height = if summary.is_some() { 8 } else { 0 };

    let chunks = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(DivergenceAlerts::height(alerts)),
            Constraint::Length(summary_height),
            Constraint::Min(6),
        ])
        .split(area);

    StatsCards::render(frame, chunks[0], &data.stats);
    DivergenceAlerts::render(frame, chunks[1], alerts);
    SummaryPanel::render(frame, chunks[2], summary);
    TimelineChart::render(frame, chunks[3], &data.timeline);
}

fn render_market(frame: &mut Frame, area: Rect, store: &Store) {
    let chunks = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(8)])
        .split(area);
    let charts = RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    QuoteTable::render(frame, chunks[0], &store.market);
    PriceHistoryChart::render(frame, charts[0], &store.market);
    DollarCorrelationChart::render(frame, charts[1], &store.market);
}

/// Loading or error screen shown while a primary view has no data.
fn render_placeholder(frame: &mut Frame, area: Rect, phase: &LoadPhase) {
    let (lines, border) = match phase {
        LoadPhase::Error(message) => (
            vec![
                Line::from(Span::styled(
                    "✗ Error al cargar el dashboard",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(message.as_str()),
                Line::from(""),
                Line::from(Span::styled(
                    "Presioná r o Enter para reintentar",
                    Style::default().fg(Color::Yellow),
                )),
            ],
            Color::Red,
        ),
        LoadPhase::Idle | LoadPhase::Loading | LoadPhase::Ready => (
            vec![Line::from(Span::styled(
                LOADING_MESSAGE,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))],
            Color::DarkGray,
        ),
    };

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::state::Store;
    use ratatui::{Frame, Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    /// Draw into an in-memory terminal and return its text, one line per row.
    pub fn render_to_string(width: u16, height: u16, draw: impl FnOnce(&mut Frame)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    pub fn test_store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }
}
