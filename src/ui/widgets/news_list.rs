//! News list widget.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::{sentiment_color, truncate};
use crate::state::{Article, DashboardState};

/// Shown instead of the table when the backend has no articles.
pub const EMPTY_NEWS_MESSAGE: &str =
    "No hay noticias disponibles. Ejecutá \"Actualizar Análisis\" (u) para obtener datos.";

/// News list widget.
pub struct NewsList;

impl NewsList {
    /// Render the article table with a detail pane for the selection.
    pub fn render(frame: &mut Frame, area: Rect, dashboard: &DashboardState) {
        let articles = dashboard.articles();
        let total = dashboard.data().map_or(0, |d| d.news.total);

        let block = Block::default()
            .title(format!(" Noticias ({} de {}) ", articles.len(), total))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if articles.is_empty() {
            let empty = Paragraph::new(EMPTY_NEWS_MESSAGE)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4)])
            .split(area);

        let header_cells = ["Fecha", "Fuente", "Sentimiento", "Conf.", "Título"]
            .iter()
            .map(|h| {
                Cell::from(*h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = articles.iter().map(|article| {
            let sentiment = article
                .sentiment
                .map_or("Pendiente", |s| s.label());
            let confidence = article
                .confidence_percent()
                .map(|c| format!("{c}%"))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(article.display_time().format("%d/%m %H:%M").to_string()),
                Cell::from(truncate(&article.source, 18)),
                Cell::from(sentiment).style(Style::default().fg(sentiment_color(article.sentiment))),
                Cell::from(confidence),
                Cell::from(article.title.as_str()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(18),
                Constraint::Length(12),
                Constraint::Length(6),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(dashboard.selected_article);
        frame.render_stateful_widget(table, chunks[0], &mut state);

        if let Some(article) = dashboard.selected() {
            render_detail(frame, chunks[1], article);
        }
    }
}

fn render_detail(frame: &mut Frame, area: Rect, article: &Article) {
    let lines = vec![
        Line::from(Span::styled(
            article.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{} · ", article.commodity), Style::default().fg(Color::Gray)),
            Span::styled(article.url.as_str(), Style::default().fg(Color::Blue)),
        ]),
    ];

    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(detail, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DashboardData, NewsList as NewsPayload, SentimentClass};
    use crate::ui::test_utils::render_to_string;
    use chrono::Utc;

    fn ready(articles: Vec<Article>) -> DashboardState {
        let mut dashboard = DashboardState::default();
        let seq = dashboard.begin_load();
        dashboard.complete_load(
            seq,
            Ok(DashboardData {
                news: NewsPayload {
                    total: articles.len(),
                    articles,
                },
                ..Default::default()
            }),
            Utc::now(),
        );
        dashboard
    }

    #[test]
    fn test_empty_list_renders_empty_state_message() {
        let dashboard = ready(Vec::new());
        let text = render_to_string(120, 10, |f| NewsList::render(f, f.area(), &dashboard));
        assert!(text.contains("No hay noticias disponibles"));
        assert!(!text.contains("Sentimiento"));
    }

    #[test]
    fn test_rows_show_sentiment_and_confidence() {
        let now = Utc::now();
        let article = Article {
            id: uuid::Uuid::new_v4(),
            title: "Suben los precios de la soja en Chicago".to_string(),
            source: "Infocampo".to_string(),
            url: "https://example.com/soja".to_string(),
            published_at: Some(now),
            sentiment: Some(SentimentClass::Alcista),
            confidence: Some(0.87),
            commodity: "SOJA".to_string(),
            created_at: now,
            updated_at: now,
        };
        let dashboard = ready(vec![article]);
        let text = render_to_string(120, 12, |f| NewsList::render(f, f.area(), &dashboard));
        assert!(text.contains("Alcista"));
        assert!(text.contains("87%"));
        assert!(text.contains("Infocampo"));
        assert!(text.contains("https://example.com/soja"));
    }
}
