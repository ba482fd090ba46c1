//! Aggregate sentiment cards.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::sentiment_color;
use crate::state::{SentimentClass, SentimentStats};

/// Total plus one card per sentiment class.
pub struct StatsCards;

impl StatsCards {
    pub fn render(frame: &mut Frame, area: Rect, stats: &SentimentStats) {
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        let mut total_lines = vec![Line::from(Span::styled(
            stats.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if stats.unanalyzed > 0 {
            total_lines.push(Line::from(Span::styled(
                format!("{} sin analizar", stats.unanalyzed),
                Style::default().fg(Color::DarkGray),
            )));
        }
        render_card(frame, cards[0], "Total", Color::Cyan, total_lines);

        for (card, class) in cards.iter().skip(1).zip(SentimentClass::ALL) {
            let color = sentiment_color(Some(class));
            let lines = vec![
                Line::from(Span::styled(
                    format!("{:.1}%", stats.percentage(class)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} noticias", stats.count(class)),
                    Style::default().fg(Color::Gray),
                )),
            ];
            render_card(frame, *card, class.label(), color, lines);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, color: Color, lines: Vec<Line>) {
    let card = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_utils::render_to_string;

    #[test]
    fn test_cards_show_derived_percentages() {
        let stats = SentimentStats::from_counts(10, 3, 2, 5, 0);
        let text = render_to_string(80, 4, |f| StatsCards::render(f, f.area(), &stats));
        assert!(text.contains("30.0%"));
        assert!(text.contains("20.0%"));
        assert!(text.contains("50.0%"));
        assert!(!text.contains("sin analizar"));
    }
}
