//! Divergence alerts and the generated daily summary.
//!
//! Both panels are optional: they take no space when there is nothing to
//! show, so a failing backend endpoint simply makes them disappear.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::state::{DailySummary, Divergence, DivergenceKind, Mood};

/// Divergence alert list.
pub struct DivergenceAlerts;

impl DivergenceAlerts {
    /// Rows needed to show `alerts`, or 0 when the panel should be hidden.
    pub fn height(alerts: &[Divergence]) -> u16 {
        if alerts.is_empty() {
            0
        } else {
            alerts.len() as u16 * 2 + 2
        }
    }

    pub fn render(frame: &mut Frame, area: Rect, alerts: &[Divergence]) {
        if alerts.is_empty() {
            return;
        }

        let mut lines = Vec::with_capacity(alerts.len() * 2);
        for alert in alerts {
            let (label, color) = match alert.divergence_type {
                DivergenceKind::BullishDivergence => ("Divergencia alcista", Color::Green),
                DivergenceKind::BearishDivergence => ("Divergencia bajista", Color::Red),
                _ => ("Señal", Color::Gray),
            };
            let strength = "●".repeat(alert.signal_strength.min(3) as usize);

            lines.push(Line::from(vec![
                Span::styled(
                    format!("⚠ {} · {label} ", alert.commodity),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(strength, Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(
                        "  sentimiento {:+.2} · precio {:+.2}% · {} noticias",
                        alert.sentiment_score, alert.price_change_pct, alert.news_count
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            lines.push(Line::from(Span::raw(format!("  {}", alert.description))));
        }

        let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(" Alertas de divergencia ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(panel, area);
    }
}

/// Generated natural-language market summary.
pub struct SummaryPanel;

impl SummaryPanel {
    pub fn render(frame: &mut Frame, area: Rect, summary: Option<&DailySummary>) {
        let Some(summary) = summary else {
            return;
        };

        let mood = summary.mood();
        let mood_color = match mood {
            Mood::Alcista => Color::Green,
            Mood::Bajista => Color::Red,
            Mood::Mixto => Color::Yellow,
        };

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Clima del mercado: "),
                Span::styled(
                    mood.label(),
                    Style::default().fg(mood_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "  ({} noticias, score {:+.2})",
                        summary.stats.total, summary.sentiment_score
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(""),
            Line::from(summary.summary.as_str()),
        ];

        if !summary.top_commodities.is_empty() {
            let mut top: Vec<(&String, &u64)> = summary.top_commodities.iter().collect();
            top.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let top = top
                .iter()
                .take(3)
                .map(|(name, count)| format!("{name} ({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Más mencionados: {top}"),
                Style::default().fg(Color::Gray),
            )));
        }

        let generated = summary
            .generated_at
            .with_timezone(&chrono::Local)
            .format("%d/%m %H:%M");
        let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(format!(" Resumen del día · {generated} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(panel, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SummaryCounts;
    use crate::ui::test_utils::render_to_string;
    use chrono::Utc;

    #[test]
    fn test_hidden_when_empty() {
        assert_eq!(DivergenceAlerts::height(&[]), 0);
        let text = render_to_string(40, 4, |f| SummaryPanel::render(f, f.area(), None));
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_summary_shows_mood_and_top_commodities() {
        let summary = DailySummary {
            summary: "La soja muestra un sesgo positivo.".to_string(),
            sentiment_score: 0.45,
            stats: SummaryCounts {
                alcista: 9,
                bajista: 2,
                neutral: 4,
                total: 15,
            },
            top_commodities: [("SOJA".to_string(), 8), ("MAIZ".to_string(), 4)]
                .into_iter()
                .collect(),
            generated_at: Utc::now(),
        };
        let text = render_to_string(80, 10, |f| SummaryPanel::render(f, f.area(), Some(&summary)));
        assert!(text.contains("Alcista"));
        assert!(text.contains("SOJA (8), MAIZ (4)"));
    }

    #[test]
    fn test_alert_line_names_commodity() {
        let alert = Divergence {
            divergence_type: DivergenceKind::BearishDivergence,
            commodity: "TRIGO".to_string(),
            sentiment_score: -0.5,
            price_change_pct: 3.2,
            signal_strength: 2,
            news_count: 7,
            description: "Noticias bajistas con precio en alza".to_string(),
        };
        let alerts = vec![alert];
        let height = DivergenceAlerts::height(&alerts);
        let text = render_to_string(100, height, |f| DivergenceAlerts::render(f, f.area(), &alerts));
        assert!(text.contains("TRIGO · Divergencia bajista"));
        assert!(text.contains("+3.20%"));
    }
}
