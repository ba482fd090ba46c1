//! Sentiment trend charts: daily counts, per-source breakdown and the
//! weighted sentiment timeline.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table,
    },
};

use super::{sentiment_color, truncate};
use crate::state::{
    DailyTrend, SentimentClass, SourceDistribution, TimelinePoint, zero_crossing_offset,
};

/// Shown when the timeline has no points for the selected window.
pub const EMPTY_TIMELINE_MESSAGE: &str = "No hay datos de tendencia para este período";

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn render_empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let empty = Paragraph::new(message)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(panel(title));
    frame.render_widget(empty, area);
}

/// Grouped bars of per-day sentiment counts.
pub struct DailyTrendChart;

impl DailyTrendChart {
    pub fn render(frame: &mut Frame, area: Rect, trends: &[DailyTrend]) {
        let title = "Sentimiento por día";
        if trends.is_empty() {
            render_empty(frame, area, title, EMPTY_TIMELINE_MESSAGE);
            return;
        }

        let groups: Vec<BarGroup> = trends
            .iter()
            .map(|day| {
                let bars: Vec<Bar> = SentimentClass::ALL
                    .iter()
                    .map(|class| {
                        let value = match class {
                            SentimentClass::Alcista => day.alcista,
                            SentimentClass::Bajista => day.bajista,
                            SentimentClass::Neutral => day.neutral,
                        };
                        Bar::default()
                            .value(value)
                            .style(Style::default().fg(sentiment_color(Some(*class))))
                    })
                    .collect();
                BarGroup::default()
                    .label(Line::from(day.date.format("%d/%m").to_string()))
                    .bars(&bars)
            })
            .collect();

        let mut chart = BarChart::default()
            .block(panel(title))
            .bar_width(2)
            .bar_gap(0)
            .group_gap(2);
        for group in groups {
            chart = chart.data(group);
        }

        frame.render_widget(chart, area);
    }
}

/// Per-source breakdown table.
pub struct SourceTable;

impl SourceTable {
    pub fn render(frame: &mut Frame, area: Rect, sources: &[SourceDistribution]) {
        let title = "Sentimiento por fuente";
        if sources.is_empty() {
            render_empty(frame, area, title, "Sin datos por fuente");
            return;
        }

        let grand_total: u64 = sources.iter().map(|s| s.total).sum();

        let header = Row::new(["Fuente", "Alc.", "Baj.", "Neu.", "Total", "%"].map(|h| {
            Cell::from(h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .bottom_margin(1);

        let rows = sources.iter().map(|source| {
            Row::new(vec![
                Cell::from(truncate(&source.source, 24)),
                Cell::from(source.alcista.to_string())
                    .style(Style::default().fg(sentiment_color(Some(SentimentClass::Alcista)))),
                Cell::from(source.bajista.to_string())
                    .style(Style::default().fg(sentiment_color(Some(SentimentClass::Bajista)))),
                Cell::from(source.neutral.to_string())
                    .style(Style::default().fg(sentiment_color(Some(SentimentClass::Neutral)))),
                Cell::from(source.total.to_string()),
                Cell::from(format!("{:.1}", source.share_of(grand_total))),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(panel(title));

        frame.render_widget(table, area);
    }
}

/// Weighted sentiment score over time. Plotted cells above zero are drawn
/// in the bullish color and cells below in the bearish one.
pub struct TimelineChart;

impl TimelineChart {
    pub fn render(frame: &mut Frame, area: Rect, points: &[TimelinePoint]) {
        let title = "Evolución del sentimiento";
        let Some(offset) = zero_crossing_offset(points) else {
            render_empty(frame, area, title, EMPTY_TIMELINE_MESSAGE);
            return;
        };

        let data: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.sentiment_score))
            .collect();
        let (min, max) = score_bounds(points);
        let last_x = (points.len().saturating_sub(1)).max(1) as f64;
        let zero_line = [(0.0, 0.0), (last_x, 0.0)];

        let datasets = vec![
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&zero_line),
            Dataset::default()
                .name("Score")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::White))
                .data(&data),
        ];

        let first_label = points.first().map(|p| p.date.format("%d/%m").to_string());
        let last_label = points.last().map(|p| p.date.format("%d/%m").to_string());

        let chart = Chart::new(datasets)
            .block(panel(title))
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, last_x])
                    .labels([
                        Span::raw(first_label.unwrap_or_default()),
                        Span::raw(last_label.unwrap_or_default()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([min, max])
                    .labels([
                        Span::raw(format!("{min:.2}")),
                        Span::raw(format!("{max:.2}")),
                    ]),
            );

        frame.render_widget(chart, area);

        // Plot rows exclude the border and the x-axis line and labels.
        let inner = panel(title).inner(area);
        let plot_height = inner.height.saturating_sub(2);
        let split = split_row(offset, inner.y, plot_height);
        colorize_by_sign(frame.buffer_mut(), inner, split);
    }
}

/// Lowest and highest score, always spanning zero so the zero line is visible.
fn score_bounds(points: &[TimelinePoint]) -> (f64, f64) {
    let (min, max) = points.iter().fold((0.0_f64, 0.0_f64), |(lo, hi), p| {
        (lo.min(p.sentiment_score), hi.max(p.sentiment_score))
    });
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

/// First buffer row that lies below zero, given the zero-crossing offset
/// measured from the top of a plot `height` rows tall starting at `top`.
pub(crate) fn split_row(offset: f64, top: u16, height: u16) -> u16 {
    top + (offset.clamp(0.0, 1.0) * f64::from(height)).round() as u16
}

fn is_plot_cell(symbol: &str) -> bool {
    symbol
        .chars()
        .next()
        .is_some_and(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
}

fn colorize_by_sign(buf: &mut Buffer, area: Rect, split: u16) {
    let above = sentiment_color(Some(SentimentClass::Alcista));
    let below = sentiment_color(Some(SentimentClass::Bajista));

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y))
                && is_plot_cell(cell.symbol())
            {
                cell.set_fg(if y < split { above } else { below });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_utils::render_to_string;
    use chrono::NaiveDate;

    fn series(scores: &[f64]) -> Vec<TimelinePoint> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| TimelinePoint {
                date: start + chrono::Days::new(i as u64),
                sentiment_score: *s,
            })
            .collect()
    }

    #[test]
    fn test_split_row_tracks_offset() {
        assert_eq!(split_row(0.0, 2, 10), 2);
        assert_eq!(split_row(1.0, 2, 10), 12);
        assert_eq!(split_row(0.5, 2, 10), 7);
    }

    #[test]
    fn test_bounds_always_include_zero() {
        assert_eq!(score_bounds(&series(&[0.2, 0.6])), (0.0, 0.6));
        assert_eq!(score_bounds(&series(&[-0.4, 0.3])), (-0.4, 0.3));
        assert_eq!(score_bounds(&series(&[0.0])), (-1.0, 1.0));
    }

    #[test]
    fn test_mixed_series_colors_both_sides() {
        let points = series(&[0.8, -0.6, 0.5, -0.9, 0.7]);
        let backend = ratatui::backend::TestBackend::new(60, 16);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|f| TimelineChart::render(f, f.area(), &points))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let colors: Vec<Color> = buffer
            .content()
            .iter()
            .filter(|c| is_plot_cell(c.symbol()))
            .map(|c| c.fg)
            .collect();
        assert!(colors.contains(&Color::Green));
        assert!(colors.contains(&Color::Red));
    }

    #[test]
    fn test_empty_timeline_message() {
        let text = render_to_string(60, 8, |f| TimelineChart::render(f, f.area(), &[]));
        assert!(text.contains(EMPTY_TIMELINE_MESSAGE));
    }
}
