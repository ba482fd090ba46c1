//! Filter editing popup.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use super::sentiment_color;
use crate::state::{DATE_FORMAT, FilterField, FilterPanelState};

/// Filter panel popup.
pub struct FilterPanel;

impl FilterPanel {
    pub fn render(frame: &mut Frame, area: Rect, panel: &FilterPanelState) {
        let popup_area = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup_area);

        let mut lines = Vec::new();
        for field in FilterField::ALL {
            let focused = panel.focus == field;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if focused { "▶ " } else { "  " };

            let mut spans = vec![Span::styled(
                format!("{marker}{:<12}", field.label()),
                label_style,
            )];
            spans.extend(field_value(panel, field, focused));
            lines.push(Line::from(spans));

            if field == FilterField::Source {
                lines.extend(source_lines(panel, focused));
            }
        }

        lines.push(Line::from(""));
        if let Some(error) = &panel.error {
            lines.push(Line::from(Span::styled(
                format!("⚠ {error}"),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Tab campo · ←/→ valor · Espacio marcar · Enter aplicar · Esc cancelar",
            Style::default().fg(Color::DarkGray),
        )));

        let popup = Paragraph::new(lines).block(
            Block::default()
                .title(" Filtros ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(popup, popup_area);
    }
}

fn field_value(panel: &FilterPanelState, field: FilterField, focused: bool) -> Vec<Span<'static>> {
    let any = || Span::styled("Todas", Style::default().fg(Color::DarkGray));

    match field {
        FilterField::Source => {
            let count = panel.draft.sources().map_or(0, |s| s.len());
            if count == 0 {
                vec![any()]
            } else {
                vec![Span::raw(format!("{count} seleccionada(s)"))]
            }
        }
        FilterField::Sentiment => match panel.draft.sentiment() {
            Some(class) => vec![Span::styled(
                class.label(),
                Style::default().fg(sentiment_color(Some(class))),
            )],
            None => vec![Span::styled("Todos", Style::default().fg(Color::DarkGray))],
        },
        _ if focused => vec![
            Span::styled(
                panel.input_buffer.clone(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            ),
            Span::styled("█", Style::default().fg(Color::Cyan)),
        ],
        FilterField::Commodity => match panel.draft.commodity() {
            Some(commodity) => vec![Span::raw(commodity.to_string())],
            None => vec![any()],
        },
        FilterField::DateFrom | FilterField::DateTo => {
            let date = if field == FilterField::DateFrom {
                panel.draft.date_from()
            } else {
                panel.draft.date_to()
            };
            match date {
                Some(date) => vec![Span::raw(date.format(DATE_FORMAT).to_string())],
                None => vec![Span::styled(
                    "AAAA-MM-DD",
                    Style::default().fg(Color::DarkGray),
                )],
            }
        }
    }
}

fn source_lines(panel: &FilterPanelState, focused: bool) -> Vec<Line<'static>> {
    if panel.available_sources.is_empty() {
        return vec![Line::from(Span::styled(
            "    (sin fuentes disponibles)",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    panel
        .available_sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let checked = if panel.draft.has_source(source) { "[x]" } else { "[ ]" };
            let style = if focused && i == panel.source_cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("    {checked} {source}"), style))
        })
        .collect()
}
