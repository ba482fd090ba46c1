//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{LoadPhase, Store};

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let phase = match store.dashboard.phase() {
            LoadPhase::Idle => Span::styled("○ Sin datos", Style::default().fg(Color::Gray)),
            LoadPhase::Loading => Span::styled(
                "◌ Cargando...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            LoadPhase::Ready => Span::styled("● Listo", Style::default().fg(Color::Green)),
            LoadPhase::Error(_) => Span::styled("✗ Error", Style::default().fg(Color::Red)),
        };

        let mut left = vec![
            Span::styled(
                " 🌾 Agromate ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            phase,
        ];

        if store.dashboard.is_updating() {
            let pending = store.dashboard.pending_updates();
            let text = if pending > 1 {
                format!(" | ⟳ Actualizando análisis ({pending})")
            } else {
                " | ⟳ Actualizando análisis".to_string()
            };
            left.push(Span::styled(text, Style::default().fg(Color::Magenta)));
        }

        if let Some(status) = &store.pipeline_status {
            left.push(Span::raw(" | "));
            left.push(Span::styled(
                status.freshness(chrono::Utc::now()).to_string(),
                Style::default().fg(Color::Gray),
            ));
        }

        let active = store.filters.active_count();
        if active > 0 {
            left.push(Span::raw(" | "));
            left.push(Span::styled(
                format!("Filtros activos: {active}"),
                Style::default().fg(Color::Yellow),
            ));
        }

        let help_hint = Span::styled(" ? ayuda ", Style::default().fg(Color::Gray));

        // Right-align the help hint
        let left_width: usize = left.iter().map(Span::width).sum();
        let padding = (area.width as usize).saturating_sub(left_width + help_hint.width());
        left.push(Span::raw(" ".repeat(padding)));
        left.push(help_hint);

        let paragraph = Paragraph::new(Line::from(left)).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }
}
