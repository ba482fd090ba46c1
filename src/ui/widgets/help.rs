//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navegación",
        &[
            ("j/↓", "Bajar"),
            ("k/↑", "Subir"),
            ("Inicio", "Ir al principio"),
            ("Fin", "Ir al final"),
            ("Tab", "Siguiente vista"),
            ("1-4", "Resumen / Noticias / Tendencias / Mercado"),
        ],
    ),
    (
        "Análisis",
        &[
            ("r", "Recargar datos"),
            ("u", "Actualizar análisis (re-scrapear fuentes)"),
            ("p", "Cambiar período del historial (Mercado)"),
        ],
    ),
    (
        "Filtros",
        &[
            ("f", "Abrir panel de filtros"),
            ("x", "Limpiar filtros"),
            ("Tab/↑↓", "Cambiar campo (en el panel)"),
            ("←/→", "Cambiar valor o fuente resaltada"),
            ("Espacio", "Marcar fuente"),
            ("Enter", "Aplicar"),
            ("Esc", "Cancelar"),
        ],
    ),
    ("General", &[("?", "Mostrar/ocultar ayuda"), ("q", "Salir")]),
];

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut help_text = Vec::new();
        for (i, (title, keys)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(Span::styled(
                *title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            for (key, description) in keys.iter() {
                help_text.push(Line::from(vec![
                    Span::styled(format!("  {key:<9}"), Style::default().fg(Color::Cyan)),
                    Span::raw(*description),
                ]));
            }
        }

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Ayuda ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}
