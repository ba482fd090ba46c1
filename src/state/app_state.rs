//! Application-level state.

use super::Notification;

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Stat cards, divergence alerts and the daily summary.
    #[default]
    Overview,
    News,
    Trends,
    Market,
}

impl View {
    pub const ALL: [View; 4] = [Self::Overview, Self::News, Self::Trends, Self::Market];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Resumen",
            Self::News => "Noticias",
            Self::Trends => "Tendencias",
            Self::Market => "Mercado",
        }
    }

    /// Next view in tab order.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Whether the view shows data from the primary load cycle.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::Market)
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The filter panel has focus.
    Filter,
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl AppState {
    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        self.input_mode == InputMode::Filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_tab_order_wraps() {
        assert_eq!(View::Overview.next(), View::News);
        assert_eq!(View::Market.next(), View::Overview);
        assert!(!View::Market.is_primary());
        assert!(View::Trends.is_primary());
    }
}
