//! Event handler for processing input events.

use super::InputEvent;
use crate::config::KeyBindings;
use crate::error::{Error, Result};
use crate::state::{Action, FilterField, InputMode, LoadPhase, Store, View};
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreSnapshot {
    pub input_mode: InputMode,
    pub current_view: View,
    pub show_help: bool,
    pub filter_focus: FilterField,
    pub load_failed: bool,
}

impl StoreSnapshot {
    pub fn from_store(store: &Store) -> Self {
        Self {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            filter_focus: store.filter_panel.focus,
            load_failed: matches!(store.dashboard.phase(), LoadPhase::Error(_)),
        }
    }
}

/// Maps key and mouse input to actions for a given store snapshot.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keybindings: KeyBindings,
    mouse_support: bool,
}

impl KeyMap {
    pub fn new(keybindings: KeyBindings, mouse_support: bool) -> Self {
        Self {
            keybindings,
            mouse_support,
        }
    }

    pub(crate) fn map_event(
        &self,
        event: CrosstermEvent,
        snapshot: &StoreSnapshot,
    ) -> Option<Action> {
        match event {
            CrosstermEvent::Key(key) => self.map_key(key, snapshot),
            CrosstermEvent::Mouse(mouse) if self.mouse_support => self.map_mouse(mouse),
            // Terminal will automatically redraw
            _ => None,
        }
    }

    pub(crate) fn map_key(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match snapshot.input_mode {
            InputMode::Normal => self.map_normal(key, snapshot),
            InputMode::Filter => self.map_filter(key, snapshot),
        }
    }

    fn map_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    fn map_normal(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let input = InputEvent::from(key);
        let kb = &self.keybindings;

        if input.matches(&kb.quit) || input.matches("Ctrl+c") {
            return Some(Action::Quit);
        }

        if snapshot.show_help {
            return (input.matches(&kb.help) || key.code == KeyCode::Esc)
                .then_some(Action::ToggleHelp);
        }

        if input.matches(&kb.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches(&kb.refresh) || (snapshot.load_failed && key.code == KeyCode::Enter) {
            return Some(Action::Reload);
        }
        if input.matches(&kb.update_analysis) {
            return Some(Action::TriggerUpdate);
        }
        if input.matches(&kb.filters) {
            return Some(Action::OpenFilters);
        }
        if input.matches(&kb.clear_filters) {
            return Some(Action::ClearFilters);
        }

        // View switching
        let views = [
            (&kb.overview, View::Overview),
            (&kb.news, View::News),
            (&kb.trends, View::Trends),
            (&kb.market, View::Market),
        ];
        if let Some((_, view)) = views.iter().find(|(binding, _)| input.matches(binding)) {
            return Some(Action::SetView(*view));
        }
        if key.code == KeyCode::Tab {
            return Some(Action::NextView);
        }

        if snapshot.current_view == View::Market && input.matches(&kb.history_period) {
            return Some(Action::CycleHistoryPeriod);
        }

        // Navigation
        if input.matches(&kb.up) || key.code == KeyCode::Up {
            return Some(Action::ScrollUp);
        }
        if input.matches(&kb.down) || key.code == KeyCode::Down {
            return Some(Action::ScrollDown);
        }

        match key.code {
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Home => Some(Action::GoToTop),
            KeyCode::End => Some(Action::GoToBottom),
            KeyCode::Esc => Some(Action::DismissNotification),
            _ => None,
        }
    }

    fn map_filter(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let input = InputEvent::from(key);

        match key.code {
            KeyCode::Esc => return Some(Action::CloseFilters),
            KeyCode::Enter => return Some(Action::ApplyFilters),
            KeyCode::Tab | KeyCode::Down => return Some(Action::FilterFocusNext),
            KeyCode::BackTab | KeyCode::Up => return Some(Action::FilterFocusPrev),
            KeyCode::Left => return Some(Action::FilterCycle(false)),
            KeyCode::Right => return Some(Action::FilterCycle(true)),
            KeyCode::Backspace => return Some(Action::FilterBackspace),
            _ => {}
        }

        let c = input.text_char()?;
        if snapshot.filter_focus.is_text() {
            Some(Action::FilterInput(c))
        } else if c == ' ' {
            Some(Action::FilterToggle)
        } else {
            None
        }
    }
}

/// Handles terminal input and produces actions.
pub struct EventHandler {
    keymap: KeyMap,
    events: EventStream,
    tick: Interval,
    store_snapshot: StoreSnapshot,
}

impl EventHandler {
    /// Create a handler emitting [`Action::Tick`] every `tick_rate`.
    pub fn new(keymap: KeyMap, tick_rate: Duration) -> Self {
        let mut tick = tokio::time::interval(tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            keymap,
            events: EventStream::new(),
            tick,
            store_snapshot: StoreSnapshot::default(),
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = StoreSnapshot::from_store(store);
    }

    /// Get the next action from user input or the tick timer.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        tokio::select! {
            _ = self.tick.tick() => Ok(Some(Action::Tick)),
            event = self.events.next() => match event {
                Some(Ok(event)) => Ok(self.keymap.map_event(event, &self.store_snapshot)),
                Some(Err(e)) => Err(Error::Io(e)),
                None => Err(Error::terminal("terminal input stream closed")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn keymap() -> KeyMap {
        KeyMap::new(KeyBindings::default(), true)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn normal() -> StoreSnapshot {
        StoreSnapshot::default()
    }

    fn filtering(focus: FilterField) -> StoreSnapshot {
        StoreSnapshot {
            input_mode: InputMode::Filter,
            filter_focus: focus,
            ..Default::default()
        }
    }

    #[test]
    fn test_normal_mode_shortcuts() {
        let km = keymap();
        let snap = normal();
        assert!(matches!(km.map_key(press(KeyCode::Char('q')), &snap), Some(Action::Quit)));
        assert!(matches!(km.map_key(press(KeyCode::Char('r')), &snap), Some(Action::Reload)));
        assert!(matches!(
            km.map_key(press(KeyCode::Char('u')), &snap),
            Some(Action::TriggerUpdate)
        ));
        assert!(matches!(
            km.map_key(press(KeyCode::Char('f')), &snap),
            Some(Action::OpenFilters)
        ));
        assert!(matches!(
            km.map_key(press(KeyCode::Char('3')), &snap),
            Some(Action::SetView(View::Trends))
        ));
        assert!(matches!(km.map_key(press(KeyCode::Tab), &snap), Some(Action::NextView)));
    }

    #[test]
    fn test_enter_retries_only_after_failure() {
        let km = keymap();
        assert!(km.map_key(press(KeyCode::Enter), &normal()).is_none());
        let failed = StoreSnapshot {
            load_failed: true,
            ..Default::default()
        };
        assert!(matches!(km.map_key(press(KeyCode::Enter), &failed), Some(Action::Reload)));
    }

    #[test]
    fn test_history_period_only_in_market_view() {
        let km = keymap();
        assert!(km.map_key(press(KeyCode::Char('p')), &normal()).is_none());
        let market = StoreSnapshot {
            current_view: View::Market,
            ..Default::default()
        };
        assert!(matches!(
            km.map_key(press(KeyCode::Char('p')), &market),
            Some(Action::CycleHistoryPeriod)
        ));
    }

    #[test]
    fn test_help_overlay_swallows_other_keys() {
        let km = keymap();
        let snap = StoreSnapshot {
            show_help: true,
            ..Default::default()
        };
        assert!(km.map_key(press(KeyCode::Char('r')), &snap).is_none());
        assert!(matches!(km.map_key(press(KeyCode::Esc), &snap), Some(Action::ToggleHelp)));
    }

    #[test]
    fn test_filter_mode_types_into_text_fields() {
        let km = keymap();
        let snap = filtering(FilterField::Commodity);
        assert!(matches!(
            km.map_key(press(KeyCode::Char('q')), &snap),
            Some(Action::FilterInput('q'))
        ));
        assert!(matches!(
            km.map_key(press(KeyCode::Enter), &snap),
            Some(Action::ApplyFilters)
        ));
        assert!(matches!(km.map_key(press(KeyCode::Esc), &snap), Some(Action::CloseFilters)));
    }

    #[test]
    fn test_filter_mode_space_toggles_selection_fields() {
        let km = keymap();
        let snap = filtering(FilterField::Source);
        assert!(matches!(
            km.map_key(press(KeyCode::Char(' ')), &snap),
            Some(Action::FilterToggle)
        ));
        assert!(km.map_key(press(KeyCode::Char('a')), &snap).is_none());
        assert!(matches!(
            km.map_key(press(KeyCode::Right), &snap),
            Some(Action::FilterCycle(true))
        ));
    }

    #[test]
    fn test_mouse_scroll_respects_setting() {
        let scroll = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(matches!(
            keymap().map_event(scroll.clone(), &normal()),
            Some(Action::ScrollDown)
        ));
        let no_mouse = KeyMap::new(KeyBindings::default(), false);
        assert!(no_mouse.map_event(scroll, &normal()).is_none());
    }
}
