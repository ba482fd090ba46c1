//! Main application module.
//!
//! `App` owns the terminal and the [`Store`] and runs the event loop. Actions
//! that need the backend are handed to the [`Orchestrator`], whose tasks
//! report back through the same action channel.

use crate::api::ApiClient;
use crate::config::Config;
use crate::dashboard::{self, Orchestrator};
use crate::error::Result;
use crate::events::{EventHandler, KeyMap};
use crate::state::{Action, Store};
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Runs backend operations.
    orchestrator: Orchestrator,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub fn new(config: Config) -> Result<Self> {
        // Fail before touching the terminal if the backend URL is unusable
        let api_client = ApiClient::new(config.api.clone())?;
        info!(base_url = api_client.base_url(), "using backend");

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.ui.mouse_support {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        } else {
            execute!(stdout, EnterAlternateScreen)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut store = Store::new(action_tx.clone());
        store.market.history_days = config.dashboard.history_days;
        let orchestrator =
            Orchestrator::new(Arc::new(api_client), action_tx, config.dashboard.clone());

        let keymap = KeyMap::new(config.keybindings.clone(), config.ui.mouse_support);
        let event_handler = EventHandler::new(keymap, config.ui.tick_rate());

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_rx,
            orchestrator,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        // Primary load plus the panels that live outside it
        self.store.dispatch(Action::Reload)?;
        self.store.dispatch(Action::LoadSources)?;
        self.orchestrator.spawn_divergences();
        self.orchestrator.spawn_summary();
        self.orchestrator.spawn_history(self.store.market.history_days);
        self.orchestrator.spawn_correlation();
        self.orchestrator.start_polling();
        if !self.orchestrator.is_polling() {
            self.store.dispatch(Action::RefreshMarket)?;
        }

        let show_status_bar = self.config.ui.show_status_bar;

        loop {
            self.event_handler.update_store_snapshot(&self.store);

            self.terminal.draw(|frame| {
                Ui::render(frame, &self.store, show_status_bar);
            })?;

            tokio::select! {
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action);
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }
            }

            if self.store.app.should_quit {
                break;
            }
        }

        self.orchestrator.stop_polling();
        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        dashboard::handle_action(&mut self.store, &self.orchestrator, action);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
