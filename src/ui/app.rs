use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use ccmon_core::config::Settings;
use ccmon_core::health::HealthSnapshot;
use ccmon_core::monitor::Poller;

use crate::state::{AppState, SharedState};

use super::components::{CostChart, NetworkPanel, SessionPanel, StatusBar};
use super::Layout;

/// Main application
pub struct App {
    state: SharedState,
    settings: Settings,
    layout: Layout,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings) -> Self {
        let state = AppState::shared(settings.ui.show_history);

        Self {
            state,
            settings,
            layout: Layout::new(),
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Start poller
        info!(
            interval_ms = self.settings.poll_interval_ms,
            usage = self.settings.usage.enabled,
            "Starting monitor"
        );
        let poller = Poller::with_system(&self.settings);
        let mut snapshot_rx = poller.start();

        // Main loop
        let result = self.main_loop(&mut terminal, &mut snapshot_rx).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        info!("Monitor stopped");
        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        snapshot_rx: &mut watch::Receiver<HealthSnapshot>,
    ) -> Result<()> {
        let tick = Duration::from_millis(self.settings.ui_tick_ms);
        let history_days = self.settings.ui.history_days;

        loop {
            // Check if we should quit
            {
                let state = self.state.read();
                if !state.running {
                    break;
                }
            }

            // Pick up the latest snapshot without waiting for one
            match snapshot_rx.has_changed() {
                Ok(true) => {
                    let snapshot = snapshot_rx.borrow_and_update().clone();
                    self.state.write().update_snapshot(snapshot);
                }
                Ok(false) => {}
                Err(_) => {
                    let mut state = self.state.write();
                    if state.error_message.is_none() {
                        warn!("Poller stopped unexpectedly");
                        state.set_error("Poller stopped".to_string());
                    }
                }
            }

            // Draw UI
            terminal.draw(|frame| {
                let state = self.state.read();
                let snapshot = &state.snapshot;
                let areas = self.layout.calculate(
                    frame.area(),
                    snapshot.usage_enabled,
                    state.show_history,
                );

                NetworkPanel::render(frame, areas.network, snapshot, state.has_data());

                if let Some(session_area) = areas.session {
                    SessionPanel::render(frame, session_area, snapshot);
                }

                if let Some(history_area) = areas.history {
                    CostChart::render(frame, history_area, &snapshot.costs, history_days);
                }

                StatusBar::render(frame, areas.status_bar, &state);
            })?;

            // Tick spinner animation
            {
                let mut state = self.state.write();
                state.tick_spinner();
            }

            // Handle events with timeout
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let mut state = self.state.write();

        match code {
            KeyCode::Char('q') | KeyCode::Esc => state.quit(),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => state.quit(),
            KeyCode::Char('h') => state.toggle_history(),
            _ => {}
        }
    }
}
