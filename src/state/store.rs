use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use ccmon_core::health::HealthSnapshot;

/// Shared state type alias
pub type SharedState = Arc<RwLock<AppState>>;

/// Spinner frames for the polling indicator
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Latest snapshot published by the poller
    pub snapshot: HealthSnapshot,
    /// When the UI last received a new snapshot
    pub last_update: Option<DateTime<Local>>,
    /// Whether the app is running
    pub running: bool,
    /// Whether the cost history panel is shown
    pub show_history: bool,
    /// Error raised by the UI itself (poller gone, etc.)
    pub error_message: Option<String>,
    /// Spinner animation frame counter
    pub spinner_frame: usize,
    /// Last spinner update time
    last_spinner_update: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(show_history: bool) -> Self {
        Self {
            snapshot: HealthSnapshot::default(),
            last_update: None,
            running: true,
            show_history,
            error_message: None,
            spinner_frame: 0,
            last_spinner_update: Instant::now(),
        }
    }

    /// Create a shared state
    pub fn shared(show_history: bool) -> SharedState {
        Arc::new(RwLock::new(Self::new(show_history)))
    }

    /// Replace the snapshot with a newer one
    pub fn update_snapshot(&mut self, snapshot: HealthSnapshot) {
        self.last_update = Some(snapshot.taken_at);
        self.snapshot = snapshot;
        self.error_message = None;
    }

    /// Record a UI-side error
    pub fn set_error(&mut self, error: String) {
        self.error_message = Some(error);
    }

    /// Error to show in the status bar; UI errors win over poll errors
    pub fn visible_error(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.snapshot.last_error.as_deref())
    }

    /// Toggle the cost history panel
    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
    }

    /// Whether any snapshot has arrived yet
    pub fn has_data(&self) -> bool {
        self.last_update.is_some()
    }

    /// Advance the spinner animation frame (time-based, ~150ms per frame)
    pub fn tick_spinner(&mut self) {
        let elapsed = self.last_spinner_update.elapsed();
        if elapsed.as_millis() >= 150 {
            self.last_spinner_update = Instant::now();
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get the current spinner character
    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Stop the main loop
    pub fn quit(&mut self) {
        self.running = false;
    }
}
