mod store;

pub use store::{AppState, SharedState, SPINNER_FRAMES};
