pub mod state;
pub mod ui;

pub use ccmon_core::{config, health, monitor, notify, usage};
