mod poller;
mod state;

pub use poller::Poller;
pub use state::MonitorState;
