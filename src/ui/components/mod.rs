mod cost_chart;
mod network_panel;
mod session_panel;
mod status_bar;

pub use cost_chart::CostChart;
pub use network_panel::NetworkPanel;
pub use session_panel::SessionPanel;
pub use status_bar::StatusBar;
