use ratatui::layout::{Constraint, Direction, Rect};

/// Height of the network panel (2 borders + 4 lines)
const NETWORK_HEIGHT: u16 = 6;

/// Height of the session panel (2 borders + 6 lines)
const SESSION_HEIGHT: u16 = 8;

/// Layout configuration for the dashboard
pub struct Layout {
    /// Height for the network panel
    pub network_height: u16,
    /// Height for the session panel
    pub session_height: u16,
}

/// Calculated layout areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAreas {
    /// Network panel, the whole main area in network-only mode
    pub network: Rect,
    /// `None` in network-only mode
    pub session: Option<Rect>,
    /// `None` when hidden or in network-only mode
    pub history: Option<Rect>,
    /// Single-line footer
    pub status_bar: Rect,
}

impl Layout {
    /// Create a new layout with default settings
    pub fn new() -> Self {
        Self {
            network_height: NETWORK_HEIGHT,
            session_height: SESSION_HEIGHT,
        }
    }

    /// Calculate the main areas
    /// Layout: [ Network          ]
    ///         [ Session          ]
    ///         [ Cost history     ]
    ///         [ Status bar       ]
    pub fn calculate(&self, area: Rect, show_usage: bool, show_history: bool) -> LayoutAreas {
        let main_and_status = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Panels
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let main_area = main_and_status[0];
        let status_bar = main_and_status[1];

        if !show_usage {
            return LayoutAreas {
                network: main_area,
                session: None,
                history: None,
                status_bar,
            };
        }

        if show_history {
            let panels = ratatui::layout::Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(self.network_height),
                    Constraint::Length(self.session_height),
                    Constraint::Min(3),
                ])
                .split(main_area);

            LayoutAreas {
                network: panels[0],
                session: Some(panels[1]),
                history: Some(panels[2]),
                status_bar,
            }
        } else {
            let panels = ratatui::layout::Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(self.network_height),
                    Constraint::Min(3),
                ])
                .split(main_area);

            LayoutAreas {
                network: panels[0],
                session: Some(panels[1]),
                history: None,
                status_bar,
            }
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_layout() {
        let layout = Layout::new();
        let areas = layout.calculate(Rect::new(0, 0, 80, 30), true, true);

        assert_eq!(areas.status_bar, Rect::new(0, 29, 80, 1));
        assert_eq!(areas.network, Rect::new(0, 0, 80, 6));
        assert_eq!(areas.session, Some(Rect::new(0, 6, 80, 8)));
        assert_eq!(areas.history, Some(Rect::new(0, 14, 80, 15)));
    }

    #[test]
    fn test_history_hidden() {
        let layout = Layout::new();
        let areas = layout.calculate(Rect::new(0, 0, 80, 30), true, false);

        assert_eq!(areas.history, None);
        assert_eq!(areas.session, Some(Rect::new(0, 6, 80, 23)));
    }

    #[test]
    fn test_network_only() {
        let layout = Layout::new();
        let areas = layout.calculate(Rect::new(0, 0, 80, 20), false, true);

        assert_eq!(areas.network, Rect::new(0, 0, 80, 19));
        assert_eq!(areas.session, None);
        assert_eq!(areas.history, None);
    }
}
