//! Connectivity, ping latency and HTTP speed.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use ccmon_core::health::{HealthSnapshot, LatencyLevel, SpeedRating};

/// Network status panel
pub struct NetworkPanel;

impl NetworkPanel {
    /// Render the network panel
    pub fn render(frame: &mut Frame, area: Rect, snapshot: &HealthSnapshot, has_data: bool) {
        let block = Block::default()
            .title(" Network ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Self::border_color(snapshot, has_data)));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !has_data {
            let line = Line::from(Span::styled(
                " Checking network...",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(Paragraph::new(vec![line]), inner);
            return;
        }

        let label = Style::default().fg(Color::Gray);
        let probe = &snapshot.probe;

        let status = if probe.reachable {
            Span::styled(
                "● Connected",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "✖ Disconnected",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        };

        let mut lines = vec![
            Line::from(vec![Span::styled(" Status   ", label), status]),
            Line::from(vec![
                Span::styled(" Ping     ", label),
                Span::styled(
                    format_ms(probe.latency_ms),
                    Style::default().fg(latency_color(probe.latency_level())),
                ),
            ]),
            Line::from(vec![
                Span::styled(" HTTP     ", label),
                Span::styled(
                    format_ms(probe.http_ms),
                    Style::default().fg(speed_color(probe.speed())),
                ),
                Span::styled(
                    probe
                        .speed()
                        .map(|s| format!(" ({})", s.label()))
                        .unwrap_or_default(),
                    Style::default().fg(speed_color(probe.speed())),
                ),
            ]),
        ];

        if snapshot.network_fail_streak > 0 {
            lines.push(Line::from(vec![
                Span::styled(" Failures ", label),
                Span::styled(
                    format!("{} in a row", snapshot.network_fail_streak),
                    Style::default().fg(Color::Red),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn border_color(snapshot: &HealthSnapshot, has_data: bool) -> Color {
        match (has_data, snapshot.probe.reachable) {
            (false, _) => Color::Gray,
            (true, true) => Color::Green,
            (true, false) => Color::Red,
        }
    }
}

/// "14.2 ms", or "--" when unknown
fn format_ms(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if ms >= 100.0 => format!("{:.0} ms", ms),
        Some(ms) => format!("{:.1} ms", ms),
        None => "--".to_string(),
    }
}

fn latency_color(level: Option<LatencyLevel>) -> Color {
    match level {
        Some(LatencyLevel::Low) => Color::Green,
        Some(LatencyLevel::Medium) => Color::Yellow,
        Some(LatencyLevel::High) => Color::Red,
        None => Color::DarkGray,
    }
}

fn speed_color(rating: Option<SpeedRating>) -> Color {
    match rating {
        Some(SpeedRating::Good) => Color::Green,
        Some(SpeedRating::Fair) => Color::Yellow,
        Some(SpeedRating::Slow) => Color::Red,
        None => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(Some(14.23)), "14.2 ms");
        assert_eq!(format_ms(Some(180.4)), "180 ms");
        assert_eq!(format_ms(None), "--");
    }

    #[test]
    fn test_latency_color() {
        assert_eq!(latency_color(Some(LatencyLevel::from_ms(20.0))), Color::Green);
        assert_eq!(latency_color(Some(LatencyLevel::from_ms(80.0))), Color::Yellow);
        assert_eq!(latency_color(Some(LatencyLevel::from_ms(300.0))), Color::Red);
        assert_eq!(latency_color(None), Color::DarkGray);
    }

    #[test]
    fn test_speed_color() {
        assert_eq!(speed_color(Some(SpeedRating::Good)), Color::Green);
        assert_eq!(speed_color(Some(SpeedRating::Slow)), Color::Red);
    }
}
