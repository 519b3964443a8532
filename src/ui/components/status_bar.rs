use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::state::AppState;

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let snapshot = &state.snapshot;
        let mut spans = vec![Span::styled(
            format!(" {} ccmon ", state.spinner_char()),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        )];

        if !snapshot.usage_enabled {
            spans.push(Span::styled(
                " NET ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let updated = match state.last_update {
            Some(at) => format!(" Updated {} ", at.format("%H:%M:%S")),
            None => " Waiting for first poll ".to_string(),
        };
        spans.push(Span::styled(updated, Style::default().fg(Color::Gray)));

        if snapshot.tool_failures > 0 {
            spans.push(Span::styled(
                format!("ccusage failures: {} ", snapshot.tool_failures),
                Style::default().fg(Color::Yellow),
            ));
        }

        // Key hints
        let hints = vec![
            Span::styled(
                " q",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(":Quit ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "h",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(":History ", Style::default().fg(Color::DarkGray)),
        ];

        if let Some(error) = state.visible_error() {
            let used: usize = spans
                .iter()
                .chain(hints.iter())
                .map(|s| s.content.width())
                .sum();
            let available = (area.width as usize).saturating_sub(used + 1);
            if available > 3 {
                spans.push(Span::styled(
                    truncate_to_width(error, available),
                    Style::default().fg(Color::Red),
                ));
            }
        }

        spans.extend(hints);
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Truncate a string to fit within a given display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if current_width + char_width > max_width {
            break;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("ccusage timed out", 7), "ccusage");
        assert_eq!(truncate_to_width("short", 10), "short");
        // Wide characters count double
        assert_eq!(truncate_to_width("接続エラー", 5), "接続");
    }
}
