use chrono::NaiveDateTime;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use ccmon_core::health::HealthSnapshot;
use ccmon_core::usage::{LifecycleState, Remaining};

/// Current ccusage session panel
pub struct SessionPanel;

impl SessionPanel {
    /// Render the session panel
    pub fn render(frame: &mut Frame, area: Rect, snapshot: &HealthSnapshot) {
        let state = snapshot.session_state;
        let block = Block::default()
            .title(" Session ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(state_color(state)));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let session = &snapshot.session;
        if state == LifecycleState::Pending {
            let line = Line::from(Span::styled(
                " No session yet",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(Paragraph::new(vec![line]), inner);
            return;
        }

        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::White);

        let window = match (session.start, session.end) {
            (Some(start), Some(end)) => window_text(start, end),
            _ => "--".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(" Started   ", label),
                Span::styled(session.raw_start_text.clone(), value),
            ]),
            Line::from(vec![
                Span::styled(" Window    ", label),
                Span::styled(window, value),
            ]),
            Line::from(vec![
                Span::styled(" Remaining ", label),
                Span::styled(
                    session.remaining.display(),
                    Style::default()
                        .fg(remaining_color(&session.remaining))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Tokens    ", label),
                Span::styled(
                    session
                        .tokens
                        .map(format_tokens)
                        .unwrap_or_else(|| "--".to_string()),
                    value,
                ),
            ]),
            Line::from(vec![
                Span::styled(" Cost      ", label),
                Span::styled(
                    session
                        .cost
                        .map(|c| format!("${:.2}", c))
                        .unwrap_or_else(|| "--".to_string()),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(vec![
                Span::styled(" State     ", label),
                Span::styled(state.label(), Style::default().fg(state_color(state))),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// "11:52:17 → 16:52:17 (reset)"
fn window_text(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{} → {} (reset)",
        start.format("%H:%M:%S"),
        end.format("%H:%M:%S")
    )
}

/// Thousands-separated token count
fn format_tokens(tokens: u64) -> String {
    let digits = tokens.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn state_color(state: LifecycleState) -> Color {
    match state {
        LifecycleState::Active => Color::Green,
        LifecycleState::Completed => Color::Blue,
        LifecycleState::Pending | LifecycleState::Unknown => Color::Gray,
    }
}

fn remaining_color(remaining: &Remaining) -> Color {
    match remaining {
        Remaining::Left { hours: 0, minutes } if *minutes < 30 => Color::Red,
        Remaining::Left { hours: 0, .. } => Color::Yellow,
        Remaining::Left { .. } => Color::Green,
        Remaining::Expired => Color::Red,
        Remaining::Completed | Remaining::Unknown => Color::DarkGray,
    }
}
