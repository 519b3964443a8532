//! Per-day cost history bar chart.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use ccmon_core::usage::{CostHistory, DailyCostEntry};

/// Columns taken by " MM-DD " and " $1234.56"
const FIXED_WIDTH: usize = 7 + 10;

/// Cost history chart widget
pub struct CostChart;

impl CostChart {
    /// Render the most recent `days` entries of `costs`
    pub fn render(frame: &mut Frame, area: Rect, costs: &CostHistory, days: usize) {
        let block = Block::default()
            .title(format!(" Cost history (last {} days) ", days))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Gray));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if costs.is_empty() {
            let line = Line::from(Span::styled(
                " No cost data yet",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(Paragraph::new(vec![line]), inner);
            return;
        }

        let entries = costs.recent(days);
        let max = entries.iter().map(|e| e.cost).fold(0.0_f64, f64::max);
        let bar_width = (inner.width as usize).saturating_sub(FIXED_WIDTH).max(1);

        // Leave the last row for the summary
        let rows = (inner.height as usize).saturating_sub(1);
        let skip = entries.len().saturating_sub(rows);
        let mut lines: Vec<Line> = entries
            .iter()
            .skip(skip)
            .map(|entry| Self::render_entry(entry, max, bar_width))
            .collect();

        lines.push(Self::render_summary(costs));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_entry(entry: &DailyCostEntry, max: f64, bar_width: usize) -> Line<'static> {
        let color = tier_color(entry.cost);
        Line::from(vec![
            Span::styled(
                format!(" {} ", entry.day_key),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(bar(entry.cost, max, bar_width), Style::default().fg(color)),
            Span::styled(
                format!(" ${:.2}", entry.cost),
                Style::default().fg(Color::White),
            ),
        ])
    }

    fn render_summary(costs: &CostHistory) -> Line<'static> {
        let dim = Style::default().fg(Color::DarkGray);
        Line::from(vec![
            Span::styled(" Total ", dim),
            Span::styled(
                format!("${:.2}", costs.total_cost),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Avg ", dim),
            Span::styled(
                format!("${:.2}/day", costs.average_per_day()),
                Style::default().fg(Color::White),
            ),
            Span::styled("  Sessions ", dim),
            Span::styled(
                format!(
                    "{} ({} active)",
                    costs.session_count, costs.active_session_count
                ),
                Style::default().fg(Color::White),
            ),
        ])
    }
}

/// Glyph for a day's cost: heavier blocks for more expensive days
fn tier_glyph(cost: f64) -> char {
    if cost >= 50.0 {
        '█'
    } else if cost >= 30.0 {
        '▓'
    } else if cost >= 10.0 {
        '▒'
    } else if cost > 0.0 {
        '░'
    } else {
        '·'
    }
}

fn tier_color(cost: f64) -> Color {
    if cost >= 50.0 {
        Color::Red
    } else if cost >= 30.0 {
        Color::Yellow
    } else if cost > 0.0 {
        Color::Green
    } else {
        Color::DarkGray
    }
}

/// Bar scaled to `max`; any non-zero cost gets at least one glyph
fn bar(cost: f64, max: f64, width: usize) -> String {
    let glyph = tier_glyph(cost);
    if cost <= 0.0 || max <= 0.0 {
        return glyph.to_string();
    }
    let len = ((cost / max) * width as f64).round() as usize;
    glyph.to_string().repeat(len.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_glyph() {
        assert_eq!(tier_glyph(75.0), '█');
        assert_eq!(tier_glyph(50.0), '█');
        assert_eq!(tier_glyph(30.0), '▓');
        assert_eq!(tier_glyph(12.5), '▒');
        assert_eq!(tier_glyph(0.01), '░');
        assert_eq!(tier_glyph(0.0), '·');
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(60.0, 60.0, 10), "█".repeat(10));
        assert_eq!(bar(15.0, 60.0, 10), "▒".repeat(3));
        // Tiny costs still show up
        assert_eq!(bar(0.5, 60.0, 10), "░");
        assert_eq!(bar(0.0, 60.0, 10), "·");
    }
}
