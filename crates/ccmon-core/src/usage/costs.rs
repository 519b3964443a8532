//! Per-day cost aggregation from the ccusage `daily` and `blocks` reports.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::blocks::{
    classify, BlockRowKind, BLOCKS_MIN_CELLS, COL_COST, COL_SESSION, COL_STATUS, COL_TOKENS,
};
use super::table::{decode_rows, non_placeholder, parse_cost, DecodedRow};
use super::types::CostSummary;

/// Minimum split cells for a daily row
pub const DAILY_MIN_CELLS: usize = 9;

const DAILY_COL_DATE: usize = 1;
const DAILY_COL_COST: usize = 8;

/// `2025-06-21`
static DAY_ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-(\d{2}-\d{2})").unwrap());
/// `2025 06-21` (year and month-day split by the cell wrap)
static DAY_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\s+(\d{2}-\d{2})").unwrap());
/// `06-21`
static DAY_SHORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2}-\d{2})").unwrap());

/// `6/21/2025`
static BLOCK_DAY_US_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+/\d+/\d{4})").unwrap());
/// `2025/6/21`
static BLOCK_DAY_ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}/\d+/\d+)").unwrap());

/// A way of turning report text into per-day costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostStrategy {
    /// One row per day from the `daily` report; repeated days overwrite
    DailyTable,
    /// Derived from `blocks` rows; blocks on the same day accumulate
    BlocksFallback,
}

/// Strategies in the order they are attempted
pub const STRATEGIES: [CostStrategy; 2] = [CostStrategy::DailyTable, CostStrategy::BlocksFallback];

/// Report texts available to the aggregator in one cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportTexts<'a> {
    /// Output of `ccusage daily`
    pub daily: Option<&'a str>,
    /// Output of `ccusage blocks`
    pub blocks: Option<&'a str>,
}

impl CostStrategy {
    /// Run this strategy over whichever report it reads
    pub fn aggregate(&self, reports: ReportTexts<'_>) -> CostSummary {
        match self {
            CostStrategy::DailyTable => reports.daily.map(parse_daily_table).unwrap_or_default(),
            CostStrategy::BlocksFallback => {
                reports.blocks.map(parse_blocks_costs).unwrap_or_default()
            }
        }
    }
}

/// Try each strategy in order; the first with any day entries wins.
///
/// Results are never merged between strategies.
pub fn aggregate_costs(reports: ReportTexts<'_>) -> Option<CostSummary> {
    STRATEGIES.iter().find_map(|strategy| {
        let summary = strategy.aggregate(reports);
        if summary.is_empty() {
            debug!(?strategy, "Costs: strategy produced no entries");
            None
        } else {
            debug!(?strategy, days = summary.days.len(), "Costs: strategy matched");
            Some(summary)
        }
    })
}

/// Parse the `daily` report. A day key seen twice keeps the last cost.
pub fn parse_daily_table(text: &str) -> CostSummary {
    let mut summary = CostSummary::default();

    for row in decode_rows(text).filter(is_daily_data_row) {
        let Some(day) = daily_day_key(row.cell(DAILY_COL_DATE)) else {
            continue;
        };
        let Some(cost) = parse_cost(row.cell(DAILY_COL_COST)) else {
            continue;
        };
        summary.days.insert(day, cost);
    }

    summary.session_count = summary.days.len();
    summary
}

/// Re-derive per-day costs from `blocks` rows. Blocks on one day sum.
pub fn parse_blocks_costs(text: &str) -> CostSummary {
    let mut summary = CostSummary::default();

    for row in decode_rows(text) {
        if !row.is_table_line() || row.len() < BLOCKS_MIN_CELLS {
            continue;
        }
        let kind = classify(&row);
        if matches!(
            kind,
            BlockRowKind::Gap | BlockRowKind::Projected | BlockRowKind::Header
        ) {
            continue;
        }
        // Wrapped models column
        if non_placeholder(row.cell(COL_SESSION)).is_none()
            && non_placeholder(row.cell(COL_TOKENS)).is_none()
        {
            continue;
        }

        if row.cell(COL_STATUS).contains("ACTIVE") {
            summary.active_session_count += 1;
        }
        summary.session_count += 1;

        let Some(day) = block_day_key(row.cell(COL_SESSION)) else {
            continue;
        };
        let Some(cost) = parse_cost(row.cell(COL_COST)) else {
            continue;
        };
        *summary.days.entry(day).or_insert(0.0) += cost;
    }

    summary
}

fn is_daily_data_row(row: &DecodedRow) -> bool {
    row.is_table_line()
        && row.len() >= DAILY_MIN_CELLS
        && !["Date", "Total", "─", "═"]
            .iter()
            .any(|marker| row.contains(marker))
}

/// Day key from a `daily` date cell, `MM-DD`
fn daily_day_key(cell: &str) -> Option<String> {
    let cell = non_placeholder(cell)?;
    [&*DAY_ISO_RE, &*DAY_SPLIT_RE, &*DAY_SHORT_RE]
        .iter()
        .find_map(|re| re.captures(cell))
        .map(|caps| caps[1].to_string())
}

/// Day key from a `blocks` start cell, converted to the canonical `MM-DD`
fn block_day_key(cell: &str) -> Option<String> {
    if let Some(caps) = BLOCK_DAY_US_RE.captures(cell) {
        if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%m/%d/%Y") {
            return Some(date.format("%m-%d").to_string());
        }
    }
    let caps = BLOCK_DAY_ISO_RE.captures(cell)?;
    NaiveDate::parse_from_str(&caps[1], "%Y/%m/%d")
        .ok()
        .map(|date| date.format("%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DAILY_REPORT: &str = "\
┌────────────┬──────────────┬────────┬─────────┬────────────┬────────────┬─────────────┬────────────┐
│ Date       │ Models       │  Input │  Output │ Cache      │ Cache Read │       Total │ Cost (USD) │
│            │              │        │         │ Create     │            │      Tokens │            │
├────────────┼──────────────┼────────┼─────────┼────────────┼────────────┼─────────────┼────────────┤
│ 2025       │ - opus-4     │  9,760 │ 170,645 │ 11,697,588 │ 153,763,… │ 165,641,8… │    $460.77 │
│ 06-19      │              │        │         │            │            │             │            │
│ 2025-06-20 │ - sonnet-4   │  1,000 │   2,000 │      3,000 │      4,000 │      10,000 │      $2.50 │
│ 2025 06-21 │ - opus-4     │    100 │     200 │        300 │        400 │       1,000 │     $10.00 │
│ 2025 06-21 │ - opus-4     │    100 │     200 │        300 │        400 │       1,000 │      $5.00 │
├────────────┼──────────────┼────────┼─────────┼────────────┼────────────┼─────────────┼────────────┤
│ Total      │              │ 11,200 │ 172,045 │ 11,700,888 │ 153,771,… │ 165,652,8… │    $478.27 │
└────────────┴──────────────┴────────┴─────────┴────────────┴────────────┴─────────────┴────────────┘
";

    const BLOCKS_REPORT: &str = "\
│ Block Start              │ Duration/Status      │ Models    │ Tokens   │ Cost    │
│ 6/21/2025, 5:00:00 AM    │ 4h 12m               │ - opus-4  │ 98,765   │ $10.00  │
│ (1h 40m gap)             │ gap                  │ -         │ -        │ -       │
│ 6/21/2025, 11:52:17 AM   │ ACTIVE               │ - opus-4  │ 1,234    │ $5.00   │
│ (assuming 5h block)      │ PROJECTED            │           │ 9,000    │ $80.00  │
│ 2025/6/20 09:00:00       │ 3h 01m               │ - opus-4  │ 50,000   │ $2.25   │
";

    #[test]
    fn test_daily_table_overwrites_repeated_day() {
        let summary = parse_daily_table(DAILY_REPORT);
        assert_eq!(summary.days.get("06-21"), Some(&5.0));
        assert_eq!(summary.days.get("06-20"), Some(&2.5));
        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.active_session_count, 0);
    }

    #[test]
    fn test_daily_table_skips_total_and_header() {
        let text = "\
│ Date       │ Models     │ Input │ Output │ Cache │ Read │ Total │ Cost (USD) │
│ 2025-06-20 │ - sonnet-4 │ 1,000 │  2,000 │     0 │    0 │ 3,000 │      $2.50 │
│ Total      │            │ 1,000 │  2,000 │     0 │    0 │ 3,000 │      $2.50 │
";
        let summary = parse_daily_table(text);
        assert_eq!(summary.days.len(), 1);
        assert_eq!(summary.days.get("06-20"), Some(&2.5));
        assert!(!summary.days.contains_key("Total"));
    }

    #[test]
    fn test_daily_table_drops_wrapped_date_row() {
        let summary = parse_daily_table(DAILY_REPORT);
        assert_eq!(summary.days.get("06-19"), None);
        assert!(summary.days.values().all(|cost| *cost < 100.0));
    }

    #[test]
    fn test_blocks_fallback_accumulates_same_day() {
        let summary = parse_blocks_costs(BLOCKS_REPORT);
        assert_eq!(summary.days.get("06-21"), Some(&15.0));
        assert_eq!(summary.days.get("06-20"), Some(&2.25));
        assert_eq!(summary.session_count, 3);
        assert_eq!(summary.active_session_count, 1);
    }

    #[test]
    fn test_blocks_fallback_ignores_wrapped_model_lines() {
        let text = "\
│ 6/21/2025, 5:00:00 AM │ 4h 12m │ - opus-4   │ 98,765 │ $10.00 │
│                       │        │ - sonnet-4 │        │        │
│                       │        │ - haiku    │        │        │
";
        let summary = parse_blocks_costs(text);
        assert_eq!(summary.session_count, 1);
        assert_eq!(summary.days.get("06-21"), Some(&10.0));
        assert_eq!(summary.days.len(), 1);
    }

    #[test]
    fn test_primary_strategy_wins_without_merge() {
        let summary = aggregate_costs(ReportTexts {
            daily: Some(DAILY_REPORT),
            blocks: Some(BLOCKS_REPORT),
        })
        .unwrap();
        assert_eq!(summary.days.get("06-21"), Some(&5.0));
        assert_eq!(summary.active_session_count, 0);
        assert_eq!(summary.total(), 7.5);
    }

    #[test]
    fn test_fallback_used_when_daily_is_empty() {
        let summary = aggregate_costs(ReportTexts {
            daily: Some("No usage data found.\n"),
            blocks: Some(BLOCKS_REPORT),
        })
        .unwrap();
        assert_eq!(summary.days.get("06-21"), Some(&15.0));
        assert_eq!(summary.total(), 17.25);
    }

    #[test]
    fn test_no_strategy_matches() {
        assert_eq!(aggregate_costs(ReportTexts::default()), None);
        assert_eq!(
            aggregate_costs(ReportTexts {
                daily: Some(""),
                blocks: Some("│ too │ short │\n"),
            }),
            None
        );
    }

    #[test]
    fn test_unparsable_rows_are_not_zero_filled() {
        let text = "│ 2025-06-22 │ - opus-4 │ 1 │ 2 │ 3 │ 4 │ 10 │ - │\n";
        let summary = parse_daily_table(text);
        assert!(summary.days.is_empty());
    }

    #[test]
    fn test_day_keys() {
        assert_eq!(daily_day_key("2025-06-21").as_deref(), Some("06-21"));
        assert_eq!(daily_day_key("2025 06-21").as_deref(), Some("06-21"));
        assert_eq!(daily_day_key("06-21").as_deref(), Some("06-21"));
        assert_eq!(daily_day_key("2025"), None);
        assert_eq!(block_day_key("6/1/2025, 9:00:00 AM").as_deref(), Some("06-01"));
        assert_eq!(block_day_key("2025/12/3 09:00:00").as_deref(), Some("12-03"));
        assert_eq!(block_day_key("13/45/2025"), None);
    }
}
