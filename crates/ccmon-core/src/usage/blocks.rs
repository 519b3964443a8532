//! Parse the ccusage `blocks` report into the current session.
//!
//! Expected format (colors stripped, models column may wrap):
//! ```text
//! ┌────────────────────────┬────────────────────┬──────────┬────────┬────────┐
//! │ Block Start            │ Duration/Status    │ Models   │ Tokens │ Cost   │
//! ├────────────────────────┼────────────────────┼──────────┼────────┼────────┤
//! │ 6/21/2025, 6:00:00 AM  │ 4h 12m             │ - opus-4 │ 98,765 │ $40.10 │
//! │ (2h gap)               │ gap                │ -        │ -      │ -      │
//! │ 6/21/2025, 11:52:17 AM │ ACTIVE             │ - opus-4 │  1,234 │ $12.34 │
//! │ (assuming 5h block)    │ PROJECTED          │          │  9,000 │ $80.00 │
//! └────────────────────────┴────────────────────┴──────────┴────────┴────────┘
//! ```
//!
//! A start cell cut short with `…` no longer matches either timestamp layout;
//! such rows keep their raw text and report `Remaining::Unknown`.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::table::{decode_rows, non_placeholder, parse_cost, parse_tokens, DecodedRow};
use super::time::{parse_session_start, remaining_at, session_end, Remaining};
use super::types::{LifecycleState, SessionRecord};

/// Minimum split cells for a blocks row
pub const BLOCKS_MIN_CELLS: usize = 6;

pub(crate) const COL_SESSION: usize = 1;
pub(crate) const COL_STATUS: usize = 2;
pub(crate) const COL_TOKENS: usize = 4;
pub(crate) const COL_COST: usize = 5;

/// `6/21/2025, 11:52:17 AM`
static START_US_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+/\d+/\d{4},\s+\d+:\d+:\d+\s+[AP]M)").unwrap());
/// `2025/6/21 11:52:17`
static START_ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}/\d+/\d+\s+\d+:\d+:\d+)").unwrap());

/// Classification of a blocks row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockRowKind {
    /// In-progress session
    Active,
    /// Idle gap between sessions
    Gap,
    /// Projection for the active block
    Projected,
    /// Column header
    Header,
    /// Anything else (finished blocks, borders, continuation lines)
    Other,
}

/// Classify a decoded row by its marker tokens
pub(crate) fn classify(row: &DecodedRow) -> BlockRowKind {
    if row.contains("ACTIVE") || (row.contains("elapsed") && row.contains("remaining")) {
        BlockRowKind::Active
    } else if row.contains("gap") {
        BlockRowKind::Gap
    } else if row.contains("PROJECTED") {
        BlockRowKind::Projected
    } else if row.contains("Block Start") {
        BlockRowKind::Header
    } else {
        BlockRowKind::Other
    }
}

/// Find the session-start substring in a cell, trying both layouts in order
pub(crate) fn find_start_text(cell: &str) -> Option<&str> {
    START_US_RE
        .captures(cell)
        .or_else(|| START_ISO_RE.captures(cell))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the session to display from a `blocks` report.
///
/// The first active row wins. Without one, the most recent finished block
/// with a non-empty token cell is used. Returns `None` when neither exists
/// so the caller can keep showing its previous record.
pub fn extract_session(text: &str, now: NaiveDateTime) -> Option<SessionRecord> {
    let active = decode_rows(text).find(|row| {
        classify(row) == BlockRowKind::Active && row.len() >= BLOCKS_MIN_CELLS
    });
    if let Some(row) = active {
        debug!(status = row.cell(COL_STATUS), "Blocks: found active row");
        return Some(build_record(&row, LifecycleState::Active, now));
    }

    let completed = decode_rows(text).rev().find(|row| {
        row.is_table_line()
            && classify(row) == BlockRowKind::Other
            && row.len() >= BLOCKS_MIN_CELLS
            && non_placeholder(row.cell(COL_TOKENS)).is_some()
    });
    if let Some(row) = completed {
        debug!("Blocks: no active row, using most recent completed block");
        return Some(build_record(&row, LifecycleState::Completed, now));
    }

    debug!("Blocks: no session rows recognized");
    None
}

fn build_record(row: &DecodedRow, state: LifecycleState, now: NaiveDateTime) -> SessionRecord {
    let session_cell = row.cell(COL_SESSION);
    let start_text = find_start_text(session_cell);
    let start = start_text.and_then(parse_session_start);
    let end = start.map(session_end);

    let remaining = match (state, end) {
        (_, None) => Remaining::Unknown,
        (LifecycleState::Active, Some(end)) => remaining_at(end, now),
        (_, Some(_)) => Remaining::Completed,
    };

    SessionRecord {
        raw_start_text: start_text.unwrap_or(session_cell).to_string(),
        start,
        end,
        remaining,
        tokens: parse_tokens(row.cell(COL_TOKENS)),
        cost: parse_cost(row.cell(COL_COST)),
        lifecycle_state: state,
    }
}
