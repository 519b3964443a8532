//! Usage data types derived from ccusage `blocks` / `daily` reports.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::time::{remaining_at, Remaining};

/// Lifecycle of a ccusage session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No session observed yet
    #[default]
    Pending,
    /// Row marked as in progress
    Active,
    /// Finished block (or an active one whose window elapsed)
    Completed,
    /// Classification not possible
    Unknown,
}

impl LifecycleState {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "Idle",
            LifecycleState::Active => "Active",
            LifecycleState::Completed => "Completed",
            LifecycleState::Unknown => "Unknown",
        }
    }
}

/// The session currently shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    /// Start text exactly as matched in the report
    pub raw_start_text: String,
    /// Parsed start, if the text matched a known layout
    pub start: Option<NaiveDateTime>,
    /// Start + session window
    pub end: Option<NaiveDateTime>,
    /// Time left, as of the last refresh
    pub remaining: Remaining,
    /// Token count from the report
    pub tokens: Option<u64>,
    /// Cost in USD from the report
    pub cost: Option<f64>,
    /// State as classified from the report row
    pub lifecycle_state: LifecycleState,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::pending()
    }
}

impl SessionRecord {
    /// Placeholder before the first successful parse
    pub fn pending() -> Self {
        Self {
            raw_start_text: String::new(),
            start: None,
            end: None,
            remaining: Remaining::Unknown,
            tokens: None,
            cost: None,
            lifecycle_state: LifecycleState::Pending,
        }
    }

    /// Effective state at `now`.
    ///
    /// A row classified active is only active while its window is open.
    pub fn state_at(&self, now: NaiveDateTime) -> LifecycleState {
        match (self.lifecycle_state, self.end) {
            (LifecycleState::Active, Some(end)) if end <= now => LifecycleState::Completed,
            (state, _) => state,
        }
    }

    /// Recompute `remaining` for a record kept across polls
    pub fn refresh(&mut self, now: NaiveDateTime) {
        if self.lifecycle_state != LifecycleState::Active {
            return;
        }
        if let Some(end) = self.end {
            self.remaining = remaining_at(end, now);
        }
    }
}

/// One day's cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCostEntry {
    /// `MM-DD`
    pub day_key: String,
    /// Cost in USD
    pub cost: f64,
}

/// Result of one aggregation pass over a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostSummary {
    /// Day key -> cost for this pass
    pub days: BTreeMap<String, f64>,
    /// Contributing rows (fallback) or distinct days (daily table)
    pub session_count: usize,
    /// Rows classified active (fallback only)
    pub active_session_count: usize,
}

impl CostSummary {
    /// Whether the pass produced any day entries
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sum of all day costs in this pass
    pub fn total(&self) -> f64 {
        self.days.values().sum()
    }
}

/// Cost history kept for the lifetime of the process
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostHistory {
    days: BTreeMap<String, f64>,
    /// Sum of all day costs
    pub total_cost: f64,
    /// Sessions counted by the last aggregation
    pub session_count: usize,
    /// Active sessions counted by the last aggregation
    pub active_session_count: usize,
}

impl CostHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fresh summary.
    ///
    /// Day keys are never removed; a day present in `summary` replaces the
    /// stored value so re-reading the same report does not double count.
    pub fn apply(&mut self, summary: CostSummary) {
        for (day, cost) in summary.days {
            if cost >= 0.0 && cost.is_finite() {
                self.days.insert(day, cost);
            }
        }
        self.total_cost = self.days.values().sum();
        self.session_count = summary.session_count;
        self.active_session_count = summary.active_session_count;
    }

    /// Cost for a given day key
    pub fn get(&self, day_key: &str) -> Option<f64> {
        self.days.get(day_key).copied()
    }

    /// Number of days recorded
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// True when no day has been recorded
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// All entries ordered by day key
    pub fn entries(&self) -> Vec<DailyCostEntry> {
        self.days
            .iter()
            .map(|(day_key, cost)| DailyCostEntry {
                day_key: day_key.clone(),
                cost: *cost,
            })
            .collect()
    }

    /// The last `n` days, oldest first
    pub fn recent(&self, n: usize) -> Vec<DailyCostEntry> {
        let entries = self.entries();
        let skip = entries.len().saturating_sub(n);
        entries.into_iter().skip(skip).collect()
    }

    /// Average cost per recorded day
    pub fn average_per_day(&self) -> f64 {
        if self.days.is_empty() {
            0.0
        } else {
            self.total_cost / self.days.len() as f64
        }
    }
}
