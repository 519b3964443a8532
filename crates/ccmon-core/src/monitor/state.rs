use chrono::{DateTime, Local};

use crate::health::{HealthSnapshot, HealthTracker, ProbeResult};
use crate::usage::{CostHistory, SessionRecord};

/// Everything the polling loop carries between cycles
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Last parsed session; kept when a cycle yields no data
    pub session: SessionRecord,
    /// Per-day costs merged across cycles
    pub costs: CostHistory,
    /// Reachability edge detection
    pub health: HealthTracker,
    /// Probe result of the latest cycle
    pub last_probe: ProbeResult,
    /// Consecutive failed `blocks` invocations
    pub tool_failures: u32,
    /// Error from the latest cycle, if any
    pub last_error: Option<String>,
    /// Completed cycles
    pub polls: u64,
}

impl MonitorState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the state into a render snapshot
    pub fn snapshot(&self, usage_enabled: bool, taken_at: DateTime<Local>) -> HealthSnapshot {
        HealthSnapshot {
            probe: self.last_probe,
            session: self.session.clone(),
            session_state: self.session.state_at(taken_at.naive_local()),
            costs: self.costs.clone(),
            usage_enabled,
            network_fail_streak: self.health.fail_streak(),
            tool_failures: self.tool_failures,
            last_error: self.last_error.clone(),
            polls: self.polls,
            taken_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{LifecycleState, Remaining};
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_snapshot_evaluates_session_at_taken_time() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 21)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut state = MonitorState::new();
        state.session = SessionRecord {
            raw_start_text: "2025/6/21 09:00:00".to_string(),
            start: Some(start),
            end: Some(start + chrono::Duration::hours(5)),
            remaining: Remaining::Left {
                hours: 1,
                minutes: 0,
            },
            tokens: Some(10),
            cost: Some(1.0),
            lifecycle_state: LifecycleState::Active,
        };

        let before = Local
            .from_local_datetime(&(start + chrono::Duration::hours(4)))
            .earliest()
            .unwrap();
        let after = Local
            .from_local_datetime(&(start + chrono::Duration::hours(5)))
            .earliest()
            .unwrap();

        assert_eq!(
            state.snapshot(true, before).session_state,
            LifecycleState::Active
        );
        assert_eq!(
            state.snapshot(true, after).session_state,
            LifecycleState::Completed
        );
    }

    #[test]
    fn test_snapshot_copies_counters() {
        let mut state = MonitorState::new();
        state.tool_failures = 2;
        state.polls = 7;
        state.last_error = Some("boom".to_string());
        state.health.observe(false);

        let snapshot = state.snapshot(false, Local::now());
        assert_eq!(snapshot.tool_failures, 2);
        assert_eq!(snapshot.polls, 7);
        assert_eq!(snapshot.network_fail_streak, 1);
        assert_eq!(snapshot.last_error.as_deref(), Some("boom"));
        assert!(!snapshot.usage_enabled);
    }
}
