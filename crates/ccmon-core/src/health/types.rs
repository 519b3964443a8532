//! Network probe results and the dashboard snapshot.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::usage::{CostHistory, LifecycleState, SessionRecord};

/// Outcome of a single ICMP ping
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PingOutcome {
    /// Host answered
    pub reachable: bool,
    /// Round-trip time, when the output reported one
    pub latency_ms: Option<f64>,
}

/// Outcome of a single HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HttpOutcome {
    /// Request completed successfully
    pub ok: bool,
    /// Wall time of the request
    pub elapsed_ms: Option<f64>,
}

/// Combined result of one probe cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProbeResult {
    /// Both ping and HTTP succeeded
    pub reachable: bool,
    /// Ping round-trip time
    pub latency_ms: Option<f64>,
    /// HTTP response time
    pub http_ms: Option<f64>,
}

impl ProbeResult {
    /// Reachable only when both probes agree
    pub fn combine(ping: PingOutcome, http: HttpOutcome) -> Self {
        Self {
            reachable: ping.reachable && http.ok,
            latency_ms: ping.latency_ms,
            http_ms: if http.ok { http.elapsed_ms } else { None },
        }
    }

    /// Rating of the HTTP response time
    pub fn speed(&self) -> Option<SpeedRating> {
        self.http_ms.map(SpeedRating::from_ms)
    }

    /// Color band of the ping latency
    pub fn latency_level(&self) -> Option<LatencyLevel> {
        self.latency_ms.map(LatencyLevel::from_ms)
    }
}

/// HTTP speed bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedRating {
    Good,
    Fair,
    Slow,
}

impl SpeedRating {
    /// < 200 ms good, < 500 ms fair
    pub fn from_ms(ms: f64) -> Self {
        if ms < 200.0 {
            SpeedRating::Good
        } else if ms < 500.0 {
            SpeedRating::Fair
        } else {
            SpeedRating::Slow
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SpeedRating::Good => "good",
            SpeedRating::Fair => "fair",
            SpeedRating::Slow => "slow",
        }
    }
}

/// Ping latency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyLevel {
    Low,
    Medium,
    High,
}

impl LatencyLevel {
    /// < 50 ms low, < 150 ms medium
    pub fn from_ms(ms: f64) -> Self {
        if ms < 50.0 {
            LatencyLevel::Low
        } else if ms < 150.0 {
            LatencyLevel::Medium
        } else {
            LatencyLevel::High
        }
    }
}

/// Everything the dashboard renders for one cycle
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Latest probe result
    pub probe: ProbeResult,
    /// Session as last parsed (may be stale)
    pub session: SessionRecord,
    /// Session state evaluated at `taken_at`
    pub session_state: LifecycleState,
    /// Cost history so far
    pub costs: CostHistory,
    /// Whether usage tracking runs at all (false in network-only mode)
    pub usage_enabled: bool,
    /// Consecutive unreachable polls
    pub network_fail_streak: u32,
    /// Consecutive ccusage failures
    pub tool_failures: u32,
    /// Last error from a collaborator
    pub last_error: Option<String>,
    /// Completed poll cycles
    pub polls: u64,
    /// When the snapshot was taken
    pub taken_at: DateTime<Local>,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            probe: ProbeResult::default(),
            session: SessionRecord::pending(),
            session_state: LifecycleState::Pending,
            costs: CostHistory::new(),
            usage_enabled: true,
            network_fail_streak: 0,
            tool_failures: 0,
            last_error: None,
            polls: 0,
            taken_at: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_requires_both_probes() {
        let ping = PingOutcome {
            reachable: true,
            latency_ms: Some(12.0),
        };
        let http_fail = HttpOutcome {
            ok: false,
            elapsed_ms: Some(5000.0),
        };
        let result = ProbeResult::combine(ping, http_fail);
        assert!(!result.reachable);
        assert_eq!(result.latency_ms, Some(12.0));
        assert_eq!(result.http_ms, None);

        let http_ok = HttpOutcome {
            ok: true,
            elapsed_ms: Some(180.0),
        };
        let result = ProbeResult::combine(ping, http_ok);
        assert!(result.reachable);
        assert_eq!(result.speed(), Some(SpeedRating::Good));
    }

    #[test]
    fn test_speed_rating_thresholds() {
        assert_eq!(SpeedRating::from_ms(199.9), SpeedRating::Good);
        assert_eq!(SpeedRating::from_ms(200.0), SpeedRating::Fair);
        assert_eq!(SpeedRating::from_ms(500.0), SpeedRating::Slow);
    }

    #[test]
    fn test_latency_level_thresholds() {
        assert_eq!(LatencyLevel::from_ms(10.0), LatencyLevel::Low);
        assert_eq!(LatencyLevel::from_ms(50.0), LatencyLevel::Medium);
        assert_eq!(LatencyLevel::from_ms(150.0), LatencyLevel::High);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(HealthSnapshot::default()).unwrap();
        assert_eq!(json["session_state"], "pending");
        assert_eq!(json["probe"]["reachable"], false);
    }
}
