//! Connectivity edge detection for desktop notifications.

use serde::Serialize;

/// A notification the monitor should emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationIntent {
    /// Network went from reachable to unreachable
    ConnectionLost,
    /// Network came back after being unreachable
    ConnectionRestored,
}

impl NotificationIntent {
    /// Notification title
    pub fn title(&self) -> &'static str {
        match self {
            NotificationIntent::ConnectionLost => "Connection lost",
            NotificationIntent::ConnectionRestored => "Connection restored",
        }
    }

    /// Notification body
    pub fn body(&self) -> &'static str {
        match self {
            NotificationIntent::ConnectionLost => "🚨 Network connection interrupted",
            NotificationIntent::ConnectionRestored => "🎉 Network connection is back",
        }
    }
}

/// Reachability before and after one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityEdge {
    /// `None` before the first poll
    pub previous: Option<bool>,
    /// Reachability on this poll
    pub current: bool,
}

impl ConnectivityEdge {
    /// Notification for this edge, if it is a real transition
    pub fn intent(&self) -> Option<NotificationIntent> {
        match (self.previous, self.current) {
            (Some(true), false) => Some(NotificationIntent::ConnectionLost),
            (Some(false), true) => Some(NotificationIntent::ConnectionRestored),
            _ => None,
        }
    }
}

/// Tracks reachability across polls
#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    last_reachable: Option<bool>,
    fail_streak: u32,
}

impl HealthTracker {
    /// Create a tracker with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this poll's reachability and return the notification to emit.
    ///
    /// Nothing fires on the first poll or while reachability is unchanged.
    pub fn observe(&mut self, reachable: bool) -> Option<NotificationIntent> {
        let edge = ConnectivityEdge {
            previous: self.last_reachable,
            current: reachable,
        };
        self.last_reachable = Some(reachable);
        self.fail_streak = if reachable {
            0
        } else {
            self.fail_streak.saturating_add(1)
        };
        edge.intent()
    }

    /// Reachability seen on the last poll
    pub fn last_reachable(&self) -> Option<bool> {
        self.last_reachable
    }

    /// Consecutive unreachable polls
    pub fn fail_streak(&self) -> u32 {
        self.fail_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(sequence: &[bool]) -> Vec<NotificationIntent> {
        let mut tracker = HealthTracker::new();
        sequence
            .iter()
            .filter_map(|reachable| tracker.observe(*reachable))
            .collect()
    }

    #[test]
    fn test_first_poll_is_silent() {
        assert!(run(&[false]).is_empty());
        assert!(run(&[true]).is_empty());
    }

    #[test]
    fn test_loss_fires_once() {
        assert_eq!(
            run(&[true, true, false, false, false]),
            vec![NotificationIntent::ConnectionLost]
        );
    }

    #[test]
    fn test_restore_fires_once() {
        assert_eq!(
            run(&[false, false, true, true]),
            vec![NotificationIntent::ConnectionRestored]
        );
    }

    #[test]
    fn test_flapping() {
        assert_eq!(
            run(&[true, false, true, false]),
            vec![
                NotificationIntent::ConnectionLost,
                NotificationIntent::ConnectionRestored,
                NotificationIntent::ConnectionLost,
            ]
        );
    }

    #[test]
    fn test_unchanged_sequences_never_fire() {
        for len in 1..50 {
            assert!(run(&vec![true; len]).is_empty());
            assert!(run(&vec![false; len]).is_empty());
        }
    }

    #[test]
    fn test_fail_streak() {
        let mut tracker = HealthTracker::new();
        tracker.observe(false);
        tracker.observe(false);
        assert_eq!(tracker.fail_streak(), 2);
        tracker.observe(true);
        assert_eq!(tracker.fail_streak(), 0);
        assert_eq!(tracker.last_reachable(), Some(true));
    }
}
