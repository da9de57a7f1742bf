//! Per-tracker liveness status

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of probing one tracker.
///
/// Probe results are positionally aligned with the tracker list they were
/// computed for. `Unchecked` is the display default before any probe ran;
/// the prober itself only yields `Online`, `Offline` or `TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    /// Not probed yet
    #[default]
    Unchecked,
    /// Answered with a valid tracker reply
    Online,
    /// Refused, unreachable, malformed URL, or invalid reply
    Offline,
    /// No reply within the probe budget
    TimedOut,
}

impl TrackerStatus {
    /// Checks if the tracker answered.
    pub fn is_up(self) -> bool {
        self == TrackerStatus::Online
    }

    /// Checks if a probe has produced this status.
    pub fn is_checked(self) -> bool {
        self != TrackerStatus::Unchecked
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackerStatus::Unchecked => "unchecked",
            TrackerStatus::Online => "online",
            TrackerStatus::Offline => "offline",
            TrackerStatus::TimedOut => "timed out",
        }
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_distinct_from_unchecked() {
        assert_eq!(TrackerStatus::default(), TrackerStatus::Unchecked);
        assert!(!TrackerStatus::Unchecked.is_checked());
        assert!(TrackerStatus::Offline.is_checked());
        assert!(TrackerStatus::TimedOut.is_checked());
        assert_ne!(TrackerStatus::Offline, TrackerStatus::Unchecked);
    }

    #[test]
    fn test_only_online_is_up() {
        assert!(TrackerStatus::Online.is_up());
        assert!(!TrackerStatus::Offline.is_up());
        assert!(!TrackerStatus::TimedOut.is_up());
        assert!(!TrackerStatus::Unchecked.is_up());
    }

    #[test]
    fn test_status_serialization() {
        let statuses = vec![TrackerStatus::Online, TrackerStatus::TimedOut];
        let json = serde_json::to_string(&statuses).unwrap();
        assert_eq!(json, r#"["online","timed_out"]"#);
        assert_eq!(TrackerStatus::TimedOut.to_string(), "timed out");
    }
}
