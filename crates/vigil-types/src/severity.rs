//! Alert severity levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity assigned to an alert by the caller-supplied settings.
///
/// Serialized capitalized on the wire (`"Critical"`, `"High"`, ...),
/// matching the settings contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Critical security events.
    Critical,
    /// High-impact events requiring immediate review.
    High,
    /// Medium-impact events requiring attention.
    Medium,
    /// Low-impact events that may warrant review.
    Low,
}

impl AlertSeverity {
    /// Numeric value for comparison (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }

    /// Status string carried to the notification channel.
    ///
    /// Only `Critical` maps to `"error"`; everything else is a `"warning"`.
    pub fn channel_status(&self) -> &'static str {
        match self {
            Self::Critical => "error",
            _ => "warning",
        }
    }

    /// Display form, matching the wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl PartialOrd for AlertSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AlertSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
