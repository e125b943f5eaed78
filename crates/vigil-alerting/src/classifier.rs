//! Suspicious-activity rule table.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use vigil_types::{EventKind, SecurityEvent, Settings};

/// Two login attempts closer than this are treated as a brute-force signal.
const RAPID_ATTEMPT_WINDOW_MS: i64 = 1000;

/// Which rule flagged an event. Ids are stable: they appear in alert
/// bodies and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `failed_login` at or above the settings threshold.
    FailedLoginThreshold,
    /// A query field carrying a SQL injection signature.
    SqlInjectionSignature,
    /// Consecutive `login_attempt`s for one user inside the rapid window.
    RapidLoginAttempts,
    /// A failed permission change or privilege escalation.
    PrivilegeEscalationFailure,
    /// An event type that is always alert-worthy.
    HighRiskCategory,
}

impl Rule {
    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::FailedLoginThreshold => "failed_login_threshold",
            Self::SqlInjectionSignature => "sql_injection_signature",
            Self::RapidLoginAttempts => "rapid_login_attempts",
            Self::PrivilegeEscalationFailure => "privilege_escalation_failure",
            Self::HighRiskCategory => "high_risk_category",
        }
    }
}

/// Decides whether a monitored event warrants an alert.
///
/// Evaluation is pure except for the per-user last-login-attempt map,
/// which backs the rapid-attempt rule. The map is keyed by user id so one
/// tenant's login cadence never flags another's, and entries are updated
/// under the map's key-level lock.
#[derive(Default)]
pub struct Classifier {
    last_login_attempt: DashMap<String, i64>,
}

impl Classifier {
    /// New classifier with no attempt history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the rule table in order; first match wins.
    pub fn classify(&self, event: &SecurityEvent, settings: &Settings) -> Option<Rule> {
        let kind = event.kind();

        if kind == EventKind::FailedLogin
            && event.attempts.unwrap_or(0) >= settings.alert_threshold
        {
            return Some(Rule::FailedLoginThreshold);
        }

        if let Some(query) = event.details.query_type() {
            let query = query.to_lowercase();
            if query.contains("union select") || query.contains("drop table") {
                return Some(Rule::SqlInjectionSignature);
            }
        }

        if kind == EventKind::LoginAttempt {
            let now = event.timestamp_millis();
            if let Some(previous) = self.record_login_attempt(&event.user_id, now) {
                if (now - previous).abs() < RAPID_ATTEMPT_WINDOW_MS {
                    return Some(Rule::RapidLoginAttempts);
                }
            }
        }

        if matches!(
            kind,
            EventKind::PermissionChange | EventKind::PrivilegeEscalation
        ) && !event.success
        {
            return Some(Rule::PrivilegeEscalationFailure);
        }

        if matches!(
            kind,
            EventKind::AccountLockout | EventKind::SqlInjectionAttempt | EventKind::UnusualPattern
        ) {
            return Some(Rule::HighRiskCategory);
        }

        None
    }

    /// Swap in the newest attempt timestamp for a user and return the one
    /// it replaced. Read-and-replace happens under the entry lock so two
    /// concurrent attempts cannot both observe the same predecessor.
    fn record_login_attempt(&self, user_id: &str, timestamp_ms: i64) -> Option<i64> {
        match self.last_login_attempt.entry(user_id.to_string()) {
            Entry::Occupied(mut occupied) => Some(occupied.insert(timestamp_ms)),
            Entry::Vacant(vacant) => {
                vacant.insert(timestamp_ms);
                None
            }
        }
    }
}
