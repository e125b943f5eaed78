//! Event taxonomy.
//!
//! The set of event types this service understands is closed: anything
//! outside it is rejected at the request boundary, never formatted with
//! empty fields. Display metadata lives here; the per-type detail block
//! is rendered by the matching [`EventDetails`](crate::EventDetails)
//! variant.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Known authentication-related security event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// A login attempt that failed credential checks.
    FailedLogin,
    /// A login attempt, successful or not.
    LoginAttempt,
    /// A query carrying a SQL injection signature.
    SqlInjectionAttempt,
    /// Activity outside the user's established pattern.
    UnusualPattern,
    /// A password change.
    PasswordChange,
    /// A change to a user's permissions.
    PermissionChange,
    /// An attempt to gain elevated privileges.
    PrivilegeEscalation,
    /// An account locked out after repeated failures.
    AccountLockout,
    /// A session taken over from a different address.
    SessionHijacking,
    /// Systematic credential guessing.
    BruteForce,
    /// Traffic from a flagged address.
    SuspiciousIp,
}

impl EventKind {
    /// All known kinds.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// Human-readable name used in alert titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FailedLogin => "Failed Login",
            Self::LoginAttempt => "Login Attempt",
            Self::SqlInjectionAttempt => "SQL Injection Attempt",
            Self::UnusualPattern => "Unusual Pattern",
            Self::PasswordChange => "Password Change",
            Self::PermissionChange => "Permission Change",
            Self::PrivilegeEscalation => "Privilege Escalation",
            Self::AccountLockout => "Account Lockout",
            Self::SessionHijacking => "Session Hijacking",
            Self::BruteForce => "Brute Force",
            Self::SuspiciousIp => "Suspicious IP",
        }
    }

    /// Icon prepended to alert titles.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::FailedLogin => "🔨",
            Self::LoginAttempt => "🔁",
            Self::SqlInjectionAttempt => "💉",
            Self::UnusualPattern => "🌐",
            Self::PasswordChange => "🔑",
            Self::PermissionChange => "🛡️",
            Self::PrivilegeEscalation => "⚠️",
            Self::AccountLockout => "🔒",
            Self::SessionHijacking => "🕵️",
            Self::BruteForce => "💥",
            Self::SuspiciousIp => "🚩",
        }
    }

    /// Wire spelling (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedLogin => "failed_login",
            Self::LoginAttempt => "login_attempt",
            Self::SqlInjectionAttempt => "sql_injection_attempt",
            Self::UnusualPattern => "unusual_pattern",
            Self::PasswordChange => "password_change",
            Self::PermissionChange => "permission_change",
            Self::PrivilegeEscalation => "privilege_escalation",
            Self::AccountLockout => "account_lockout",
            Self::SessionHijacking => "session_hijacking",
            Self::BruteForce => "brute_force",
            Self::SuspiciousIp => "suspicious_ip",
        }
    }
}
