//! Security event payloads.
//!
//! Each event type carries only the fields that type defines, as a variant
//! of [`EventDetails`] tagged by the payload's own `eventType` field. A
//! payload that does not match its declared type's shape fails to decode
//! and is rejected at the validation boundary.

use crate::EventKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single authentication-related security event.
///
/// Wire format is camelCase; `timestamp` accepts epoch milliseconds or an
/// RFC 3339 string. Identity is not unique: duplicate submissions are
/// distinct events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// Account the event concerns.
    pub user_id: String,
    /// When the event occurred.
    #[serde(with = "timestamp_wire")]
    pub timestamp: DateTime<Utc>,
    /// Source address.
    pub ip_address: String,
    /// Whether the underlying action succeeded.
    pub success: bool,
    /// Attempt count, where the event type tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Type-specific fields.
    #[serde(flatten)]
    pub details: EventDetails,
}

impl SecurityEvent {
    /// The taxonomy entry this event belongs to.
    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// Event time as epoch milliseconds.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Type-specific event fields, tagged by `eventType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum EventDetails {
    /// Credential check failure.
    FailedLogin {
        /// Query observed alongside the failure, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_type: Option<String>,
    },
    /// Login attempt.
    LoginAttempt {},
    /// Query carrying an injection signature.
    SqlInjectionAttempt {
        /// The offending query.
        query_type: String,
    },
    /// Out-of-pattern activity.
    UnusualPattern {
        /// Description of the anomaly.
        pattern: String,
    },
    /// Password change.
    PasswordChange {
        /// When the password last changed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous_change: Option<String>,
    },
    /// Permission change.
    PermissionChange {
        /// Query that performed the change, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_type: Option<String>,
    },
    /// Privilege escalation attempt.
    PrivilegeEscalation {
        /// Role held before the attempt.
        current_role: String,
        /// Role the attempt targeted.
        target_role: String,
    },
    /// Account lockout.
    AccountLockout {
        /// How long the account stays locked.
        lockout_duration: String,
    },
    /// Session takeover.
    SessionHijacking {
        /// The compromised session.
        session_id: String,
        /// Address the session was established from.
        #[serde(rename = "originalIP")]
        original_ip: String,
        /// Address that took the session over.
        #[serde(rename = "hijackedIP")]
        hijacked_ip: String,
    },
    /// Systematic credential guessing.
    BruteForce {
        /// Observation window.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_window: Option<String>,
        /// Endpoint under attack.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_endpoint: Option<String>,
        /// Recognized tooling fingerprint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_signature: Option<String>,
    },
    /// Flagged source address.
    SuspiciousIp {
        /// Geolocated country, if resolved.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
        /// Whether a VPN exit was detected.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vpn_detected: Option<bool>,
        /// Reputation score, 0-100.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threat_score: Option<u32>,
    },
}

impl EventDetails {
    /// The taxonomy entry for this variant.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FailedLogin { .. } => EventKind::FailedLogin,
            Self::LoginAttempt {} => EventKind::LoginAttempt,
            Self::SqlInjectionAttempt { .. } => EventKind::SqlInjectionAttempt,
            Self::UnusualPattern { .. } => EventKind::UnusualPattern,
            Self::PasswordChange { .. } => EventKind::PasswordChange,
            Self::PermissionChange { .. } => EventKind::PermissionChange,
            Self::PrivilegeEscalation { .. } => EventKind::PrivilegeEscalation,
            Self::AccountLockout { .. } => EventKind::AccountLockout,
            Self::SessionHijacking { .. } => EventKind::SessionHijacking,
            Self::BruteForce { .. } => EventKind::BruteForce,
            Self::SuspiciousIp { .. } => EventKind::SuspiciousIp,
        }
    }

    /// The query field, on variants that define one.
    pub fn query_type(&self) -> Option<&str> {
        match self {
            Self::FailedLogin { query_type } | Self::PermissionChange { query_type } => {
                query_type.as_deref()
            }
            Self::SqlInjectionAttempt { query_type } => Some(query_type),
            _ => None,
        }
    }

    /// Render the type-specific detail lines for an alert body.
    pub fn detail_lines(&self) -> Vec<String> {
        match self {
            Self::FailedLogin { query_type } | Self::PermissionChange { query_type } => query_type
                .iter()
                .map(|q| format!("Query: {q}"))
                .collect(),
            Self::LoginAttempt {} => Vec::new(),
            Self::SqlInjectionAttempt { query_type } => {
                vec![format!("Query: {query_type}")]
            }
            Self::UnusualPattern { pattern } => vec![format!("Pattern: {pattern}")],
            Self::PasswordChange { previous_change } => previous_change
                .iter()
                .map(|p| format!("Previous Change: {p}"))
                .collect(),
            Self::PrivilegeEscalation {
                current_role,
                target_role,
            } => vec![format!("Role Change: {current_role} -> {target_role}")],
            Self::AccountLockout { lockout_duration } => {
                vec![format!("Duration: {lockout_duration}")]
            }
            Self::SessionHijacking {
                session_id,
                original_ip,
                hijacked_ip,
            } => vec![
                format!("Session: {session_id}"),
                format!("Original IP: {original_ip}"),
                format!("Hijacked IP: {hijacked_ip}"),
            ],
            Self::BruteForce {
                time_window,
                target_endpoint,
                tool_signature,
            } => {
                let mut lines = Vec::new();
                if let Some(window) = time_window {
                    lines.push(format!("Window: {window}"));
                }
                if let Some(endpoint) = target_endpoint {
                    lines.push(format!("Target: {endpoint}"));
                }
                if let Some(tool) = tool_signature {
                    lines.push(format!("Tool: {tool}"));
                }
                lines
            }
            Self::SuspiciousIp {
                country,
                vpn_detected,
                threat_score,
            } => {
                let mut lines = Vec::new();
                if let Some(country) = country {
                    lines.push(format!("Country: {country}"));
                }
                if let Some(vpn) = vpn_detected {
                    lines.push(format!("VPN Detected: {vpn}"));
                }
                if let Some(score) = threat_score {
                    lines.push(format!("Threat Score: {score}"));
                }
                lines
            }
        }
    }
}

/// Timestamp wire format: epoch milliseconds (what JS `Date.now()` sends)
/// or an RFC 3339 string. Always serialized back out as RFC 3339.
mod timestamp_wire {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| serde::de::Error::custom("timestamp out of range")),
            Raw::Text(s) => s
                .parse::<DateTime<Utc>>()
                .map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339())
    }
}
