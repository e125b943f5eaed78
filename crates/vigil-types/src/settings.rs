//! Caller-supplied monitoring settings.
//!
//! Settings arrive on every webhook call and are never persisted. They are
//! validated field by field so a rejection names everything wrong with the
//! object at once, rather than the first problem found.

use crate::AlertSeverity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Validated per-request monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Deployment auth key.
    pub auth_key: String,
    /// Attempt count at which `failed_login` becomes alert-worthy.
    pub alert_threshold: u32,
    /// Correlation window in minutes.
    pub time_window: u32,
    /// Severity stamped on alerts raised under these settings.
    pub alert_severity: AlertSeverity,
    /// Admins named as alert recipients.
    pub alert_admins: Vec<String>,
    /// Event types to act upon; everything else is skipped.
    pub monitored_events: Vec<String>,
}

/// Settings rejection, carrying every offending field.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings value was not a JSON object at all.
    #[error("settings must be an object")]
    NotAnObject,
    /// One or more fields were missing or invalid.
    #[error("invalid settings: {}", problems.join("; "))]
    Invalid {
        /// One message per offending field, each naming the field.
        problems: Vec<String>,
    },
}

impl SettingsError {
    fn invalid(problems: Vec<String>) -> Self {
        Self::Invalid { problems }
    }
}

impl Settings {
    /// Validate and extract settings from a raw JSON value.
    ///
    /// No field is silently defaulted: absence and type mismatch are both
    /// reported, and all problems are collected before returning.
    pub fn from_value(value: &Value) -> Result<Self, SettingsError> {
        let obj = value.as_object().ok_or(SettingsError::NotAnObject)?;
        let mut problems = Vec::new();

        let auth_key = match obj.get("auth_key").and_then(Value::as_str) {
            Some(key) if !key.is_empty() => Some(key.to_string()),
            Some(_) => {
                problems.push("auth_key must be a non-empty string".to_string());
                None
            }
            None => {
                problems.push("auth_key is required".to_string());
                None
            }
        };

        let alert_threshold = match obj.get("alert_threshold").and_then(Value::as_u64) {
            Some(threshold) if threshold >= 1 => Some(threshold as u32),
            Some(_) => {
                problems.push("alert_threshold must be at least 1".to_string());
                None
            }
            None => {
                problems.push("alert_threshold must be a number >= 1".to_string());
                None
            }
        };

        let time_window = match obj.get("time_window").and_then(Value::as_u64) {
            Some(window) => Some(window as u32),
            None => {
                problems.push("time_window must be a number >= 0".to_string());
                None
            }
        };

        let alert_severity = match obj.get("alert_severity") {
            Some(raw) => match serde_json::from_value::<AlertSeverity>(raw.clone()) {
                Ok(severity) => Some(severity),
                Err(_) => {
                    problems.push(
                        "alert_severity must be one of Critical, High, Medium, Low".to_string(),
                    );
                    None
                }
            },
            None => {
                problems.push("alert_severity is required".to_string());
                None
            }
        };

        let alert_admins = match string_list(obj.get("alert_admins")) {
            Some(admins) if !admins.is_empty() => Some(admins),
            _ => {
                problems.push("alert_admins must be a non-empty array of strings".to_string());
                None
            }
        };

        let monitored_events = match string_list(obj.get("monitored_events")) {
            Some(events) if !events.is_empty() => Some(events),
            _ => {
                problems.push("monitored_events must be a non-empty array of strings".to_string());
                None
            }
        };

        if !problems.is_empty() {
            return Err(SettingsError::invalid(problems));
        }

        Ok(Self {
            auth_key: auth_key.unwrap(),
            alert_threshold: alert_threshold.unwrap(),
            time_window: time_window.unwrap(),
            alert_severity: alert_severity.unwrap(),
            alert_admins: alert_admins.unwrap(),
            monitored_events: monitored_events.unwrap(),
        })
    }

    /// Whether an event type is in the monitored list.
    pub fn monitors(&self, event_type: &str) -> bool {
        self.monitored_events.iter().any(|e| e == event_type)
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}
