//! Alert message rendering.

use crate::Rule;
use vigil_types::{SecurityEvent, Settings};

/// A formatted alert, built per dispatch and never persisted.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    /// `"<icon> <display name>"`.
    pub title: String,
    /// Multi-line human-readable incident summary.
    pub body: String,
    /// Channel status: `"error"` for Critical severity, else `"warning"`.
    pub channel_status: &'static str,
    /// Admins this alert is addressed to.
    pub recipients: Vec<String>,
}

impl AlertMessage {
    /// Render an alert from an event, the settings that monitored it, and
    /// the rule that flagged it.
    pub fn build(event: &SecurityEvent, settings: &Settings, rule: Rule) -> Self {
        let kind = event.kind();
        let title = format!("{} {}", kind.icon(), kind.display_name());

        let mut lines = vec![
            format!(
                "🚨 {} Security Incident Detected",
                settings.alert_severity
            ),
            String::new(),
            "Details:".to_string(),
            format!("• User: {}", event.user_id),
            format!("• IP Address: {}", event.ip_address),
            format!("• Event Type: {}", kind.as_str()),
            format!("• Time: {}", event.timestamp.to_rfc3339()),
            format!(
                "• Status: {}",
                if event.success { "Success" } else { "Failed" }
            ),
        ];
        if let Some(attempts) = event.attempts {
            lines.push(format!("• Attempts: {attempts}"));
        }
        for detail in event.details.detail_lines() {
            lines.push(format!("• {detail}"));
        }
        lines.push(format!("• Detection: {}", rule.id()));
        lines.push(format!("• Severity: {}", settings.alert_severity));
        lines.push(format!("• Notified: {}", settings.alert_admins.join(", ")));

        Self {
            title,
            body: lines.join("\n"),
            channel_status: settings.alert_severity.channel_status(),
            recipients: settings.alert_admins.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(severity: &str) -> Settings {
        Settings::from_value(&json!({
            "auth_key": "test_key",
            "alert_threshold": 3,
            "time_window": 15,
            "alert_severity": severity,
            "alert_admins": ["DevOps-Lead", "System-Admin"],
            "monitored_events": ["account_lockout"],
        }))
        .unwrap()
    }

    fn lockout_event() -> SecurityEvent {
        serde_json::from_value(json!({
            "userId": "locked@secure.com",
            "timestamp": 1722945600000_i64,
            "ipAddress": "192.168.1.75",
            "eventType": "account_lockout",
            "success": true,
            "attempts": 3,
            "lockoutDuration": "30 minutes",
        }))
        .unwrap()
    }

    #[test]
    fn title_is_icon_and_display_name() {
        let message = AlertMessage::build(&lockout_event(), &settings("High"), Rule::HighRiskCategory);
        assert_eq!(message.title, "🔒 Account Lockout");
    }

    #[test]
    fn body_carries_event_fields_and_detail_block() {
        let message = AlertMessage::build(&lockout_event(), &settings("High"), Rule::HighRiskCategory);

        assert!(message.body.contains("• User: locked@secure.com"));
        assert!(message.body.contains("• IP Address: 192.168.1.75"));
        assert!(message.body.contains("• Event Type: account_lockout"));
        assert!(message.body.contains("• Status: Success"));
        assert!(message.body.contains("• Attempts: 3"));
        assert!(message.body.contains("Duration: 30 minutes"));
        assert!(message.body.contains("• Severity: High"));
        assert!(message.body.contains("• Notified: DevOps-Lead, System-Admin"));
    }

    #[test]
    fn body_time_is_rfc3339() {
        let message = AlertMessage::build(&lockout_event(), &settings("High"), Rule::HighRiskCategory);
        assert!(message.body.contains("• Time: 2024-08-06T12:00:00+00:00"));
    }

    #[test]
    fn critical_severity_maps_to_error_status() {
        let message =
            AlertMessage::build(&lockout_event(), &settings("Critical"), Rule::HighRiskCategory);
        assert_eq!(message.channel_status, "error");
    }

    #[test]
    fn non_critical_severity_maps_to_warning_status() {
        for severity in ["High", "Medium", "Low"] {
            let message =
                AlertMessage::build(&lockout_event(), &settings(severity), Rule::HighRiskCategory);
            assert_eq!(message.channel_status, "warning", "{severity}");
        }
    }

    #[test]
    fn recipients_mirror_alert_admins() {
        let message = AlertMessage::build(&lockout_event(), &settings("High"), Rule::HighRiskCategory);
        assert_eq!(message.recipients, vec!["DevOps-Lead", "System-Admin"]);
    }
}
