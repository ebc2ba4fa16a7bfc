use serde::{Deserialize, Serialize};

/// Kind of security event recorded by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    SessionAnomalyDetected,
    ForcedReauth,
}

impl SecurityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventType::SessionAnomalyDetected => "SESSION_ANOMALY_DETECTED",
            SecurityEventType::ForcedReauth => "FORCED_REAUTH",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SESSION_ANOMALY_DETECTED" => Some(SecurityEventType::SessionAnomalyDetected),
            "FORCED_REAUTH" => Some(SecurityEventType::ForcedReauth),
            _ => None,
        }
    }
}

/// Severity label derived from a risk score via the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// Append-only security event row.
///
/// Created once per detected anomaly or enforcement action and never
/// mutated afterwards. The `details` payload carries the session id, the
/// composite anomaly tags, and the prior vs. current request attributes.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub user_id: String,
    pub event_type: SecurityEventType,
    pub severity: Severity,
    pub ip_address: String,
    pub user_agent: String,
    pub details: serde_json::Value,
    pub risk_score: u32,
    pub timestamp: i64,
}

/// Mirrored audit-trail entry.
///
/// The audit trail holds the full anomaly detail; end users only ever see
/// a generic reason.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub user_id: String,
    pub action: String,
    pub session_id: String,
    pub detail: String,
    pub timestamp: i64,
}
