use serde::{Deserialize, Serialize};

/// Lifecycle state of an authenticated session.
///
/// Only `Active` sessions can produce a normal evaluation outcome; any
/// other state forces the maximum-risk outcome regardless of how well the
/// request matches the recorded attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Revoked => "revoked",
            SessionStatus::Expired => "expired",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "active" => Some(SessionStatus::Active),
            "revoked" => Some(SessionStatus::Revoked),
            "expired" => Some(SessionStatus::Expired),
            _ => None,
        }
    }
}

/// Why and when a session was terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub revoked_at: i64,
    pub reason: String,
    pub note: String,
}

/// Server-side record of one authenticated login.
///
/// Sessions are created at login by the surrounding application; this crate
/// reads them on every request and mutates only the security metadata
/// (`anomaly_flags`, `risk_score`) and the revocation fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub status: SessionStatus,
    /// Last-known source address, if one was recorded.
    pub ip_address: Option<String>,
    /// Last-known client signature (user agent), if one was recorded.
    pub user_agent: Option<String>,
    /// Unix timestamp of the last recorded activity.
    pub last_activity_at: i64,
    /// Accumulated anomaly tags, appended without deduplication.
    pub anomaly_flags: Vec<String>,
    /// Monotonically non-decreasing risk indicator.
    pub risk_score: u32,
    pub revocation: Option<RevocationRecord>,
}

impl Session {
    /// Convenience constructor for a freshly logged-in session.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        now: i64,
    ) -> Self {
        Session {
            id: id.into(),
            user_id: user_id.into(),
            status: SessionStatus::Active,
            ip_address,
            user_agent,
            last_activity_at: now,
            anomaly_flags: Vec::new(),
            risk_score: 0,
            revocation: None,
        }
    }
}

/// Attributes of the incoming request under evaluation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestContext {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        RequestContext {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }
}
