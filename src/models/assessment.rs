use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete label for one independently triggered detection rule.
///
/// A closed enumeration rather than free-form strings so the action
/// mapping and persistence code can be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    IpDrift,
    UserAgentDrift,
    ImpossibleTravel,
    RapidSessionSwitching,
    SessionNotFound,
    SessionInactive,
    CheckError,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::IpDrift => "IP_DRIFT",
            AnomalyType::UserAgentDrift => "USER_AGENT_DRIFT",
            AnomalyType::ImpossibleTravel => "IMPOSSIBLE_TRAVEL",
            AnomalyType::RapidSessionSwitching => "RAPID_SESSION_SWITCHING",
            AnomalyType::SessionNotFound => "SESSION_NOT_FOUND",
            AnomalyType::SessionInactive => "SESSION_INACTIVE",
            AnomalyType::CheckError => "CHECK_ERROR",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "IP_DRIFT" => Some(AnomalyType::IpDrift),
            "USER_AGENT_DRIFT" => Some(AnomalyType::UserAgentDrift),
            "IMPOSSIBLE_TRAVEL" => Some(AnomalyType::ImpossibleTravel),
            "RAPID_SESSION_SWITCHING" => Some(AnomalyType::RapidSessionSwitching),
            "SESSION_NOT_FOUND" => Some(AnomalyType::SessionNotFound),
            "SESSION_INACTIVE" => Some(AnomalyType::SessionInactive),
            "CHECK_ERROR" => Some(AnomalyType::CheckError),
            _ => None,
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join anomaly tags into the composite form stored on events and sessions.
pub fn composite_tags(types: &[AnomalyType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Corrective action the caller must take, from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionAction {
    #[serde(rename = "ALLOW")]
    Allow,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "REQUIRE_2FA")]
    RequireTwoFactor,
    #[serde(rename = "FORCE_REAUTH")]
    ForceReauth,
}

impl SessionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Allow => "ALLOW",
            SessionAction::Warn => "WARN",
            SessionAction::RequireTwoFactor => "REQUIRE_2FA",
            SessionAction::ForceReauth => "FORCE_REAUTH",
        }
    }
}

/// Result of one session-integrity evaluation.
///
/// Produced fresh on every call and never persisted as-is; its effects are
/// projected into the session's security metadata and the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnomalyAssessment {
    pub has_anomaly: bool,
    pub anomaly_types: Vec<AnomalyType>,
    pub risk_score: u32,
    pub action: SessionAction,
}

impl AnomalyAssessment {
    /// A clean evaluation: nothing triggered.
    pub fn clear() -> Self {
        AnomalyAssessment {
            has_anomaly: false,
            anomaly_types: Vec::new(),
            risk_score: 0,
            action: SessionAction::Allow,
        }
    }

    pub fn session_not_found() -> Self {
        AnomalyAssessment {
            has_anomaly: true,
            anomaly_types: vec![AnomalyType::SessionNotFound],
            risk_score: 100,
            action: SessionAction::ForceReauth,
        }
    }

    pub fn session_inactive() -> Self {
        AnomalyAssessment {
            has_anomaly: true,
            anomaly_types: vec![AnomalyType::SessionInactive],
            risk_score: 100,
            action: SessionAction::ForceReauth,
        }
    }

    /// Fail-secure outcome for any error during evaluation.
    pub fn check_error() -> Self {
        AnomalyAssessment {
            has_anomaly: true,
            anomaly_types: vec![AnomalyType::CheckError],
            risk_score: 75,
            action: SessionAction::ForceReauth,
        }
    }

    pub fn composite_tags(&self) -> String {
        composite_tags(&self.anomaly_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_tag_roundtrip() {
        for anomaly in [
            AnomalyType::IpDrift,
            AnomalyType::UserAgentDrift,
            AnomalyType::ImpossibleTravel,
            AnomalyType::RapidSessionSwitching,
            AnomalyType::SessionNotFound,
            AnomalyType::SessionInactive,
            AnomalyType::CheckError,
        ] {
            assert_eq!(AnomalyType::from_tag(anomaly.as_str()), Some(anomaly));
        }
        assert_eq!(AnomalyType::from_tag("UNKNOWN"), None);
    }

    #[test]
    fn test_composite_tags() {
        let tags = composite_tags(&[AnomalyType::IpDrift, AnomalyType::ImpossibleTravel]);
        assert_eq!(tags, "IP_DRIFT,IMPOSSIBLE_TRAVEL");
        assert_eq!(composite_tags(&[]), "");
    }

    #[test]
    fn test_action_ordering() {
        assert!(SessionAction::Allow < SessionAction::Warn);
        assert!(SessionAction::Warn < SessionAction::RequireTwoFactor);
        assert!(SessionAction::RequireTwoFactor < SessionAction::ForceReauth);
    }

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&SessionAction::RequireTwoFactor).unwrap();
        assert_eq!(json, "\"REQUIRE_2FA\"");
        let json = serde_json::to_string(&SessionAction::ForceReauth).unwrap();
        assert_eq!(json, "\"FORCE_REAUTH\"");
    }

    #[test]
    fn test_fail_secure_constructors() {
        let not_found = AnomalyAssessment::session_not_found();
        assert_eq!(not_found.risk_score, 100);
        assert_eq!(not_found.action, SessionAction::ForceReauth);

        let error = AnomalyAssessment::check_error();
        assert_eq!(error.risk_score, 75);
        assert_eq!(error.action, SessionAction::ForceReauth);
        assert_eq!(error.anomaly_types, vec![AnomalyType::CheckError]);
    }
}
