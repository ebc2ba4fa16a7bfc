//! Risk aggregation: map a summed risk score to an action and a severity
//! label through the configured threshold table.

use crate::config::RiskThresholds;
use crate::models::{SessionAction, Severity};

/// Action for a summed risk score.
///
/// The critical threshold does not change the action (it stays
/// FORCE_REAUTH); it only selects the stored severity label.
pub fn action_for_score(score: u32, thresholds: &RiskThresholds) -> SessionAction {
    if score >= thresholds.high {
        SessionAction::ForceReauth
    } else if score >= thresholds.medium {
        SessionAction::RequireTwoFactor
    } else if score >= thresholds.low {
        SessionAction::Warn
    } else {
        SessionAction::Allow
    }
}

/// Severity label for a risk score, using the same threshold table.
pub fn severity_for_score(score: u32, thresholds: &RiskThresholds) -> Severity {
    if score >= thresholds.critical {
        Severity::Critical
    } else if score >= thresholds.high {
        Severity::High
    } else if score >= thresholds.medium {
        Severity::Medium
    } else {
        Severity::Low
    }
}
