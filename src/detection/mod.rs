pub mod detector;
pub mod risk;
pub mod rule_impossible_travel;
pub mod rule_ip_drift;
pub mod rule_session_switch;
pub mod rule_user_agent;

pub use detector::AnomalyDetector;

/// Outcome of a single signal check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub triggered: bool,
    pub risk_increase: u32,
}

impl CheckOutcome {
    /// The check did not fire.
    pub fn clear() -> Self {
        CheckOutcome {
            triggered: false,
            risk_increase: 0,
        }
    }

    /// The check fired with the given risk contribution.
    pub fn flagged(risk_increase: u32) -> Self {
        CheckOutcome {
            triggered: true,
            risk_increase,
        }
    }
}
