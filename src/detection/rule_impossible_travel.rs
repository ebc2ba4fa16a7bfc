//! Travel-plausibility check
//!
//! A time-only proxy for geographic implausibility: when the source
//! address changed and the last recorded activity was under the configured
//! threshold ago, the move is flagged. No distance between the two
//! addresses is computed.

use super::CheckOutcome;

/// Contribution when an address change happens implausibly fast
pub const RISK_IMPOSSIBLE_TRAVEL: u32 = 25;

/// Check whether an address change happened too soon after the last activity.
///
/// Only meaningful when the IP-drift check already fired; callers gate on
/// that and on the session having a recorded address.
pub fn check_impossible_travel(
    last_activity_at: i64,
    now: i64,
    threshold_minutes: i64,
    ip_drifted: bool,
) -> CheckOutcome {
    if !ip_drifted {
        return CheckOutcome::clear();
    }

    let elapsed_minutes = (now - last_activity_at) / 60;
    if elapsed_minutes < threshold_minutes {
        CheckOutcome::flagged(RISK_IMPOSSIBLE_TRAVEL)
    } else {
        CheckOutcome::clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_recent_activity_with_drift_is_flagged() {
        let outcome = check_impossible_travel(NOW - 10 * 60, NOW, 60, true);
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_IMPOSSIBLE_TRAVEL);
    }

    #[test]
    fn test_old_activity_is_plausible() {
        let outcome = check_impossible_travel(NOW - 2 * 3600, NOW, 60, true);
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_no_drift_never_flags() {
        let outcome = check_impossible_travel(NOW - 10 * 60, NOW, 60, false);
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_threshold_boundary() {
        // Exactly at the threshold is plausible; just under is not
        assert!(!check_impossible_travel(NOW - 60 * 60, NOW, 60, true).triggered);
        assert!(check_impossible_travel(NOW - 59 * 60, NOW, 60, true).triggered);
    }
}
