//! Client-signature drift check
//!
//! Compares the request's user agent against the session's recorded one.
//! In lenient mode, dotted version-number runs are replaced with a
//! placeholder first so a routine browser update does not count as drift.

use super::CheckOutcome;
use regex::Regex;

/// Contribution when the client signature diverges
pub const RISK_USER_AGENT_DRIFT: u32 = 35;

const VERSION_PLACEHOLDER: &str = "#";

/// Replace dotted numeric runs ("120.0.6099.71") with a placeholder.
fn normalize_signature(signature: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(signature, VERSION_PLACEHOLDER)
        .into_owned()
}

/// Check whether the client signature diverges from the recorded one.
pub fn check_user_agent_drift(
    previous: Option<&str>,
    current: &str,
    strict_matching: bool,
) -> Result<CheckOutcome, regex::Error> {
    let previous = match previous {
        Some(p) => p,
        // Nothing on record to drift from
        None => return Ok(CheckOutcome::clear()),
    };

    if previous == current {
        return Ok(CheckOutcome::clear());
    }

    if !strict_matching {
        let version_pattern = Regex::new(r"\d+(?:\.\d+)+")?;
        if normalize_signature(previous, &version_pattern)
            == normalize_signature(current, &version_pattern)
        {
            return Ok(CheckOutcome::clear());
        }
    }

    Ok(CheckOutcome::flagged(RISK_USER_AGENT_DRIFT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_no_drift() {
        let outcome = check_user_agent_drift(Some("Chrome/120.0"), "Chrome/120.0", false).unwrap();
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_version_bump_tolerated_when_lenient() {
        let outcome = check_user_agent_drift(Some("Chrome/120.0"), "Chrome/121.0", false).unwrap();
        assert!(!outcome.triggered);
        assert_eq!(outcome.risk_increase, 0);

        // Long dotted runs normalize too
        let outcome = check_user_agent_drift(
            Some("Mozilla/5.0 Chrome/120.0.6099.71 Safari/537.36"),
            "Mozilla/5.0 Chrome/121.0.6167.85 Safari/537.36",
            false,
        )
        .unwrap();
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_version_bump_flagged_when_strict() {
        let outcome = check_user_agent_drift(Some("Chrome/120.0"), "Chrome/121.0", true).unwrap();
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_USER_AGENT_DRIFT);
    }

    #[test]
    fn test_different_browser_flagged() {
        let outcome = check_user_agent_drift(Some("Chrome/120.0"), "Firefox/121.0", false).unwrap();
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_USER_AGENT_DRIFT);
    }

    #[test]
    fn test_no_recorded_signature() {
        let outcome = check_user_agent_drift(None, "Chrome/120.0", false).unwrap();
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_bare_number_is_not_a_version_run() {
        // A single integer with no dot is left alone by normalization
        let outcome = check_user_agent_drift(Some("Client 7"), "Client 8", false).unwrap();
        assert!(outcome.triggered);
    }
}
