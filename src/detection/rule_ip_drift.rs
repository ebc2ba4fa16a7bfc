//! Source-address drift check
//!
//! Compares the request's source address against the session's last-known
//! address. IPv4-mapped IPv6 notation is normalized on both sides so
//! "::ffff:192.168.1.1" and "192.168.1.1" compare equal.

use super::CheckOutcome;
use std::net::IpAddr;

/// Contribution when address changes are not tolerated
pub const RISK_IP_CHANGE_BLOCKED: u32 = 40;
/// Contribution when configuration tolerates roaming
pub const RISK_IP_CHANGE_TOLERATED: u32 = 15;

/// Normalize an address string for comparison.
///
/// Unparseable strings are compared verbatim rather than rejected; the
/// store may hold values that predate validation.
pub fn normalize_address(addr: &str) -> String {
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        Ok(ip) => ip.to_string(),
        Err(_) => addr.to_string(),
    }
}

/// Check whether the request address diverges from the recorded one.
pub fn check_ip_drift(
    previous: Option<&str>,
    current: &str,
    allow_ip_change: bool,
) -> CheckOutcome {
    let previous = match previous {
        Some(p) => p,
        // Nothing on record to drift from
        None => return CheckOutcome::clear(),
    };

    if normalize_address(previous) == normalize_address(current) {
        return CheckOutcome::clear();
    }

    if allow_ip_change {
        CheckOutcome::flagged(RISK_IP_CHANGE_TOLERATED)
    } else {
        CheckOutcome::flagged(RISK_IP_CHANGE_BLOCKED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_address_no_drift() {
        let outcome = check_ip_drift(Some("192.168.1.1"), "192.168.1.1", false);
        assert!(!outcome.triggered);
        assert_eq!(outcome.risk_increase, 0);
    }

    #[test]
    fn test_drift_blocked() {
        let outcome = check_ip_drift(Some("192.168.1.1"), "10.0.0.1", false);
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_IP_CHANGE_BLOCKED);
    }

    #[test]
    fn test_drift_tolerated() {
        let outcome = check_ip_drift(Some("192.168.1.1"), "10.0.0.1", true);
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_IP_CHANGE_TOLERATED);
    }

    #[test]
    fn test_ipv4_mapped_ipv6_is_equal() {
        let outcome = check_ip_drift(Some("::ffff:192.168.1.1"), "192.168.1.1", false);
        assert!(!outcome.triggered);

        let outcome = check_ip_drift(Some("192.168.1.1"), "::ffff:192.168.1.1", false);
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_plain_ipv6_drift() {
        let outcome = check_ip_drift(Some("2001:db8::1"), "2001:db8::2", false);
        assert!(outcome.triggered);

        let outcome = check_ip_drift(Some("2001:db8::1"), "2001:db8::1", false);
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_no_recorded_address() {
        let outcome = check_ip_drift(None, "10.0.0.1", false);
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_unparseable_addresses_compared_verbatim() {
        assert!(!check_ip_drift(Some("not-an-ip"), "not-an-ip", false).triggered);
        assert!(check_ip_drift(Some("not-an-ip"), "10.0.0.1", false).triggered);
    }
}
