//! Rapid-session-switch check
//!
//! A burst of recently-active sessions for one user suggests a stolen
//! token being replayed from several places at once. This is a
//! point-in-time read against the session store, always evaluated for the
//! owning user regardless of whether the current request drifted.

use super::CheckOutcome;
use crate::persistence::{PersistenceError, SessionStore};

/// Contribution when the user has too many recently-active sessions
pub const RISK_RAPID_SWITCHING: u32 = 20;
/// Lookback window in seconds
pub const SWITCH_WINDOW_SECONDS: i64 = 300;
/// More than this many active sessions within the window is suspicious
pub const MAX_RECENT_ACTIVE_SESSIONS: usize = 3;

/// Count the user's recently-active sessions.
///
/// A store failure propagates; the caller treats it as a check error
/// (fail-secure), never as "no anomaly".
pub fn check_rapid_session_switch(
    store: &dyn SessionStore,
    user_id: &str,
    now: i64,
) -> Result<CheckOutcome, PersistenceError> {
    let count = store.count_active_since(user_id, now - SWITCH_WINDOW_SECONDS)?;
    if count > MAX_RECENT_ACTIVE_SESSIONS {
        Ok(CheckOutcome::flagged(RISK_RAPID_SWITCHING))
    } else {
        Ok(CheckOutcome::clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::persistence::SqliteStore;

    const NOW: i64 = 1_700_000_000;

    fn seed_sessions(store: &SqliteStore, user: &str, count: usize, last_activity_at: i64) {
        for i in 0..count {
            let session = Session::new(
                format!("{}-{}", user, i),
                user,
                Some("192.168.1.1".to_string()),
                Some("Chrome/120.0".to_string()),
                last_activity_at,
            );
            store.insert_session(&session).unwrap();
        }
    }

    #[test]
    fn test_under_limit_is_clear() {
        let store = SqliteStore::in_memory().unwrap();
        seed_sessions(&store, "alice", 3, NOW - 60);

        let outcome = check_rapid_session_switch(&store, "alice", NOW).unwrap();
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_over_limit_is_flagged() {
        let store = SqliteStore::in_memory().unwrap();
        seed_sessions(&store, "alice", 4, NOW - 60);

        let outcome = check_rapid_session_switch(&store, "alice", NOW).unwrap();
        assert!(outcome.triggered);
        assert_eq!(outcome.risk_increase, RISK_RAPID_SWITCHING);
    }

    #[test]
    fn test_stale_sessions_do_not_count() {
        let store = SqliteStore::in_memory().unwrap();
        // Outside the 5 minute window
        seed_sessions(&store, "alice", 5, NOW - 600);

        let outcome = check_rapid_session_switch(&store, "alice", NOW).unwrap();
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_other_users_do_not_count() {
        let store = SqliteStore::in_memory().unwrap();
        seed_sessions(&store, "bob", 5, NOW - 60);

        let outcome = check_rapid_session_switch(&store, "alice", NOW).unwrap();
        assert!(!outcome.triggered);
    }
}
