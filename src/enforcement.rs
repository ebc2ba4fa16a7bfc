//! Forced re-authentication.
//!
//! Revokes a session and records the revocation in the event and audit
//! stores. The stored reason visible to session owners is always the
//! generic "security_concern"; the caller's free-text detail goes into
//! the revocation note and the audit trail only.

use crate::models::{
    AuditEntry, RevocationRecord, SecurityEvent, SecurityEventType, Severity,
};
use crate::persistence::{AuditStore, EventStore, PersistenceError, SessionStore};
use chrono::Utc;
use std::sync::Arc;

/// Generic revocation reason presented outside the audit trail.
pub const REVOCATION_REASON: &str = "security_concern";

/// Revokes sessions in response to FORCE_REAUTH decisions.
pub struct ReauthEnforcer {
    sessions: Arc<dyn SessionStore>,
    events: Arc<dyn EventStore>,
    audit: Arc<dyn AuditStore>,
}

impl ReauthEnforcer {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        events: Arc<dyn EventStore>,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        ReauthEnforcer {
            sessions,
            events,
            audit,
        }
    }

    /// Revoke a session. Returns `Ok(false)` when no such session exists.
    ///
    /// Event and audit writes are best-effort: a failed write is logged
    /// and the revocation still counts as enacted.
    pub fn force_reauthentication(
        &self,
        session_id: &str,
        reason: &str,
    ) -> Result<bool, PersistenceError> {
        let session = match self.sessions.get_session(session_id)? {
            Some(session) => session,
            None => return Ok(false),
        };

        let now = Utc::now().timestamp();
        let revocation = RevocationRecord {
            revoked_at: now,
            reason: REVOCATION_REASON.to_string(),
            note: reason.to_string(),
        };

        if !self.sessions.revoke_session(session_id, &revocation)? {
            return Ok(false);
        }

        let details = serde_json::json!({
            "session_id": session.id,
            "reason": reason,
        });

        let event = SecurityEvent {
            user_id: session.user_id.clone(),
            event_type: SecurityEventType::ForcedReauth,
            severity: Severity::High,
            ip_address: session.ip_address.clone().unwrap_or_default(),
            user_agent: session.user_agent.clone().unwrap_or_default(),
            details: details.clone(),
            // The session's stored (monotone) score at revocation time
            risk_score: session.risk_score,
            timestamp: now,
        };
        if let Err(e) = self.events.create_event(&event) {
            log::warn!(
                "Failed to record forced-reauth event for session {}: {}",
                session_id,
                e
            );
        }

        let entry = AuditEntry {
            user_id: session.user_id,
            action: SecurityEventType::ForcedReauth.as_str().to_string(),
            session_id: session.id,
            detail: details.to_string(),
            timestamp: now,
        };
        if let Err(e) = self.audit.create_audit_entry(&entry) {
            log::warn!(
                "Failed to record forced-reauth audit entry for session {}: {}",
                session_id,
                e
            );
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, SessionStatus};
    use crate::persistence::SqliteStore;

    fn make_enforcer(store: &Arc<SqliteStore>) -> ReauthEnforcer {
        ReauthEnforcer::new(store.clone(), store.clone(), store.clone())
    }

    #[test]
    fn test_unknown_session_returns_false() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enforcer = make_enforcer(&store);

        let revoked = enforcer
            .force_reauthentication("unknown-id", "test")
            .unwrap();
        assert!(!revoked);
    }

    #[test]
    fn test_revokes_and_records_event() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let session = Session::new(
            "sess-1",
            "alice",
            Some("192.168.1.1".to_string()),
            Some("Chrome/120.0".to_string()),
            1_700_000_000,
        );
        store.insert_session(&session).unwrap();
        let enforcer = make_enforcer(&store);

        let revoked = enforcer
            .force_reauthentication("sess-1", "impossible travel detected")
            .unwrap();
        assert!(revoked);

        let session = store.get_session("sess-1").unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Revoked);
        let revocation = session.revocation.unwrap();
        assert_eq!(revocation.reason, REVOCATION_REASON);
        assert_eq!(revocation.note, "impossible travel detected");

        let events = store
            .events_for_user("alice", SecurityEventType::ForcedReauth, 0)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::High);
        assert_eq!(events[0].details["session_id"], "sess-1");
    }

    #[test]
    fn test_revoking_twice_still_succeeds() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert_session(&Session::new("sess-1", "alice", None, None, 0))
            .unwrap();
        let enforcer = make_enforcer(&store);

        assert!(enforcer.force_reauthentication("sess-1", "first").unwrap());
        // The row still exists, so the update applies again
        assert!(enforcer.force_reauthentication("sess-1", "second").unwrap());

        let session = store.get_session("sess-1").unwrap().unwrap();
        assert_eq!(session.revocation.unwrap().note, "second");
    }
}
