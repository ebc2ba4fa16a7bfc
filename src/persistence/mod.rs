//! Persistence contracts consumed by the detection engine.
//!
//! The engine never performs its own locking; the security-metadata update
//! is a single conditional statement at the storage layer so concurrent
//! evaluations of the same session cannot lose updates.

pub mod sqlite_store;

pub use sqlite_store::SqliteStore;

use crate::models::{
    AnomalyType, AuditEntry, RevocationRecord, SecurityEvent, SecurityEventType, Session,
};
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data in database: {0}")]
    InvalidData(String),
}

/// Read/write contract for the externally-owned session records.
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id
    fn get_session(&self, session_id: &str) -> Result<Option<Session>, PersistenceError>;

    /// Create a session record (performed by the login flow, exposed here
    /// for the CLI and tests)
    fn insert_session(&self, session: &Session) -> Result<(), PersistenceError>;

    /// Append anomaly tags and raise the stored risk score.
    ///
    /// Must be atomic and order-independent: the stored score becomes
    /// `max(prior, risk_score)` and the tags are appended without
    /// deduplication, in one conditional write.
    fn apply_security_update(
        &self,
        session_id: &str,
        anomaly_types: &[AnomalyType],
        risk_score: u32,
    ) -> Result<(), PersistenceError>;

    /// Mark a session revoked. Returns false when no such session exists.
    fn revoke_session(
        &self,
        session_id: &str,
        revocation: &RevocationRecord,
    ) -> Result<bool, PersistenceError>;

    /// Count the user's active sessions with activity at or after `since`
    fn count_active_since(&self, user_id: &str, since: i64) -> Result<usize, PersistenceError>;

    /// Record request activity on a session
    fn touch_session(&self, session_id: &str, at: i64) -> Result<(), PersistenceError>;
}

/// Append-only store for security events.
pub trait EventStore: Send + Sync {
    /// Persist one event, returning its row id
    fn create_event(&self, event: &SecurityEvent) -> Result<i64, PersistenceError>;

    /// Events of one type for a user since a timestamp, newest first
    fn events_for_user(
        &self,
        user_id: &str,
        event_type: SecurityEventType,
        since: i64,
    ) -> Result<Vec<SecurityEvent>, PersistenceError>;
}

/// Append-only store for the audit trail.
pub trait AuditStore: Send + Sync {
    /// Persist one audit entry, returning its row id
    fn create_audit_entry(&self, entry: &AuditEntry) -> Result<i64, PersistenceError>;
}
