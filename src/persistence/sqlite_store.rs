//! SQLite implementation of the store traits

use super::{AuditStore, EventStore, PersistenceError, SessionStore};
use crate::models::{
    composite_tags, AnomalyType, AuditEntry, RevocationRecord, SecurityEvent, SecurityEventType,
    Session, SessionStatus, Severity,
};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed session, event, and audit storage
///
/// All three store traits are implemented over a single database so the
/// engine can be wired up with one handle. The security-metadata update is
/// a single UPDATE statement, which SQLite executes atomically.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, PersistenceError> {
        let conn = Connection::open(db_path)?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn session_from_row(row: &Row<'_>) -> rusqlite::Result<(Session, String)> {
        let status_tag: String = row.get(2)?;
        let flags: String = row.get(6)?;
        let revoked_at: Option<i64> = row.get(8)?;
        let revoked_reason: Option<String> = row.get(9)?;
        let revoked_note: Option<String> = row.get(10)?;

        let session = Session {
            id: row.get(0)?,
            user_id: row.get(1)?,
            // status filled in by the caller after tag validation
            status: SessionStatus::Active,
            ip_address: row.get(3)?,
            user_agent: row.get(4)?,
            last_activity_at: row.get(5)?,
            anomaly_flags: flags
                .split(',')
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            risk_score: row.get(7)?,
            revocation: revoked_at.map(|at| RevocationRecord {
                revoked_at: at,
                reason: revoked_reason.unwrap_or_default(),
                note: revoked_note.unwrap_or_default(),
            }),
        };

        Ok((session, status_tag))
    }

    fn event_from_row(row: &Row<'_>) -> rusqlite::Result<(SecurityEvent, String, String, String)> {
        let event_type_tag: String = row.get(1)?;
        let severity_tag: String = row.get(2)?;
        let details_raw: String = row.get(5)?;

        let event = SecurityEvent {
            user_id: row.get(0)?,
            // type/severity filled in by the caller after tag validation
            event_type: SecurityEventType::SessionAnomalyDetected,
            severity: Severity::Low,
            ip_address: row.get(3)?,
            user_agent: row.get(4)?,
            details: serde_json::Value::Null,
            risk_score: row.get(6)?,
            timestamp: row.get(7)?,
        };

        Ok((event, event_type_tag, severity_tag, details_raw))
    }
}

impl SessionStore for SqliteStore {
    fn get_session(&self, session_id: &str) -> Result<Option<Session>, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, status, ip_address, user_agent, last_activity_at,
                    anomaly_flags, risk_score, revoked_at, revoked_reason, revoked_note
             FROM sessions WHERE id = ?",
        )?;

        let result = stmt.query_row(params![session_id], Self::session_from_row);

        match result {
            Ok((mut session, status_tag)) => {
                session.status = SessionStatus::from_tag(&status_tag).ok_or_else(|| {
                    PersistenceError::InvalidData(format!("Unknown session status: {}", status_tag))
                })?;
                Ok(Some(session))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_session(&self, session: &Session) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions
             (id, user_id, status, ip_address, user_agent, last_activity_at,
              anomaly_flags, risk_score, revoked_at, revoked_reason, revoked_note)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                session.id,
                session.user_id,
                session.status.as_str(),
                session.ip_address,
                session.user_agent,
                session.last_activity_at,
                session.anomaly_flags.join(","),
                session.risk_score,
                session.revocation.as_ref().map(|r| r.revoked_at),
                session.revocation.as_ref().map(|r| r.reason.clone()),
                session.revocation.as_ref().map(|r| r.note.clone()),
            ],
        )?;
        Ok(())
    }

    fn apply_security_update(
        &self,
        session_id: &str,
        anomaly_types: &[AnomalyType],
        risk_score: u32,
    ) -> Result<(), PersistenceError> {
        let tags = composite_tags(anomaly_types);
        let conn = self.conn.lock().unwrap();
        // One statement: MAX keeps the score monotone under concurrent
        // writers, and the append never drops a concurrent tag.
        conn.execute(
            "UPDATE sessions SET
                 risk_score = MAX(risk_score, ?2),
                 anomaly_flags = CASE
                     WHEN anomaly_flags = '' THEN ?3
                     WHEN ?3 = '' THEN anomaly_flags
                     ELSE anomaly_flags || ',' || ?3
                 END
             WHERE id = ?1",
            params![session_id, risk_score, tags],
        )?;
        Ok(())
    }

    fn revoke_session(
        &self,
        session_id: &str,
        revocation: &RevocationRecord,
    ) -> Result<bool, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE sessions SET
                 status = 'revoked',
                 revoked_at = ?2,
                 revoked_reason = ?3,
                 revoked_note = ?4
             WHERE id = ?1",
            params![
                session_id,
                revocation.revoked_at,
                revocation.reason,
                revocation.note
            ],
        )?;
        Ok(changed > 0)
    }

    fn count_active_since(&self, user_id: &str, since: i64) -> Result<usize, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sessions
             WHERE user_id = ? AND status = 'active' AND last_activity_at >= ?",
            params![user_id, since],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn touch_session(&self, session_id: &str, at: i64) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sessions SET last_activity_at = ?2 WHERE id = ?1",
            params![session_id, at],
        )?;
        Ok(())
    }
}

impl EventStore for SqliteStore {
    fn create_event(&self, event: &SecurityEvent) -> Result<i64, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO security_events
             (user_id, event_type, severity, ip_address, user_agent, details,
              risk_score, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                event.user_id,
                event.event_type.as_str(),
                event.severity.as_str(),
                event.ip_address,
                event.user_agent,
                event.details.to_string(),
                event.risk_score,
                event.timestamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn events_for_user(
        &self,
        user_id: &str,
        event_type: SecurityEventType,
        since: i64,
    ) -> Result<Vec<SecurityEvent>, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, event_type, severity, ip_address, user_agent, details,
                    risk_score, timestamp
             FROM security_events
             WHERE user_id = ? AND event_type = ? AND timestamp >= ?
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(
                params![user_id, event_type.as_str(), since],
                Self::event_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut events = Vec::with_capacity(rows.len());
        for (mut event, type_tag, severity_tag, details_raw) in rows {
            event.event_type = SecurityEventType::from_tag(&type_tag).ok_or_else(|| {
                PersistenceError::InvalidData(format!("Unknown event type: {}", type_tag))
            })?;
            event.severity = Severity::from_tag(&severity_tag).ok_or_else(|| {
                PersistenceError::InvalidData(format!("Unknown severity: {}", severity_tag))
            })?;
            event.details = serde_json::from_str(&details_raw).map_err(|e| {
                PersistenceError::InvalidData(format!("Malformed event details: {}", e))
            })?;
            events.push(event);
        }

        Ok(events)
    }
}

impl AuditStore for SqliteStore {
    fn create_audit_entry(&self, entry: &AuditEntry) -> Result<i64, PersistenceError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audit_log (user_id, action, session_id, detail, timestamp)
             VALUES (?, ?, ?, ?, ?)",
            params![
                entry.user_id,
                entry.action,
                entry.session_id,
                entry.detail,
                entry.timestamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
