//! Durable-event and audit-trail writer for detected anomalies.
//!
//! Everything here is a separate failure domain from the returned
//! decision: a failed write is logged for operators and swallowed, never
//! surfaced to the caller of the detection path.

use crate::alerting::AlertQueue;
use crate::config::RiskThresholds;
use crate::detection::risk;
use crate::models::{
    composite_tags, AnomalyType, AuditEntry, RequestContext, SecurityEvent, SecurityEventType,
    Session,
};
use crate::persistence::{AuditStore, EventStore, SessionStore};
use std::sync::Arc;

/// Writes security events, mirrored audit entries, and session security
/// metadata for every detected anomaly.
pub struct AnomalyLogger {
    sessions: Arc<dyn SessionStore>,
    events: Arc<dyn EventStore>,
    audit: Arc<dyn AuditStore>,
    alerts: Option<AlertQueue>,
    thresholds: RiskThresholds,
}

impl AnomalyLogger {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        events: Arc<dyn EventStore>,
        audit: Arc<dyn AuditStore>,
        thresholds: RiskThresholds,
    ) -> Self {
        AnomalyLogger {
            sessions,
            events,
            audit,
            alerts: None,
            thresholds,
        }
    }

    /// Attach an alert queue; high-severity events get queued for webhook
    /// dispatch without blocking the detection path.
    pub fn with_alerts(mut self, alerts: AlertQueue) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Record one detected anomaly.
    ///
    /// Never returns an error: the decision has already been made and must
    /// not depend on whether these writes land.
    pub fn log_session_anomaly(
        &self,
        session: &Session,
        anomaly_types: &[AnomalyType],
        risk_score: u32,
        ctx: &RequestContext,
        now: i64,
    ) {
        let severity = risk::severity_for_score(risk_score, &self.thresholds);
        let tags = composite_tags(anomaly_types);
        let reason = format!("Session anomaly detected: {}", tags);

        let details = serde_json::json!({
            "session_id": session.id,
            "anomaly_types": tags,
            "previous_ip": session.ip_address,
            "current_ip": ctx.ip_address,
            "previous_user_agent": session.user_agent,
            "current_user_agent": ctx.user_agent,
            "reason": reason,
        });

        let event = SecurityEvent {
            user_id: session.user_id.clone(),
            event_type: SecurityEventType::SessionAnomalyDetected,
            severity,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            details: details.clone(),
            risk_score,
            timestamp: now,
        };

        if let Err(e) = self.events.create_event(&event) {
            log::warn!(
                "Failed to record security event for session {}: {}",
                session.id,
                e
            );
        }

        let entry = AuditEntry {
            user_id: session.user_id.clone(),
            action: SecurityEventType::SessionAnomalyDetected.as_str().to_string(),
            session_id: session.id.clone(),
            detail: details.to_string(),
            timestamp: now,
        };
        if let Err(e) = self.audit.create_audit_entry(&entry) {
            log::warn!(
                "Failed to record audit entry for session {}: {}",
                session.id,
                e
            );
        }

        // Atomic at the storage layer: max(prior, new) score, flags appended
        if let Err(e) = self
            .sessions
            .apply_security_update(&session.id, anomaly_types, risk_score)
        {
            log::warn!(
                "Failed to update security metadata for session {}: {}",
                session.id,
                e
            );
        }

        if let Some(ref alerts) = self.alerts {
            alerts.queue_alert(event);
        }
    }
}
