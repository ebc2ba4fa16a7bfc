//! Per-request session-integrity evaluator.
//!
//! One call per authenticated inbound request; no state is held between
//! calls. Every internal error resolves toward the most restrictive
//! outcome rather than a permissive default.

use super::{risk, rule_impossible_travel, rule_ip_drift, rule_session_switch, rule_user_agent};
use crate::audit::AnomalyLogger;
use crate::config::DetectionConfig;
use crate::models::{AnomalyAssessment, AnomalyType, RequestContext, SessionStatus};
use crate::persistence::{PersistenceError, SessionStore};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Errors internal to one evaluation; callers never see these because the
/// public entry point converts them into the fail-secure assessment.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Orchestrates the signal checks and the risk aggregation for one
/// session/request pair.
pub struct AnomalyDetector {
    config: DetectionConfig,
    sessions: Arc<dyn SessionStore>,
    logger: AnomalyLogger,
}

impl AnomalyDetector {
    pub fn new(
        config: DetectionConfig,
        sessions: Arc<dyn SessionStore>,
        logger: AnomalyLogger,
    ) -> Self {
        AnomalyDetector {
            config,
            sessions,
            logger,
        }
    }

    /// Evaluate one request against its claimed session.
    ///
    /// Never fails: any error during evaluation yields the CHECK_ERROR
    /// assessment (risk 75, FORCE_REAUTH).
    pub fn check_session_anomaly(
        &self,
        session_id: &str,
        ctx: &RequestContext,
    ) -> AnomalyAssessment {
        let now = Utc::now().timestamp();
        match self.evaluate(session_id, ctx, now) {
            Ok(assessment) => assessment,
            Err(e) => {
                log::error!("Anomaly check failed for session {}: {}", session_id, e);
                AnomalyAssessment::check_error()
            }
        }
    }

    fn evaluate(
        &self,
        session_id: &str,
        ctx: &RequestContext,
        now: i64,
    ) -> Result<AnomalyAssessment, DetectionError> {
        let session = match self.sessions.get_session(session_id)? {
            Some(session) => session,
            None => return Ok(AnomalyAssessment::session_not_found()),
        };

        if session.status != SessionStatus::Active {
            return Ok(AnomalyAssessment::session_inactive());
        }

        let mut anomaly_types = Vec::new();
        let mut risk_score = 0u32;

        let ip_drift = rule_ip_drift::check_ip_drift(
            session.ip_address.as_deref(),
            &ctx.ip_address,
            self.config.allow_ip_change,
        );
        if ip_drift.triggered {
            anomaly_types.push(AnomalyType::IpDrift);
            risk_score += ip_drift.risk_increase;
        }

        let ua_drift = rule_user_agent::check_user_agent_drift(
            session.user_agent.as_deref(),
            &ctx.user_agent,
            self.config.strict_user_agent_matching,
        )?;
        if ua_drift.triggered {
            anomaly_types.push(AnomalyType::UserAgentDrift);
            risk_score += ua_drift.risk_increase;
        }

        // Travel plausibility only applies after the address actually moved
        if ip_drift.triggered && session.ip_address.is_some() {
            let travel = rule_impossible_travel::check_impossible_travel(
                session.last_activity_at,
                now,
                self.config.impossible_travel_threshold_minutes,
                true,
            );
            if travel.triggered {
                anomaly_types.push(AnomalyType::ImpossibleTravel);
                risk_score += travel.risk_increase;
            }
        }

        // Always evaluated for the owning user, drift or not
        let switching = rule_session_switch::check_rapid_session_switch(
            self.sessions.as_ref(),
            &session.user_id,
            now,
        )?;
        if switching.triggered {
            anomaly_types.push(AnomalyType::RapidSessionSwitching);
            risk_score += switching.risk_increase;
        }

        let has_anomaly = !anomaly_types.is_empty();
        let action = risk::action_for_score(risk_score, &self.config.risk_thresholds);

        if has_anomaly {
            self.logger
                .log_session_anomaly(&session, &anomaly_types, risk_score, ctx, now);
        }

        Ok(AnomalyAssessment {
            has_anomaly,
            anomaly_types,
            risk_score,
            action,
        })
    }
}
