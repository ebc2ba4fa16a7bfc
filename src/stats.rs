//! Historical anomaly statistics.
//!
//! Strictly read-side: a query failure degrades to an empty summary and
//! never affects enforcement decisions.

use crate::models::{SecurityEventType, Severity};
use crate::persistence::{EventStore, PersistenceError};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Default trailing window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
/// How many recent events the summary carries
pub const RECENT_EVENT_LIMIT: usize = 10;

/// One recent anomaly in the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAnomaly {
    pub timestamp: i64,
    pub severity: Severity,
    pub anomaly_types: Vec<String>,
    pub risk_score: u32,
}

/// Aggregated anomaly history for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyStatistics {
    pub total_anomalies: u64,
    pub anomalies_by_type: HashMap<String, u64>,
    pub recent_events: Vec<RecentAnomaly>,
    pub average_risk_score: f64,
}

impl AnomalyStatistics {
    /// The zeroed shape returned when the query fails or matches nothing.
    pub fn empty() -> Self {
        AnomalyStatistics {
            total_anomalies: 0,
            anomalies_by_type: HashMap::new(),
            recent_events: Vec::new(),
            average_risk_score: 0.0,
        }
    }
}

/// Read-side reporter over the security event store.
pub struct StatisticsReporter {
    events: Arc<dyn EventStore>,
}

impl StatisticsReporter {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        StatisticsReporter { events }
    }

    /// Summarize the user's anomaly events over the trailing window.
    ///
    /// Never fails: query errors are logged and reported as an empty
    /// summary.
    pub fn get_anomaly_statistics(&self, user_id: &str, days: i64) -> AnomalyStatistics {
        match self.collect(user_id, days) {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("Anomaly statistics query failed for user {}: {}", user_id, e);
                AnomalyStatistics::empty()
            }
        }
    }

    fn collect(&self, user_id: &str, days: i64) -> Result<AnomalyStatistics, PersistenceError> {
        let since = Utc::now().timestamp() - days * 86_400;
        let events = self.events.events_for_user(
            user_id,
            SecurityEventType::SessionAnomalyDetected,
            since,
        )?;

        let mut anomalies_by_type: HashMap<String, u64> = HashMap::new();
        for event in &events {
            for tag in split_tags(event) {
                *anomalies_by_type.entry(tag).or_insert(0) += 1;
            }
        }

        let recent_events = events
            .iter()
            .take(RECENT_EVENT_LIMIT)
            .map(|event| RecentAnomaly {
                timestamp: event.timestamp,
                severity: event.severity,
                anomaly_types: split_tags(event),
                risk_score: event.risk_score,
            })
            .collect();

        let average_risk_score = if events.is_empty() {
            0.0
        } else {
            events.iter().map(|e| e.risk_score as f64).sum::<f64>() / events.len() as f64
        };

        Ok(AnomalyStatistics {
            total_anomalies: events.len() as u64,
            anomalies_by_type,
            recent_events,
            average_risk_score,
        })
    }
}

/// Split the composite tag field stored on an event.
fn split_tags(event: &crate::models::SecurityEvent) -> Vec<String> {
    event
        .details
        .get("anomaly_types")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .split(',')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
