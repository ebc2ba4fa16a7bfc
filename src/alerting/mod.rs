//! Alerting module for webhook notifications
//!
//! High-severity security events are queued from the synchronous detection
//! path and dispatched asynchronously, so the decision never waits on
//! notification latency.

use crate::config::{AlertConfig, WebhookConfig};
use crate::models::SecurityEvent;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during alert dispatch
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Alert channel closed")]
    ChannelClosed,
}

/// Async alert dispatcher
///
/// Runs as a tokio task, receiving security events from the queue and
/// posting them to every configured webhook.
pub struct AlertDispatcher {
    config: AlertConfig,
    client: Client,
}

impl AlertDispatcher {
    /// Create a new alert dispatcher with the given configuration
    pub fn new(config: AlertConfig) -> Self {
        AlertDispatcher {
            config,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create the channel pair connecting producers to the dispatcher
    pub fn create_channel() -> (mpsc::Sender<SecurityEvent>, mpsc::Receiver<SecurityEvent>) {
        mpsc::channel(100)
    }

    /// Run the alert dispatch loop
    ///
    /// Should be spawned as a tokio task. Exits when every sender is
    /// dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<SecurityEvent>) {
        log::info!("Alert dispatcher started");

        while let Some(event) = rx.recv().await {
            if !self.config.enabled {
                continue;
            }

            if event.severity < self.config.min_severity {
                log::debug!(
                    "Skipping alert for {} event (severity {} below minimum {})",
                    event.event_type.as_str(),
                    event.severity.as_str(),
                    self.config.min_severity.as_str()
                );
                continue;
            }

            log::info!(
                "Dispatching alert: {} for user {} (severity {})",
                event.event_type.as_str(),
                event.user_id,
                event.severity.as_str()
            );

            for webhook in &self.config.webhooks {
                if let Err(e) = self.post_webhook(webhook, &event).await {
                    log::error!("Webhook {} failed: {}", webhook.name, e);
                }
            }
        }

        log::info!("Alert dispatcher stopped");
    }

    /// Post one event to one webhook
    async fn post_webhook(
        &self,
        config: &WebhookConfig,
        event: &SecurityEvent,
    ) -> Result<(), AlertError> {
        let method = config.method.as_deref().unwrap_or("POST");

        let mut request = match method.to_uppercase().as_str() {
            "PUT" => self.client.put(&config.url),
            _ => self.client.post(&config.url),
        };

        if let Some(ref headers) = config.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        let response = request.json(event).send().await?;

        if !response.status().is_success() {
            log::warn!(
                "Webhook {} returned non-success status: {}",
                config.name,
                response.status()
            );
        }

        Ok(())
    }
}

/// Synchronous handle for queueing alerts from detection code
#[derive(Clone)]
pub struct AlertQueue {
    tx: mpsc::Sender<SecurityEvent>,
}

impl AlertQueue {
    pub fn new(tx: mpsc::Sender<SecurityEvent>) -> Self {
        AlertQueue { tx }
    }

    /// Queue an event for dispatch (non-blocking)
    ///
    /// Uses try_send so the detection path never waits; a full queue drops
    /// the alert with a warning.
    pub fn queue_alert(&self, event: SecurityEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    log::warn!("Alert queue full, dropping alert");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    log::warn!("Alert queue closed");
                }
            }
        }
    }

    /// Queue an event (async version)
    pub async fn queue_alert_async(&self, event: SecurityEvent) -> Result<(), AlertError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| AlertError::ChannelClosed)
    }

    /// Check if the queue is closed
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SecurityEventType, Severity};

    fn create_test_event(severity: Severity) -> SecurityEvent {
        SecurityEvent {
            user_id: "alice".to_string(),
            event_type: SecurityEventType::SessionAnomalyDetected,
            severity,
            ip_address: "10.0.0.1".to_string(),
            user_agent: "Chrome/120.0".to_string(),
            details: serde_json::json!({
                "session_id": "sess-1",
                "anomaly_types": "IP_DRIFT",
            }),
            risk_score: 75,
            timestamp: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn test_alert_queue_send() {
        let (tx, mut rx) = AlertDispatcher::create_channel();
        let queue = AlertQueue::new(tx);

        queue.queue_alert(create_test_event(Severity::High));

        let received = rx.recv().await;
        assert!(received.is_some());
        assert_eq!(received.unwrap().user_id, "alice");
    }

    #[tokio::test]
    async fn test_alert_queue_async_send() {
        let (tx, mut rx) = AlertDispatcher::create_channel();
        let queue = AlertQueue::new(tx);

        queue
            .queue_alert_async(create_test_event(Severity::Critical))
            .await
            .unwrap();

        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_queue_closed_detection() {
        let (tx, rx) = AlertDispatcher::create_channel();
        let queue = AlertQueue::new(tx);

        assert!(!queue.is_closed());
        drop(rx);
        assert!(queue.is_closed());

        // Dropping into a closed queue must not panic
        queue.queue_alert(create_test_event(Severity::High));
    }

    #[test]
    fn test_severity_filter_comparison() {
        let config = AlertConfig {
            enabled: true,
            min_severity: Severity::High,
            webhooks: vec![],
        };

        assert!(create_test_event(Severity::Medium).severity < config.min_severity);
        assert!(create_test_event(Severity::Critical).severity >= config.min_severity);
    }
}
