use crate::models::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for the session-integrity engine.
///
/// Built once and passed into the detector at construction; nothing in
/// this crate mutates configuration after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Anomaly detection configuration
    pub detection: DetectionConfig,
    /// Webhook alerting configuration
    pub alerting: AlertConfig,
}

/// Tunables for the signal checks and action mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Require exact client-signature equality (no version-number tolerance)
    pub strict_user_agent_matching: bool,
    /// Treat an address change as routine roaming (lower risk contribution)
    pub allow_ip_change: bool,
    /// Address changes within this many minutes of the last activity are
    /// flagged as implausible travel
    pub impossible_travel_threshold_minutes: i64,
    /// Risk score thresholds for the action mapping
    pub risk_thresholds: RiskThresholds,
}

/// Ordered risk thresholds; each score maps to the highest threshold met.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

/// Webhook alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Master switch for alert dispatch
    pub enabled: bool,
    /// Minimum event severity worth notifying about
    pub min_severity: Severity,
    /// Generic webhook endpoints
    pub webhooks: Vec<WebhookConfig>,
}

/// A single webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Name used in logs
    pub name: String,
    /// Endpoint URL
    pub url: String,
    /// HTTP method: "POST" (default) or "PUT"
    pub method: Option<String>,
    /// Extra request headers
    pub headers: Option<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            detection: DetectionConfig::default(),
            alerting: AlertConfig {
                enabled: false,
                min_severity: Severity::High,
                webhooks: Vec::new(),
            },
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            strict_user_agent_matching: false,
            allow_ip_change: false,
            impossible_travel_threshold_minutes: 60,
            risk_thresholds: RiskThresholds::default(),
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            low: 25,
            medium: 50,
            high: 75,
            critical: 90,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();

        assert!(!config.detection.strict_user_agent_matching);
        assert!(!config.detection.allow_ip_change);
        assert_eq!(config.detection.impossible_travel_threshold_minutes, 60);

        let thresholds = config.detection.risk_thresholds;
        assert_eq!(thresholds.low, 25);
        assert_eq!(thresholds.medium, 50);
        assert_eq!(thresholds.high, 75);
        assert_eq!(thresholds.critical, 90);

        assert!(!config.alerting.enabled);
        assert_eq!(config.alerting.min_severity, Severity::High);
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.detection.allow_ip_change = true;
        config.detection.impossible_travel_threshold_minutes = 30;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(loaded.detection.allow_ip_change);
        assert_eq!(loaded.detection.impossible_travel_threshold_minutes, 30);
        assert_eq!(loaded.detection.risk_thresholds.high, 75);
    }
}
