pub mod alerting;
pub mod audit;
pub mod config;
pub mod detection;
pub mod enforcement;
pub mod models;
pub mod persistence;
pub mod stats;

// Re-export commonly used types
pub use alerting::{AlertDispatcher, AlertQueue};
pub use audit::AnomalyLogger;
pub use config::{Config, DetectionConfig, RiskThresholds};
pub use detection::AnomalyDetector;
pub use enforcement::ReauthEnforcer;
pub use models::{
    AnomalyAssessment, AnomalyType, RequestContext, SecurityEvent, Session, SessionAction,
};
pub use persistence::{AuditStore, EventStore, SessionStore, SqliteStore};
pub use stats::{AnomalyStatistics, StatisticsReporter};
