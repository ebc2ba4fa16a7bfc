pub mod assessment;
pub mod event;
pub mod session;

pub use assessment::{composite_tags, AnomalyAssessment, AnomalyType, SessionAction};
pub use event::{AuditEntry, SecurityEvent, SecurityEventType, Severity};
pub use session::{RequestContext, RevocationRecord, Session, SessionStatus};
