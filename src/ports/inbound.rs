//! Inbound port. UI (adapter) calls into the application.

use crate::domain::{DomainError, Identity, TimeWindow};

/// Everything needed to compute one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub outcome_set_id: String,
    pub window: TimeWindow,
    pub identity: Identity,
}

/// Input port: UI/CLI supplies what to report on.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Obtain the outcome set, window and caller for the next report.
    async fn request_report(&self) -> Result<ReportRequest, DomainError>;
}
