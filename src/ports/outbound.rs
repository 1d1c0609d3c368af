//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, Identity, JocReport, Meeting, OutcomeSet, TimeWindow};
use std::path::Path;

/// Meeting store. Read-only access to outcome sets and the meetings recorded against them.
///
/// Every call carries the caller identity; implementations decide visibility.
/// Calls may fail independently of one another.
#[async_trait::async_trait]
pub trait MeetingStore: Send + Sync {
    /// Fetch an outcome set definition.
    ///
    /// # Errors
    /// `NotFound` if it does not exist, `Unauthorized` if the caller may not see it,
    /// `Unavailable` if the store cannot be reached.
    async fn get_outcome_set(
        &self,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<OutcomeSet, DomainError>;

    /// Fetch all meetings for the outcome set whose `conducted` time lies in `window` (inclusive).
    async fn get_meetings_in_range(
        &self,
        outcome_set_id: &str,
        window: &TimeWindow,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError>;

    /// Fetch a beneficiary's complete meeting history for the outcome set. No time bound.
    async fn get_meetings_for_beneficiary(
        &self,
        beneficiary_id: &str,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError>;
}

/// Export port. Write a finished report to a destination.
#[async_trait::async_trait]
pub trait ReportExportPort: Send + Sync {
    /// File extension produced by this exporter (without the dot).
    fn extension(&self) -> &'static str;

    async fn export(&self, report: &JocReport, dest: &Path) -> Result<(), DomainError>;
}
