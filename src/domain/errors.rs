//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No meetings were conducted in the requested window; there is nothing to report on.
    #[error("No meetings for outcome set {outcome_set_id} between {start} and {end}")]
    NoDataInRange {
        outcome_set_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid time window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
