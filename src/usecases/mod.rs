//! Application use cases. Orchestrate domain logic via ports.

pub mod category_aggregator;
pub mod cohort;
pub mod question_aggregator;
pub mod report_service;
pub mod selector;

pub use category_aggregator::{aggregate_categories, meeting_category_aggregates};
pub use question_aggregator::aggregate_questions;
pub use report_service::ReportService;
pub use selector::{BeneficiaryRecord, MeetingSelector, Selection};
