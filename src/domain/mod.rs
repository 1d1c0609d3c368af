//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod report;

pub use entities::{
    Aggregation, Answer, AnswerValue, Category, Identity, LikertScale, Meeting, OutcomeSet,
    Question, QuestionKind, TimeWindow,
};
pub use errors::DomainError;
pub use report::{
    Aggregates, BenAgg, CategoryAggregate, Excluded, JocReport, MeetingCategoryAggregate,
    QuestionAggregate,
};
