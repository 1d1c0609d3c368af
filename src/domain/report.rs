//! Report value types. Built fresh per computation and handed to the caller.

use serde::{Deserialize, Serialize};

/// A value aggregated over multiple beneficiaries, with its provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenAgg {
    pub value: f64,
    /// Beneficiaries whose values fed `value`. Sorted.
    #[serde(rename = "beneficiaryIDs")]
    pub beneficiary_ids: Vec<String>,
    /// Exclusions specific to this aggregate.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionAggregate {
    #[serde(rename = "questionID")]
    pub question_id: String,
    #[serde(flatten)]
    pub agg: BenAgg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    #[serde(rename = "categoryID")]
    pub category_id: String,
    #[serde(flatten)]
    pub agg: BenAgg,
}

/// Category value of a single meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingCategoryAggregate {
    #[serde(rename = "categoryID")]
    pub category_id: String,
    pub value: f64,
}

/// First, last and delta aggregates, one entry per question or category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates<T> {
    pub first: Vec<T>,
    pub last: Vec<T>,
    pub delta: Vec<T>,
}

/// Questions and categories for which no aggregate could be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Excluded {
    #[serde(rename = "categoryIDs")]
    pub category_ids: Vec<String>,
    #[serde(rename = "questionIDs")]
    pub question_ids: Vec<String>,
}

/// Journey-of-change report for one outcome set over one time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JocReport {
    #[serde(rename = "beneficiaryIDs")]
    pub beneficiary_ids: Vec<String>,
    pub question_aggregates: Aggregates<QuestionAggregate>,
    pub category_aggregates: Aggregates<CategoryAggregate>,
    pub excluded: Excluded,
    pub warnings: Vec<String>,
}
