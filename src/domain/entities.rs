//! Domain entities. Pure data structures for the core business.
//!
//! No storage/IO types here — adapters map rows and files into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Caller identity threaded through every store call. Opaque to the report core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub organisation_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, organisation_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organisation_id: organisation_id.into(),
        }
    }
}

/// Inclusive `[start, end]` range over a meeting's `conducted` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// The recorded value of an answer, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "answer", rename_all = "lowercase")]
pub enum AnswerValue {
    Int(i64),
}

/// A single answer to one question within a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(rename = "questionID")]
    pub question_id: String,
    #[serde(flatten)]
    pub value: AnswerValue,
}

impl Answer {
    pub fn int(question_id: impl Into<String>, value: i64) -> Self {
        Self {
            question_id: question_id.into(),
            value: AnswerValue::Int(value),
        }
    }
}

/// One administration of an outcome set to one beneficiary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub beneficiary: String,
    /// Who collected the answers.
    #[serde(default)]
    pub user: String,
    #[serde(rename = "outcomeSetID")]
    pub outcome_set_id: String,
    #[serde(rename = "organisationID")]
    pub organisation_id: String,
    pub conducted: DateTime<Utc>,
    /// Audit timestamps; the Unix epoch when absent.
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Meeting {
    /// The answer recorded for `question_id`, if the beneficiary gave one.
    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Numeric value answered for `question` in this meeting.
    ///
    /// `None` when the question was not answered, or when its kind does not
    /// decode the recorded answer as a number. Not answering is common and is
    /// not an error.
    pub fn value_for(&self, question: &Question) -> Option<f64> {
        self.answer_for(&question.id)
            .and_then(|a| question.kind.numeric_value(&a.value))
    }
}

/// Options of a Likert (integer scale) question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikertScale {
    #[serde(default)]
    pub min_value: Option<i64>,
    #[serde(default)]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub min_label: Option<String>,
    #[serde(default)]
    pub max_label: Option<String>,
}

/// Question kind with its type-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Likert(LikertScale),
}

impl QuestionKind {
    /// Whether answers to this kind take part in numeric aggregation.
    pub fn is_numeric(&self) -> bool {
        match self {
            QuestionKind::Likert(_) => true,
        }
    }

    /// Decodes an answer as a number under this kind's rule.
    /// A mismatched answer kind yields `None` rather than a coerced value.
    pub fn numeric_value(&self, answer: &AnswerValue) -> Option<f64> {
        match (self, answer) {
            (QuestionKind::Likert(_), AnswerValue::Int(v)) => Some(*v as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default, rename = "categoryID")]
    pub category_id: Option<String>,
    /// Archived questions remain answerable historically.
    #[serde(default, alias = "deleted")]
    pub archived: bool,
}

impl Question {
    pub fn likert(id: impl Into<String>, category_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            question: String::new(),
            kind: QuestionKind::Likert(LikertScale::default()),
            category_id: category_id.map(str::to_string),
            archived: false,
        }
    }
}

/// Combination function applied across a category's questions within one meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    Mean,
    Sum,
}

impl Aggregation {
    /// Reduces `values`. `None` for an empty slice.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        match self {
            Aggregation::Sum => Some(sum),
            Aggregation::Mean => Some(sum / values.len() as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub aggregation: Aggregation,
}

impl Category {
    pub fn new(id: impl Into<String>, aggregation: Aggregation) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: None,
            aggregation,
        }
    }
}

/// A questionnaire used to measure beneficiary outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSet {
    pub id: String,
    #[serde(rename = "organisationID")]
    pub organisation_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl OutcomeSet {
    /// Questions assigned to `category_id`, in definition order.
    pub fn questions_in_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions
            .iter()
            .filter(move |q| q.category_id.as_deref() == Some(category_id))
    }

    /// A copy of this outcome set with archived questions dropped.
    pub fn without_archived(&self) -> OutcomeSet {
        OutcomeSet {
            questions: self
                .questions
                .iter()
                .filter(|q| !q.archived)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}
