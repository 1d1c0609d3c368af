//! Three-beneficiary scenario shared by unit tests.
//!
//! B1 and B2 have two meetings each, B3 has three; Q1..Q4 split into C1={Q1,Q2}
//! and C2={Q3,Q4}, both mean-aggregated.

use crate::adapters::persistence::memory_store::Dataset;
use crate::domain::{
    Aggregation, Answer, Category, Identity, Meeting, OutcomeSet, Question, TimeWindow,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const OUTCOME_SET_ID: &str = "qid";
pub const ORGANISATION_ID: &str = "org1";

pub fn identity() -> Identity {
    Identity::new("u1", ORGANISATION_ID)
}

pub fn end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn start() -> DateTime<Utc> {
    end() - Duration::hours(24)
}

pub fn window() -> TimeWindow {
    TimeWindow::new(start(), end()).unwrap()
}

pub fn outcome_set() -> OutcomeSet {
    OutcomeSet {
        id: OUTCOME_SET_ID.to_string(),
        organisation_id: ORGANISATION_ID.to_string(),
        name: "Wellbeing".to_string(),
        description: None,
        questions: vec![
            Question::likert("Q1", Some("C1")),
            Question::likert("Q2", Some("C1")),
            Question::likert("Q3", Some("C2")),
            Question::likert("Q4", Some("C2")),
        ],
        categories: vec![
            Category::new("C1", Aggregation::Mean),
            Category::new("C2", Aggregation::Mean),
        ],
    }
}

/// A meeting answering Q1..Q4 with `values`, in that order.
pub fn meeting(
    id: &str,
    beneficiary: &str,
    conducted: DateTime<Utc>,
    values: [i64; 4],
) -> Meeting {
    let answers = ["Q1", "Q2", "Q3", "Q4"]
        .iter()
        .zip(values)
        .map(|(q, v)| Answer::int(*q, v))
        .collect();
    Meeting {
        id: id.to_string(),
        beneficiary: beneficiary.to_string(),
        user: "u1".to_string(),
        outcome_set_id: OUTCOME_SET_ID.to_string(),
        organisation_id: ORGANISATION_ID.to_string(),
        conducted,
        created: conducted,
        modified: conducted,
        answers,
    }
}

pub fn meetings() -> Vec<Meeting> {
    let (start, end) = (start(), end());
    vec![
        meeting("B1M1", "B1", start - Duration::hours(84), [5, 5, 5, 5]),
        meeting("B1M2", "B1", end, [9, 8, 8, 5]),
        meeting("B2M1", "B2", start + Duration::hours(1), [6, 2, 7, 4]),
        meeting("B2M2", "B2", end, [2, 2, 3, 5]),
        meeting("B3M1", "B3", start - Duration::hours(1), [1, 2, 3, 4]),
        meeting("B3M2", "B3", start + Duration::hours(1), [10, 10, 10, 10]),
        meeting("B3M3", "B3", end, [5, 5, 5, 6]),
    ]
}

pub fn dataset() -> Dataset {
    Dataset {
        outcome_sets: vec![outcome_set()],
        meetings: meetings(),
    }
}

pub fn find(id: &str) -> Meeting {
    meetings().into_iter().find(|m| m.id == id).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
