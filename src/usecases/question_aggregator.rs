//! Question-level aggregation across qualifying beneficiaries.

use crate::domain::{Aggregates, OutcomeSet, QuestionAggregate};
use crate::usecases::cohort::{self, PairedValue};
use crate::usecases::selector::BeneficiaryRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// Question aggregates plus the questions that produced none.
#[derive(Debug, Default)]
pub struct QuestionAggregation {
    pub aggregates: Aggregates<QuestionAggregate>,
    pub excluded: Vec<String>,
}

/// Aggregate every question of `outcome_set`, in definition order.
pub fn aggregate_questions(
    outcome_set: &OutcomeSet,
    records: &BTreeMap<String, BeneficiaryRecord>,
) -> QuestionAggregation {
    let mut out = QuestionAggregation::default();

    for question in &outcome_set.questions {
        if !question.kind.is_numeric() {
            debug!(question = %question.id, "non-numeric question excluded");
            out.excluded.push(question.id.clone());
            continue;
        }

        let values: Vec<PairedValue<'_>> = records
            .values()
            .map(|r| PairedValue {
                beneficiary: &r.beneficiary_id,
                first: r.first.value_for(question),
                last: r.last.value_for(question),
            })
            .collect();

        let subject = format!("question {}", question.id);
        let Some(folded) = cohort::fold(&subject, &values) else {
            debug!(question = %question.id, "no beneficiary answered in both meetings");
            out.excluded.push(question.id.clone());
            continue;
        };

        let wrap = |agg| QuestionAggregate {
            question_id: question.id.clone(),
            agg,
        };
        out.aggregates.first.push(wrap(folded.first));
        out.aggregates.last.push(wrap(folded.last));
        out.aggregates.delta.push(wrap(folded.delta));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Answer;
    use crate::fixtures::{self, assert_close};

    fn fixture_records() -> BTreeMap<String, BeneficiaryRecord> {
        [("B1", "B1M1", "B1M2"), ("B2", "B2M1", "B2M2"), ("B3", "B3M1", "B3M3")]
            .into_iter()
            .map(|(b, first, last)| {
                (
                    b.to_string(),
                    BeneficiaryRecord {
                        beneficiary_id: b.to_string(),
                        first: fixtures::find(first),
                        last: fixtures::find(last),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_fixture_question_aggregates() {
        let out = aggregate_questions(&fixtures::outcome_set(), &fixture_records());
        assert!(out.excluded.is_empty());

        let firsts: Vec<f64> = out.aggregates.first.iter().map(|a| a.agg.value).collect();
        let lasts: Vec<f64> = out.aggregates.last.iter().map(|a| a.agg.value).collect();
        let deltas: Vec<f64> = out.aggregates.delta.iter().map(|a| a.agg.value).collect();
        for (got, want) in firsts.iter().zip([4.0, 3.0, 5.0, 13.0 / 3.0]) {
            assert_close(*got, want);
        }
        for (got, want) in lasts.iter().zip([16.0 / 3.0, 5.0, 16.0 / 3.0, 16.0 / 3.0]) {
            assert_close(*got, want);
        }
        for (got, want) in deltas.iter().zip([4.0 / 3.0, 2.0, 1.0 / 3.0, 1.0]) {
            assert_close(*got, want);
        }
        assert_eq!(out.aggregates.first[0].question_id, "Q1");
        assert_eq!(
            out.aggregates.delta[3].agg.beneficiary_ids,
            vec!["B1", "B2", "B3"]
        );
    }

    #[test]
    fn test_unanswered_question_is_excluded() {
        let mut os = fixtures::outcome_set();
        os.questions.push(crate::domain::Question::likert("Q5", None));
        let out = aggregate_questions(&os, &fixture_records());
        assert_eq!(out.excluded, vec!["Q5"]);
        assert_eq!(out.aggregates.first.len(), 4);
    }

    #[test]
    fn test_partial_answers_narrow_contributors() {
        let mut records = fixture_records();
        if let Some(r) = records.get_mut("B2") {
            r.last.answers.retain(|a| a.question_id != "Q1");
        }
        if let Some(r) = records.get_mut("B3") {
            r.first.answers = vec![Answer::int("Q2", 2)];
        }
        let out = aggregate_questions(&fixtures::outcome_set(), &records);
        let q1_first = &out.aggregates.first[0].agg;
        let q1_last = &out.aggregates.last[0].agg;
        let q1_delta = &out.aggregates.delta[0].agg;
        assert_eq!(q1_first.beneficiary_ids, vec!["B1", "B2"]);
        assert_eq!(q1_last.beneficiary_ids, vec!["B1", "B3"]);
        assert_eq!(q1_delta.beneficiary_ids, vec!["B1"]);
        assert_close(q1_delta.value, 4.0);
        assert_eq!(q1_delta.warnings.len(), 2);
    }
}
