//! Category-level aggregation.
//!
//! Two steps: within one meeting, a category's answered member questions are
//! combined with the category's own function (mean or sum); across
//! beneficiaries, those per-meeting values are always averaged.

use crate::domain::{
    Aggregates, Category, CategoryAggregate, Meeting, MeetingCategoryAggregate, OutcomeSet,
};
use crate::usecases::cohort::{self, PairedValue};
use crate::usecases::selector::BeneficiaryRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// Category aggregates plus the categories that produced none.
#[derive(Debug, Default)]
pub struct CategoryAggregation {
    pub aggregates: Aggregates<CategoryAggregate>,
    pub excluded: Vec<String>,
}

/// Value of `category` for one meeting. `None` if no member question was answered.
pub fn category_value(
    meeting: &Meeting,
    outcome_set: &OutcomeSet,
    category: &Category,
) -> Option<f64> {
    let values: Vec<f64> = outcome_set
        .questions_in_category(&category.id)
        .filter_map(|q| meeting.value_for(q))
        .collect();
    category.aggregation.apply(&values)
}

/// Category values of a single meeting, in category definition order.
pub fn meeting_category_aggregates(
    meeting: &Meeting,
    outcome_set: &OutcomeSet,
) -> Vec<MeetingCategoryAggregate> {
    outcome_set
        .categories
        .iter()
        .filter_map(|c| {
            category_value(meeting, outcome_set, c).map(|value| MeetingCategoryAggregate {
                category_id: c.id.clone(),
                value,
            })
        })
        .collect()
}

/// Aggregate every category of `outcome_set`, in definition order.
pub fn aggregate_categories(
    outcome_set: &OutcomeSet,
    records: &BTreeMap<String, BeneficiaryRecord>,
) -> CategoryAggregation {
    let mut out = CategoryAggregation::default();

    for category in &outcome_set.categories {
        if outcome_set.questions_in_category(&category.id).next().is_none() {
            debug!(category = %category.id, "category has no questions");
            out.excluded.push(category.id.clone());
            continue;
        }

        let values: Vec<PairedValue<'_>> = records
            .values()
            .map(|r| PairedValue {
                beneficiary: &r.beneficiary_id,
                first: category_value(&r.first, outcome_set, category),
                last: category_value(&r.last, outcome_set, category),
            })
            .collect();

        let subject = format!("category {}", category.id);
        let Some(folded) = cohort::fold(&subject, &values) else {
            debug!(category = %category.id, "no beneficiary has values in both meetings");
            out.excluded.push(category.id.clone());
            continue;
        };

        let wrap = |agg| CategoryAggregate {
            category_id: category.id.clone(),
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
    use crate::domain::Aggregation;
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
    fn test_meeting_category_aggregates() {
        let os = fixtures::outcome_set();
        let aggs = meeting_category_aggregates(&fixtures::find("B1M2"), &os);
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].category_id, "C1");
        assert_close(aggs[0].value, 8.5);
        assert_close(aggs[1].value, 6.5);
    }

    #[test]
    fn test_fixture_category_aggregates() {
        let out = aggregate_categories(&fixtures::outcome_set(), &fixture_records());
        assert!(out.excluded.is_empty());
        let c1 = |v: &Vec<CategoryAggregate>| v[0].agg.value;
        let c2 = |v: &Vec<CategoryAggregate>| v[1].agg.value;
        assert_close(c1(&out.aggregates.first), 3.5);
        assert_close(c1(&out.aggregates.last), 31.0 / 6.0);
        assert_close(c1(&out.aggregates.delta), 5.0 / 3.0);
        assert_close(c2(&out.aggregates.first), 14.0 / 3.0);
        assert_close(c2(&out.aggregates.last), 16.0 / 3.0);
        assert_close(c2(&out.aggregates.delta), 2.0 / 3.0);
        assert_eq!(
            out.aggregates.first[0].agg.beneficiary_ids,
            vec!["B1", "B2", "B3"]
        );
    }

    #[test]
    fn test_sum_changes_only_the_intra_meeting_step() {
        let mut os = fixtures::outcome_set();
        os.categories[0].aggregation = Aggregation::Sum;
        let out = aggregate_categories(&os, &fixture_records());
        // Per-beneficiary sums (10, 8, 3) are still averaged across beneficiaries.
        assert_close(out.aggregates.first[0].agg.value, 7.0);
        assert_close(out.aggregates.last[0].agg.value, 31.0 / 3.0);
        assert_close(out.aggregates.first[1].agg.value, 14.0 / 3.0);
    }

    #[test]
    fn test_empty_and_unanswered_categories_excluded() {
        let mut os = fixtures::outcome_set();
        os.categories.push(Category::new("C3", Aggregation::Mean));
        os.categories.push(Category::new("C4", Aggregation::Sum));
        os.questions.push(crate::domain::Question::likert("Q9", Some("C4")));
        let out = aggregate_categories(&os, &fixture_records());
        assert_eq!(out.excluded, vec!["C3", "C4"]);
        assert_eq!(out.aggregates.first.len(), 2);
    }

    #[test]
    fn test_partially_answered_category_uses_answered_questions() {
        let mut records = fixture_records();
        if let Some(r) = records.get_mut("B1") {
            r.last.answers.retain(|a| a.question_id != "Q1");
        }
        let out = aggregate_categories(&fixtures::outcome_set(), &records);
        // B1's last C1 value is Q2 alone (8) instead of mean(9, 8).
        assert_close(out.aggregates.last[0].agg.value, (8.0 + 2.0 + 5.0) / 3.0);
    }
}
