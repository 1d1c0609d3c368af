//! First/last/delta fold over per-beneficiary values.
//!
//! Shared by the question and category aggregators. Input order never matters:
//! values are folded in beneficiary-id order.

use crate::domain::BenAgg;

/// One beneficiary's value at their first and last meeting. Either may be absent.
#[derive(Debug, Clone)]
pub struct PairedValue<'a> {
    pub beneficiary: &'a str,
    pub first: Option<f64>,
    pub last: Option<f64>,
}

/// The three aggregates of one question or category.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstLastDelta {
    pub first: BenAgg,
    pub last: BenAgg,
    pub delta: BenAgg,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Values and contributors of one statistic.
#[derive(Default)]
struct Side {
    values: Vec<f64>,
    beneficiary_ids: Vec<String>,
    warnings: Vec<String>,
}

impl Side {
    fn push(&mut self, beneficiary: &str, value: f64) {
        self.values.push(value);
        self.beneficiary_ids.push(beneficiary.to_string());
    }

    fn into_agg(self, value: f64) -> BenAgg {
        let mut beneficiary_ids = self.beneficiary_ids;
        beneficiary_ids.sort();
        BenAgg {
            value,
            beneficiary_ids,
            warnings: self.warnings,
        }
    }
}

/// Fold paired values into first, last and delta aggregates.
///
/// First and last are means over every beneficiary with a value on that side.
/// Delta is `mean(last) - mean(first)` over the beneficiaries with both values.
/// `subject` names what is aggregated ("question Q1") in warning texts.
/// Returns `None` when no beneficiary has both values.
pub fn fold(subject: &str, values: &[PairedValue<'_>]) -> Option<FirstLastDelta> {
    let mut ordered: Vec<&PairedValue<'_>> = values.iter().collect();
    ordered.sort_by(|a, b| a.beneficiary.cmp(b.beneficiary));

    let mut first = Side::default();
    let mut last = Side::default();
    let mut delta = Side::default();
    let mut cohort_first = Vec::new();
    let mut cohort_last = Vec::new();

    for v in ordered {
        match v.first {
            Some(x) => first.push(v.beneficiary, x),
            None => first.warnings.push(format!(
                "Beneficiary {} has no value for {} in their first meeting",
                v.beneficiary, subject
            )),
        }
        match v.last {
            Some(x) => last.push(v.beneficiary, x),
            None => last.warnings.push(format!(
                "Beneficiary {} has no value for {} in their last meeting",
                v.beneficiary, subject
            )),
        }
        match (v.first, v.last) {
            (Some(f), Some(l)) => {
                cohort_first.push(f);
                cohort_last.push(l);
                delta.beneficiary_ids.push(v.beneficiary.to_string());
            }
            _ => delta.warnings.push(format!(
                "Beneficiary {} was excluded from the {} delta as they lack a first or last value",
                v.beneficiary, subject
            )),
        }
    }

    let delta_value = mean(&cohort_last)? - mean(&cohort_first)?;
    let first_value = mean(&first.values)?;
    let last_value = mean(&last.values)?;
    Some(FirstLastDelta {
        first: first.into_agg(first_value),
        last: last.into_agg(last_value),
        delta: delta.into_agg(delta_value),
    })
}
