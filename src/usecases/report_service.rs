//! Journey-of-change report: the single entry point over the meeting store.
//!
//! Flow: outcome set -> meetings in window -> first/last per beneficiary ->
//! question and category aggregates -> assembled report.
//! Store failures on the outcome set or the window fetch abort the report;
//! everything after that degrades into warnings and exclusions.

use crate::domain::{DomainError, Excluded, JocReport};
use crate::ports::{MeetingStore, ReportRequest};
use crate::usecases::category_aggregator::{CategoryAggregation, aggregate_categories};
use crate::usecases::question_aggregator::{QuestionAggregation, aggregate_questions};
use crate::usecases::selector::{DEFAULT_MAX_CONCURRENT_FETCHES, MeetingSelector};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Report service. Stateless between calls; safe to share via Arc.
pub struct ReportService {
    store: Arc<dyn MeetingStore>,
    selector: MeetingSelector,
    include_archived: bool,
}

impl ReportService {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self {
            selector: MeetingSelector::new(Arc::clone(&store), DEFAULT_MAX_CONCURRENT_FETCHES),
            store,
            include_archived: true,
        }
    }

    /// Bound concurrent beneficiary history fetches.
    pub fn with_max_concurrent_fetches(mut self, max_concurrent: usize) -> Self {
        self.selector = MeetingSelector::new(Arc::clone(&self.store), max_concurrent);
        self
    }

    /// When false, archived questions are dropped from the outcome set before aggregating.
    pub fn with_archived(mut self, include_archived: bool) -> Self {
        self.include_archived = include_archived;
        self
    }

    /// Compute the report for `request`.
    ///
    /// # Errors
    /// Store errors from the outcome set lookup or the in-window fetch, unchanged;
    /// `NoDataInRange` when the window holds no meetings.
    pub async fn compute_report(&self, request: &ReportRequest) -> Result<JocReport, DomainError> {
        let ReportRequest {
            outcome_set_id,
            window,
            identity,
        } = request;

        let mut outcome_set = self.store.get_outcome_set(outcome_set_id, identity).await?;
        if !self.include_archived {
            outcome_set = outcome_set.without_archived();
        }

        let in_range = self
            .store
            .get_meetings_in_range(outcome_set_id, window, identity)
            .await?;
        if in_range.is_empty() {
            return Err(DomainError::NoDataInRange {
                outcome_set_id: outcome_set_id.clone(),
                start: window.start,
                end: window.end,
            });
        }
        info!(
            outcome_set_id = %outcome_set_id,
            meetings = in_range.len(),
            "meetings found in window"
        );

        let selection = self
            .selector
            .select(outcome_set_id, in_range, identity)
            .await;
        let questions = aggregate_questions(&outcome_set, &selection.records);
        let categories = aggregate_categories(&outcome_set, &selection.records);

        let report = assemble(selection.warnings, questions, categories);
        info!(
            outcome_set_id = %outcome_set_id,
            beneficiaries = report.beneficiary_ids.len(),
            warnings = report.warnings.len(),
            excluded_questions = report.excluded.question_ids.len(),
            excluded_categories = report.excluded.category_ids.len(),
            "report computed"
        );
        Ok(report)
    }
}

/// Package aggregates, exclusions and warnings. The roster is every beneficiary
/// contributing to at least one aggregate.
fn assemble(
    warnings: Vec<String>,
    questions: QuestionAggregation,
    categories: CategoryAggregation,
) -> JocReport {
    let qa = &questions.aggregates;
    let ca = &categories.aggregates;
    let roster: BTreeSet<&String> = qa
        .first
        .iter()
        .chain(&qa.last)
        .chain(&qa.delta)
        .map(|a| &a.agg)
        .chain(ca.first.iter().chain(&ca.last).chain(&ca.delta).map(|a| &a.agg))
        .flat_map(|agg| agg.beneficiary_ids.iter())
        .collect();
    let beneficiary_ids = roster.into_iter().cloned().collect();

    JocReport {
        beneficiary_ids,
        question_aggregates: questions.aggregates,
        category_aggregates: categories.aggregates,
        excluded: Excluded {
            category_ids: categories.excluded,
            question_ids: questions.excluded,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_store::MemoryStore;
    use crate::domain::{Identity, TimeWindow};
    use crate::fixtures::{self, assert_close};

    fn request() -> ReportRequest {
        ReportRequest {
            outcome_set_id: fixtures::OUTCOME_SET_ID.to_string(),
            window: fixtures::window(),
            identity: fixtures::identity(),
        }
    }

    fn service(store: MemoryStore) -> ReportService {
        ReportService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_fixture_report() {
        let report = service(MemoryStore::new(fixtures::dataset()))
            .compute_report(&request())
            .await
            .unwrap();

        assert_eq!(report.beneficiary_ids, vec!["B1", "B2", "B3"]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.excluded, Excluded::default());

        let q1 = |v: &Vec<crate::domain::QuestionAggregate>| v[0].agg.value;
        assert_close(q1(&report.question_aggregates.first), 4.0);
        assert_close(q1(&report.question_aggregates.last), 5.3333);
        assert_close(q1(&report.question_aggregates.delta), 1.3333);

        let c1 = |v: &Vec<crate::domain::CategoryAggregate>| v[0].agg.value;
        assert_close(c1(&report.category_aggregates.first), 3.5);
        assert_close(c1(&report.category_aggregates.last), 5.1667);
        assert_close(c1(&report.category_aggregates.delta), 1.6667);
        assert_eq!(report.category_aggregates.delta.len(), 2);
    }

    #[tokio::test]
    async fn test_outcome_set_error_propagates() {
        let err = service(
            MemoryStore::new(fixtures::dataset())
                .fail_outcome_set(DomainError::Unavailable("Mongo error".into())),
        )
        .compute_report(&request())
        .await
        .unwrap_err();
        assert_eq!(err, DomainError::Unavailable("Mongo error".into()));

        let mut req = request();
        req.identity = Identity::new("u2", "other-org");
        let err = service(MemoryStore::new(fixtures::dataset()))
            .compute_report(&req)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_range_error_propagates() {
        let err = service(
            MemoryStore::new(fixtures::dataset())
                .fail_range(DomainError::Repo("Mongo error".into())),
        )
        .compute_report(&request())
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Repository error: Mongo error");
    }

    #[tokio::test]
    async fn test_no_meetings_in_range() {
        let mut req = request();
        let long_ago = fixtures::start() - chrono::Duration::days(365);
        req.window = TimeWindow::new(long_ago, long_ago + chrono::Duration::days(1)).unwrap();
        let err = service(MemoryStore::new(fixtures::dataset()))
            .compute_report(&req)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NoDataInRange { .. }));
    }

    #[tokio::test]
    async fn test_single_meeting_beneficiary() {
        let mut data = fixtures::dataset();
        data.meetings = vec![fixtures::find("B1M1")];
        let mut req = request();
        let at = data.meetings[0].conducted;
        req.window = TimeWindow::new(at, at).unwrap();

        let report = service(MemoryStore::new(data))
            .compute_report(&req)
            .await
            .unwrap();
        assert!(report.beneficiary_ids.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("only have a single meeting recorded"));
        assert_eq!(report.excluded.question_ids, vec!["Q1", "Q2", "Q3", "Q4"]);
        assert_eq!(report.excluded.category_ids, vec!["C1", "C2"]);
        assert!(report.question_aggregates.first.is_empty());
    }

    #[tokio::test]
    async fn test_single_meeting_beneficiary_alongside_others() {
        let mut data = fixtures::dataset();
        data.meetings.push(fixtures::meeting("B4M1", "B4", fixtures::end(), [1, 1, 1, 1]));
        let report = service(MemoryStore::new(data))
            .compute_report(&request())
            .await
            .unwrap();
        assert_eq!(report.beneficiary_ids, vec!["B1", "B2", "B3"]);
        assert_eq!(report.warnings.len(), 1);
        let contributors = report
            .question_aggregates
            .first
            .iter()
            .chain(&report.question_aggregates.delta)
            .flat_map(|a| a.agg.beneficiary_ids.iter());
        assert!(contributors.into_iter().all(|b| b != "B4"));
    }

    #[tokio::test]
    async fn test_history_failure_becomes_warning() {
        let report = service(
            MemoryStore::new(fixtures::dataset())
                .fail_beneficiary("B3", DomainError::Unavailable("down".into())),
        )
        .compute_report(&request())
        .await
        .unwrap();
        assert_eq!(report.beneficiary_ids, vec!["B1", "B2"]);
        assert_eq!(
            report.warnings,
            vec!["Could not include beneficiary B3 due to a system error. Please contact support."]
        );
        assert_close(report.question_aggregates.first[0].agg.value, 5.5);
    }

    #[tokio::test]
    async fn test_archived_questions_filtered_on_request() {
        let mut data = fixtures::dataset();
        data.outcome_sets[0].questions[0].archived = true;

        let with = service(MemoryStore::new(data.clone()))
            .compute_report(&request())
            .await
            .unwrap();
        assert_eq!(with.question_aggregates.first.len(), 4);

        let without = service(MemoryStore::new(data))
            .with_archived(false)
            .compute_report(&request())
            .await
            .unwrap();
        assert_eq!(without.question_aggregates.first.len(), 3);
        // C1 now holds only Q2.
        assert_close(without.category_aggregates.first[0].agg.value, 3.0);
    }

    #[tokio::test]
    async fn test_report_is_deterministic() {
        let mut shuffled = fixtures::dataset();
        shuffled.meetings.reverse();

        let a = service(MemoryStore::new(fixtures::dataset()))
            .with_max_concurrent_fetches(1)
            .compute_report(&request())
            .await
            .unwrap();
        let b = service(MemoryStore::new(shuffled))
            .with_max_concurrent_fetches(16)
            .compute_report(&request())
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
