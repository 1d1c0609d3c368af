//! Meeting selection: each beneficiary's last meeting in the window and first meeting ever.
//!
//! - Last meeting = latest `conducted` among the in-range meetings
//! - First meeting = earliest `conducted` in the beneficiary's full history
//! - History fetches fan out over a bounded JoinSet; a failed fetch drops only that beneficiary
//! - Beneficiaries whose first and last meeting are the same record are dropped with a warning

use crate::domain::{DomainError, Identity, Meeting};
use crate::ports::MeetingStore;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Default bound on concurrent beneficiary history fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// A beneficiary with a resolved, distinct first and last meeting.
#[derive(Debug, Clone)]
pub struct BeneficiaryRecord {
    pub beneficiary_id: String,
    pub first: Meeting,
    pub last: Meeting,
}

/// Output of selection: qualifying beneficiaries keyed by id, plus report-level warnings.
#[derive(Debug, Default)]
pub struct Selection {
    pub records: BTreeMap<String, BeneficiaryRecord>,
    pub warnings: Vec<String>,
}

/// Chronological ordering key. Ties on `conducted` fall back to the meeting id.
fn chrono_key(meeting: &Meeting) -> (DateTime<Utc>, &str) {
    (meeting.conducted, meeting.id.as_str())
}

/// Latest meeting per beneficiary.
pub fn last_meeting_per_beneficiary(meetings: Vec<Meeting>) -> BTreeMap<String, Meeting> {
    let mut last: BTreeMap<String, Meeting> = BTreeMap::new();
    for meeting in meetings {
        let replace = match last.get(&meeting.beneficiary) {
            Some(existing) => chrono_key(&meeting) > chrono_key(existing),
            None => true,
        };
        if replace {
            last.insert(meeting.beneficiary.clone(), meeting);
        }
    }
    last
}

/// Earliest meeting of `history`. `last` takes part so that first never comes after last.
pub fn first_meeting<'a>(history: &'a [Meeting], last: &'a Meeting) -> &'a Meeting {
    history.iter().fold(last, |earliest, m| {
        if chrono_key(m) < chrono_key(earliest) {
            m
        } else {
            earliest
        }
    })
}

fn system_error_warning(beneficiary: &str) -> String {
    format!(
        "Could not include beneficiary {} due to a system error. Please contact support.",
        beneficiary
    )
}

fn single_meeting_warning(beneficiary: &str) -> String {
    format!(
        "Beneficiary {} was not included as they only have a single meeting recorded",
        beneficiary
    )
}

/// Resolves first/last meeting pairs via the store.
pub struct MeetingSelector {
    store: Arc<dyn MeetingStore>,
    max_concurrent: usize,
}

impl MeetingSelector {
    pub fn new(store: Arc<dyn MeetingStore>, max_concurrent: usize) -> Self {
        Self {
            store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Select a (first, last) pair for every beneficiary met in `in_range`.
    ///
    /// Never fails: per-beneficiary problems become warnings.
    pub async fn select(
        &self,
        outcome_set_id: &str,
        in_range: Vec<Meeting>,
        identity: &Identity,
    ) -> Selection {
        let last_meetings = last_meeting_per_beneficiary(in_range);
        let mut histories = self
            .fetch_histories(outcome_set_id, last_meetings.keys().cloned(), identity)
            .await;

        let mut selection = Selection::default();
        for (beneficiary, last) in last_meetings {
            let history = match histories.remove(&beneficiary) {
                Some(Ok(history)) => history,
                Some(Err(e)) => {
                    warn!(
                        beneficiary = %beneficiary,
                        error = %e,
                        "getting beneficiary's meetings failed"
                    );
                    selection.warnings.push(system_error_warning(&beneficiary));
                    continue;
                }
                None => {
                    warn!(beneficiary = %beneficiary, "history fetch task did not complete");
                    selection.warnings.push(system_error_warning(&beneficiary));
                    continue;
                }
            };

            let first = first_meeting(&history, &last);
            if first.id == last.id {
                warn!(beneficiary = %beneficiary, meeting = %last.id, "single meeting recorded");
                selection.warnings.push(single_meeting_warning(&beneficiary));
                continue;
            }

            let record = BeneficiaryRecord {
                beneficiary_id: beneficiary.clone(),
                first: first.clone(),
                last,
            };
            selection.records.insert(beneficiary, record);
        }

        info!(
            outcome_set_id,
            qualifying = selection.records.len(),
            warnings = selection.warnings.len(),
            "beneficiary meetings selected"
        );
        selection
    }

    /// Fetch every beneficiary's history, at most `max_concurrent` at a time.
    /// Results are owned by this call; tasks only return values.
    async fn fetch_histories(
        &self,
        outcome_set_id: &str,
        beneficiaries: impl Iterator<Item = String>,
        identity: &Identity,
    ) -> HashMap<String, Result<Vec<Meeting>, DomainError>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut set = JoinSet::new();
        let mut task_beneficiaries = HashMap::new();

        for beneficiary in beneficiaries {
            let sem = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let outcome_set_id = outcome_set_id.to_string();
            let identity = identity.clone();
            let task_beneficiary = beneficiary.clone();
            let handle = set.spawn(async move {
                let result = match sem.acquire().await {
                    Ok(_permit) => {
                        store
                            .get_meetings_for_beneficiary(&beneficiary, &outcome_set_id, &identity)
                            .await
                    }
                    Err(e) => Err(DomainError::Unavailable(e.to_string())),
                };
                (beneficiary, result)
            });
            task_beneficiaries.insert(handle.id(), task_beneficiary);
        }

        let mut histories = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((beneficiary, result)) => {
                    histories.insert(beneficiary, result);
                }
                Err(e) => {
                    let beneficiary = task_beneficiaries.get(&e.id()).map(String::as_str);
                    error!(
                        beneficiary = ?beneficiary,
                        error = %e,
                        "beneficiary history task failed"
                    );
                }
            }
        }
        histories
    }
}
