//! Implements MeetingStore over an in-memory dataset.
//!
//! Datasets load from a JSON file (`{"outcomeSets": [...], "meetings": [...]}`).
//! Failures can be injected per call kind, which is how partial-failure paths are exercised.

use crate::domain::{DomainError, Identity, Meeting, OutcomeSet, TimeWindow};
use crate::ports::MeetingStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tracing::info;

/// Outcome sets and their meetings, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub outcome_sets: Vec<OutcomeSet>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

impl Dataset {
    /// Read a dataset from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Repo(format!("read {}: {}", path.display(), e)))?;
        let data: Dataset = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Repo(format!("parse {}: {}", path.display(), e)))?;
        info!(
            path = %path.display(),
            outcome_sets = data.outcome_sets.len(),
            meetings = data.meetings.len(),
            "dataset loaded"
        );
        Ok(data)
    }
}

/// In-memory store. Scopes every lookup to the caller's organisation.
#[derive(Default)]
pub struct MemoryStore {
    data: Dataset,
    outcome_set_failure: Option<DomainError>,
    range_failure: Option<DomainError>,
    beneficiary_failures: HashMap<String, DomainError>,
    history_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Load a JSON dataset file into a new store.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        Ok(Self::new(Dataset::load(path).await?))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    /// Make every outcome set lookup fail with `err`.
    pub fn fail_outcome_set(mut self, err: DomainError) -> Self {
        self.outcome_set_failure = Some(err);
        self
    }

    /// Make the in-range meeting fetch fail with `err`.
    pub fn fail_range(mut self, err: DomainError) -> Self {
        self.range_failure = Some(err);
        self
    }

    /// Make the history fetch for `beneficiary_id` fail with `err`.
    pub fn fail_beneficiary(mut self, beneficiary_id: &str, err: DomainError) -> Self {
        self.beneficiary_failures.insert(beneficiary_id.to_string(), err);
        self
    }

    /// Number of beneficiary history fetches served so far.
    pub fn history_fetches(&self) -> usize {
        self.history_fetches.load(Ordering::SeqCst)
    }

    fn visible_meetings<'a>(
        &'a self,
        outcome_set_id: &'a str,
        identity: &'a Identity,
    ) -> impl Iterator<Item = &'a Meeting> + 'a {
        self.data.meetings.iter().filter(move |m| {
            m.outcome_set_id == outcome_set_id && m.organisation_id == identity.organisation_id
        })
    }
}

#[async_trait::async_trait]
impl MeetingStore for MemoryStore {
    async fn get_outcome_set(
        &self,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<OutcomeSet, DomainError> {
        if let Some(err) = &self.outcome_set_failure {
            return Err(err.clone());
        }
        let os = self
            .data
            .outcome_sets
            .iter()
            .find(|os| os.id == outcome_set_id)
            .ok_or_else(|| DomainError::NotFound(format!("outcome set {}", outcome_set_id)))?;
        if os.organisation_id != identity.organisation_id {
            return Err(DomainError::Unauthorized(format!(
                "outcome set {} is not visible to user {}",
                outcome_set_id, identity.user_id
            )));
        }
        Ok(os.clone())
    }

    async fn get_meetings_in_range(
        &self,
        outcome_set_id: &str,
        window: &TimeWindow,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError> {
        if let Some(err) = &self.range_failure {
            return Err(err.clone());
        }
        Ok(self
            .visible_meetings(outcome_set_id, identity)
            .filter(|m| window.contains(m.conducted))
            .cloned()
            .collect())
    }

    async fn get_meetings_for_beneficiary(
        &self,
        beneficiary_id: &str,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError> {
        self.history_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.beneficiary_failures.get(beneficiary_id) {
            return Err(err.clone());
        }
        Ok(self
            .visible_meetings(outcome_set_id, identity)
            .filter(|m| m.beneficiary == beneficiary_id)
            .cloned()
            .collect())
    }
}
