//! SQLite-backed meeting store via libsql. Implements MeetingStore.
//!
//! Outcome set definitions are stored as JSON documents; meetings are rows with their
//! answers as a JSON column. Timestamps are Unix nanoseconds so window queries are
//! plain integer range scans on (outcome_set_id, conducted) and round trips are exact.

use crate::adapters::persistence::memory_store::Dataset;
use crate::domain::{DomainError, Identity, Meeting, OutcomeSet, TimeWindow};
use crate::ports::MeetingStore;
use chrono::{DateTime, Utc};
use libsql::{Database, Row, Rows, params};
use std::path::{Path, PathBuf};
use tracing::info;

const OUTCOME_SETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS outcome_sets (
    id TEXT PRIMARY KEY,
    organisation_id TEXT NOT NULL,
    definition_json TEXT NOT NULL
)"#;

const MEETINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meetings (
    id TEXT PRIMARY KEY,
    beneficiary TEXT NOT NULL,
    user TEXT NOT NULL DEFAULT '',
    outcome_set_id TEXT NOT NULL,
    organisation_id TEXT NOT NULL,
    conducted INTEGER NOT NULL,
    created INTEGER NOT NULL,
    modified INTEGER NOT NULL,
    answers_json TEXT NOT NULL DEFAULT '[]'
)"#;
const MEETINGS_CONDUCTED_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_meetings_os_conducted ON meetings (outcome_set_id, conducted)";
const MEETINGS_BENEFICIARY_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_meetings_os_beneficiary ON meetings (outcome_set_id, beneficiary)";

const MEETING_COLUMNS: &str = "id, beneficiary, user, outcome_set_id, organisation_id, conducted, created, modified, answers_json";

fn db_err(e: libsql::Error) -> DomainError {
    DomainError::Repo(e.to_string())
}

fn time_to_nanos(at: DateTime<Utc>) -> Result<i64, DomainError> {
    at.timestamp_nanos_opt()
        .ok_or_else(|| DomainError::Repo(format!("timestamp out of range: {}", at)))
}

/// Window bound in nanoseconds, saturating outside the representable range.
fn bound_nanos(at: DateTime<Utc>) -> i64 {
    match at.timestamp_nanos_opt() {
        Some(ns) => ns,
        None if at.timestamp() < 0 => i64::MIN,
        None => i64::MAX,
    }
}

/// SQLite meeting store. One database file; safe to share via Arc.
pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DomainError::Repo(e.to_string()))?;
        }
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Unavailable(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::Unavailable(e.to_string()))?;

        // PRAGMA returns a row; use query and drain it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Repo(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(db_err)?.is_some() {}

        for ddl in [
            OUTCOME_SETS_TABLE,
            MEETINGS_TABLE,
            MEETINGS_CONDUCTED_INDEX,
            MEETINGS_BENEFICIARY_INDEX,
        ] {
            conn.execute(ddl, ()).await.map_err(db_err)?;
        }

        info!(path = %db_path.display(), "SQLite meeting store connected");

        Ok(Self {
            db,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Upsert every outcome set and meeting of `data` in one transaction.
    pub async fn import(&self, data: &Dataset) -> Result<(), DomainError> {
        let conn = self.db.connect().map_err(db_err)?;
        let tx = conn.transaction().await.map_err(db_err)?;
        for os in &data.outcome_sets {
            let json = serde_json::to_string(os).map_err(|e| DomainError::Repo(e.to_string()))?;
            tx.execute(
                "INSERT OR REPLACE INTO outcome_sets (id, organisation_id, definition_json) VALUES (?1, ?2, ?3)",
                params![os.id.as_str(), os.organisation_id.as_str(), json],
            )
            .await
            .map_err(db_err)?;
        }
        for m in &data.meetings {
            let answers =
                serde_json::to_string(&m.answers).map_err(|e| DomainError::Repo(e.to_string()))?;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO meetings
                    (id, beneficiary, user, outcome_set_id, organisation_id, conducted, created, modified, answers_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    m.id.as_str(),
                    m.beneficiary.as_str(),
                    m.user.as_str(),
                    m.outcome_set_id.as_str(),
                    m.organisation_id.as_str(),
                    time_to_nanos(m.conducted)?,
                    time_to_nanos(m.created)?,
                    time_to_nanos(m.modified)?,
                    answers
                ],
            )
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        info!(
            outcome_sets = data.outcome_sets.len(),
            meetings = data.meetings.len(),
            "dataset imported into SQLite"
        );
        Ok(())
    }

    fn meeting_from_row(row: &Row) -> Result<Meeting, DomainError> {
        let text = |idx: i32| row.get::<String>(idx).map_err(db_err);
        let nanos = |idx: i32| {
            row.get::<i64>(idx)
                .map(DateTime::from_timestamp_nanos)
                .map_err(db_err)
        };
        let answers_json = text(8)?;
        Ok(Meeting {
            id: text(0)?,
            beneficiary: text(1)?,
            user: row.get::<String>(2).unwrap_or_default(),
            outcome_set_id: text(3)?,
            organisation_id: text(4)?,
            conducted: nanos(5)?,
            created: nanos(6)?,
            modified: nanos(7)?,
            answers: serde_json::from_str(&answers_json)
                .map_err(|e| DomainError::Repo(format!("answers_json: {}", e)))?,
        })
    }

    async fn collect_meetings(mut rows: Rows) -> Result<Vec<Meeting>, DomainError> {
        let mut meetings = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            meetings.push(Self::meeting_from_row(&row)?);
        }
        Ok(meetings)
    }
}

#[async_trait::async_trait]
impl MeetingStore for SqliteStore {
    async fn get_outcome_set(
        &self,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<OutcomeSet, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Unavailable(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT organisation_id, definition_json FROM outcome_sets WHERE id = ?1",
                params![outcome_set_id],
            )
            .await
            .map_err(db_err)?;
        let Some(row) = rows.next().await.map_err(db_err)? else {
            return Err(DomainError::NotFound(format!("outcome set {}", outcome_set_id)));
        };
        let organisation_id: String = row.get(0).map_err(db_err)?;
        if organisation_id != identity.organisation_id {
            return Err(DomainError::Unauthorized(format!(
                "outcome set {} is not visible to user {}",
                outcome_set_id, identity.user_id
            )));
        }
        let json: String = row.get(1).map_err(db_err)?;
        serde_json::from_str(&json)
            .map_err(|e| DomainError::Repo(format!("definition_json: {}", e)))
    }

    async fn get_meetings_in_range(
        &self,
        outcome_set_id: &str,
        window: &TimeWindow,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Unavailable(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM meetings WHERE outcome_set_id = ?1 AND organisation_id = ?2 AND conducted BETWEEN ?3 AND ?4",
            MEETING_COLUMNS
        );
        let rows = conn
            .query(
                &sql,
                params![
                    outcome_set_id,
                    identity.organisation_id.as_str(),
                    bound_nanos(window.start),
                    bound_nanos(window.end)
                ],
            )
            .await
            .map_err(db_err)?;
        Self::collect_meetings(rows).await
    }

    async fn get_meetings_for_beneficiary(
        &self,
        beneficiary_id: &str,
        outcome_set_id: &str,
        identity: &Identity,
    ) -> Result<Vec<Meeting>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Unavailable(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM meetings WHERE outcome_set_id = ?1 AND organisation_id = ?2 AND beneficiary = ?3",
            MEETING_COLUMNS
        );
        let rows = conn
            .query(
                &sql,
                params![outcome_set_id, identity.organisation_id.as_str(), beneficiary_id],
            )
            .await
            .map_err(db_err)?;
        Self::collect_meetings(rows).await
    }
}
