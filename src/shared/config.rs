//! Application configuration. Data sources, report request, output.

use crate::domain::{DomainError, Identity, TimeWindow};
use crate::ports::ReportRequest;
use crate::usecases::selector::DEFAULT_MAX_CONCURRENT_FETCHES;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

/// Output encodings for the exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// JSON dataset (`{"outcomeSets": [...], "meetings": [...]}`). Read from JOC_DATA_FILE.
    #[serde(default)]
    pub data_file: Option<String>,

    /// libsql database file. When `data_file` is also set, the dataset is imported first.
    /// Read from JOC_SQLITE_PATH.
    #[serde(default)]
    pub sqlite_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Report request. When all three are set no prompt is shown.
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub outcome_set_id: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD (start of day).
    #[serde(default)]
    pub start: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD (end of day).
    #[serde(default)]
    pub end: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Caller identity
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub organisation_id: Option<String>,

    /// Upper bound on concurrent beneficiary history fetches. Read from JOC_MAX_CONCURRENT_FETCHES.
    #[serde(default)]
    pub max_concurrent_fetches: Option<usize>,

    /// Aggregate archived questions too (default true). Read from JOC_INCLUDE_ARCHIVED.
    #[serde(default)]
    pub include_archived: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────
    /// Where to write the report. Defaults to ./reports/joc_<outcome set>.<ext>.
    #[serde(default)]
    pub output_path: Option<String>,

    /// `json` (default) or `csv`.
    #[serde(default)]
    pub output_format: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("JOC"));
        if let Ok(path) = std::env::var("JOC_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the fetch concurrency bound. Defaults to 8; never below 1.
    pub fn max_concurrent_fetches_or_default(&self) -> usize {
        self.max_concurrent_fetches
            .unwrap_or(DEFAULT_MAX_CONCURRENT_FETCHES)
            .max(1)
    }

    pub fn include_archived_or_default(&self) -> bool {
        self.include_archived.unwrap_or(true)
    }

    pub fn output_format_or_default(&self) -> Result<OutputFormat, DomainError> {
        match self
            .output_format
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("json") => Ok(OutputFormat::Json),
            Some("csv") => Ok(OutputFormat::Csv),
            Some(other) => Err(DomainError::Config(format!(
                "unknown output format '{}' (expected json or csv)",
                other
            ))),
        }
    }

    /// Caller identity. The organisation is required; the user defaults to "cli".
    pub fn identity(&self) -> Result<Identity, DomainError> {
        let organisation_id = self
            .organisation_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DomainError::Config("Set JOC_ORGANISATION_ID".to_string()))?;
        let user_id = self.user_id.clone().unwrap_or_else(|| "cli".to_string());
        Ok(Identity::new(user_id, organisation_id))
    }

    /// The configured request, if outcome set, start and end are all present.
    pub fn fixed_request(&self) -> Result<Option<ReportRequest>, DomainError> {
        let (Some(outcome_set_id), Some(start), Some(end)) =
            (&self.outcome_set_id, &self.start, &self.end)
        else {
            return Ok(None);
        };
        let window = TimeWindow::new(
            parse_time_bound(start, false)?,
            parse_time_bound(end, true)?,
        )?;
        Ok(Some(ReportRequest {
            outcome_set_id: outcome_set_id.clone(),
            window,
            identity: self.identity()?,
        }))
    }
}

/// Parse an RFC 3339 timestamp, or a bare date taken as the start (or end) of that UTC day.
pub fn parse_time_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, DomainError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DomainError::Input(format!("invalid date or timestamp: '{}'", s)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| DomainError::Input(format!("invalid time for '{}'", s)))?;
    Ok(date.and_time(time).and_utc())
}
