//! Implements InputPort. Inquire-based interactive prompts, or a fixed request from config.

use crate::domain::{DomainError, Identity, TimeWindow};
use crate::ports::{InputPort, ReportRequest};
use crate::shared::config::parse_time_bound;
use async_trait::async_trait;
use inquire::Text;

fn prompt(label: &str, default: Option<&str>, help: &str) -> Result<String, DomainError> {
    let mut text = Text::new(label).with_help_message(help);
    if let Some(d) = default {
        text = text.with_default(d);
    }
    let answer = text.prompt().map_err(|e| DomainError::Input(e.to_string()))?;
    let answer = answer.trim().to_string();
    if answer.is_empty() {
        return Err(DomainError::Input(format!("{} is required", label.trim_end_matches(':'))));
    }
    Ok(answer)
}

/// TUI adapter. Asks for whatever the configuration did not supply.
pub struct TuiInputPort {
    outcome_set_id: Option<String>,
    identity: Identity,
}

impl TuiInputPort {
    pub fn new(outcome_set_id: Option<String>, identity: Identity) -> Self {
        Self {
            outcome_set_id,
            identity,
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn request_report(&self) -> Result<ReportRequest, DomainError> {
        let outcome_set_id = prompt(
            "Outcome set ID:",
            self.outcome_set_id.as_deref(),
            "The questionnaire to report on",
        )?;
        let date_help = "RFC 3339 timestamp or YYYY-MM-DD";
        let start = parse_time_bound(&prompt("Window start:", None, date_help)?, false)?;
        let end = parse_time_bound(&prompt("Window end:", None, date_help)?, true)?;
        Ok(ReportRequest {
            outcome_set_id,
            window: TimeWindow::new(start, end)?,
            identity: self.identity.clone(),
        })
    }
}

/// Non-interactive adapter. Always yields the same request.
pub struct FixedInputPort {
    request: ReportRequest,
}

impl FixedInputPort {
    pub fn new(request: ReportRequest) -> Self {
        Self { request }
    }
}

#[async_trait]
impl InputPort for FixedInputPort {
    async fn request_report(&self) -> Result<ReportRequest, DomainError> {
        Ok(self.request.clone())
    }
}
