//! CSV export of a report. Uses the `csv` crate for safe serialization.
//!
//! Format: `Section;Stage;ID;Value;Beneficiaries;Warnings`, one row per aggregate,
//! then one row per excluded question/category and per report warning.

use crate::domain::{BenAgg, DomainError, JocReport};
use crate::ports::ReportExportPort;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 6] = ["Section", "Stage", "ID", "Value", "Beneficiaries", "Warnings"];

fn agg_record(section: &str, stage: &str, id: &str, agg: &BenAgg) -> [String; 6] {
    [
        section.to_string(),
        stage.to_string(),
        id.to_string(),
        format!("{:.4}", agg.value),
        agg.beneficiary_ids.join(","),
        agg.warnings.join(" | "),
    ]
}

/// Render `report` as a semicolon-delimited CSV string with a header row.
pub fn report_to_csv(report: &JocReport) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;

    let q = &report.question_aggregates;
    for (stage, aggs) in [("first", &q.first), ("last", &q.last), ("delta", &q.delta)] {
        for a in aggs {
            wtr.write_record(agg_record("question", stage, &a.question_id, &a.agg))?;
        }
    }
    let c = &report.category_aggregates;
    for (stage, aggs) in [("first", &c.first), ("last", &c.last), ("delta", &c.delta)] {
        for a in aggs {
            wtr.write_record(agg_record("category", stage, &a.category_id, &a.agg))?;
        }
    }

    for id in &report.excluded.question_ids {
        wtr.write_record(["question", "excluded", id.as_str(), "", "", ""])?;
    }
    for id in &report.excluded.category_ids {
        wtr.write_record(["category", "excluded", id.as_str(), "", "", ""])?;
    }
    for warning in &report.warnings {
        wtr.write_record(["report", "warning", "", "", "", warning.as_str()])?;
    }

    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

#[derive(Debug, Default)]
pub struct CsvExporter;

#[async_trait::async_trait]
impl ReportExportPort for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    async fn export(&self, report: &JocReport, dest: &Path) -> Result<(), DomainError> {
        let content = report_to_csv(report)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;
        tokio::fs::write(dest, content)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to write CSV: {}", e)))?;
        info!(path = %dest.display(), "report written");
        Ok(())
    }
}
