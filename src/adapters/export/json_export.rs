//! Implements ReportExportPort as pretty-printed JSON.
//!
//! Field names follow the report wire format (`beneficiaryIDs`, `questionAggregates`, ...).

use crate::domain::{DomainError, JocReport};
use crate::ports::ReportExportPort;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Default)]
pub struct JsonExporter;

#[async_trait::async_trait]
impl ReportExportPort for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    /// Write to a temp file, sync, then rename over `dest`.
    async fn export(&self, report: &JocReport, dest: &Path) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| DomainError::Export(e.to_string()))?;

        let temp_path = dest.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Export(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Export(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Export(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, dest)
            .await
            .map_err(|e| DomainError::Export(format!("rename failed: {}", e)))?;

        info!(path = %dest.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BenAgg, QuestionAggregate};

    #[tokio::test]
    async fn test_export_uses_wire_names() {
        let mut report = JocReport {
            beneficiary_ids: vec!["B1".into()],
            ..JocReport::default()
        };
        report.question_aggregates.first.push(QuestionAggregate {
            question_id: "Q1".into(),
            agg: BenAgg {
                value: 2.5,
                beneficiary_ids: vec!["B1".into()],
                warnings: vec![],
            },
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.json");
        JsonExporter.export(&report, &dest).await.unwrap();

        let raw = tokio::fs::read_to_string(&dest).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["beneficiaryIDs"][0], "B1");
        assert_eq!(value["questionAggregates"]["first"][0]["questionID"], "Q1");
        assert_eq!(value["questionAggregates"]["first"][0]["value"], 2.5);
        assert!(value["excluded"]["categoryIDs"].as_array().unwrap().is_empty());

        let back: JocReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, report);
    }
}
