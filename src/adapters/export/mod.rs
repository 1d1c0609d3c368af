//! Report exporters. Implement ReportExportPort.

pub mod csv_export;
pub mod json_export;

pub use csv_export::{CsvExporter, report_to_csv};
pub use json_export::JsonExporter;
