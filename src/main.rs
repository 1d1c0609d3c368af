//! Wiring & DI. Entry point: load config, build the store, compute the report, export it.
//! No business logic here; the report itself comes from ReportService.

use dotenv::dotenv;
use joc_report::adapters::export::{CsvExporter, JsonExporter};
use joc_report::adapters::persistence::{Dataset, MemoryStore, SqliteStore};
use joc_report::adapters::ui::{FixedInputPort, TuiInputPort, print_summary, progress};
use joc_report::ports::{InputPort, MeetingStore, ReportExportPort};
use joc_report::shared::config::{AppConfig, OutputFormat};
use joc_report::usecases::ReportService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let store = open_store(&cfg).await?;

    // --- Request: fully configured, or prompt for the rest ---
    let input: Arc<dyn InputPort> = match cfg.fixed_request()? {
        Some(request) => Arc::new(FixedInputPort::new(request)),
        None => Arc::new(TuiInputPort::new(
            cfg.outcome_set_id.clone(),
            cfg.identity()?,
        )),
    };
    let request = input.request_report().await?;

    let service = ReportService::new(store)
        .with_max_concurrent_fetches(cfg.max_concurrent_fetches_or_default())
        .with_archived(cfg.include_archived_or_default());

    let pb = progress::spinner(format!(
        "Computing report for outcome set {}",
        request.outcome_set_id
    ));
    let result = service.compute_report(&request).await;
    pb.finish_and_clear();
    let report = result?;

    print_summary(&report);

    // --- Export ---
    let exporter: Box<dyn ReportExportPort> = match cfg.output_format_or_default()? {
        OutputFormat::Json => Box::new(JsonExporter),
        OutputFormat::Csv => Box::new(CsvExporter),
    };
    let dest = cfg.output_path.as_deref().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from("./reports").join(format!(
            "joc_{}.{}",
            request.outcome_set_id,
            exporter.extension()
        ))
    });
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("create output dir: {}", e))?;
    }
    exporter.export(&report, &dest).await?;

    Ok(())
}

/// SQLite when JOC_SQLITE_PATH is set (importing JOC_DATA_FILE into it if given),
/// otherwise the JSON dataset held in memory.
async fn open_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn MeetingStore>> {
    match (&cfg.sqlite_path, &cfg.data_file) {
        (Some(db_path), data_file) => {
            let store = SqliteStore::connect(db_path).await?;
            if let Some(path) = data_file {
                store.import(&Dataset::load(path).await?).await?;
            }
            Ok(Arc::new(store))
        }
        (None, Some(path)) => Ok(Arc::new(MemoryStore::from_json_file(path).await?)),
        (None, None) => anyhow::bail!(
            "Set JOC_DATA_FILE (JSON dataset) or JOC_SQLITE_PATH (SQLite database)"
        ),
    }
}
