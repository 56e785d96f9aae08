//! Vecindario import CLI
//!
//! Drives the bulk import pipeline from the command line: template
//! generation, offline validation and full import runs against a
//! JSON-lines output file.

mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use vecindario_import::config::ImportConfig;
use vecindario_import::services::commit::CommitOptions;
use vecindario_import::services::export;
use vecindario_import::services::job_history::ImportHistory;
use vecindario_import::services::pipeline::ImportPipeline;
use vecindario_import::services::writer::JsonlWriter;
use vecindario_import::types::{
    Catalog, CommitEvent, CommitStatusUpdate, ConfirmBatch, ImportRow, ImportSchema, ReportImport,
    RowStatus,
    StateImport,
};

use cli::{Cli, Command, EntityKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "import.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,vecindario_import=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer()) // stdout
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        ) // file
        .init();

    let cli = Cli::parse();
    let config = ImportConfig::from_env()?;

    match cli.command {
        Command::Template { entity, output } => run_template(entity, output.as_deref(), &config),
        Command::Validate {
            entity,
            file,
            catalog,
            query,
        } => run_validate(entity, &file, catalog.as_deref(), query.as_deref(), &config),
        Command::Import {
            entity,
            file,
            catalog,
            output,
            yes,
            delay_ms,
        } => {
            run_import(
                entity,
                &file,
                catalog.as_deref(),
                &output,
                yes,
                delay_ms,
                &config,
            )
            .await
        }
    }
}

fn status_label(status: RowStatus) -> &'static str {
    match status {
        RowStatus::Pending => "pendiente",
        RowStatus::Processing => "procesando",
        RowStatus::Success => "éxito",
        RowStatus::Error => "error",
        RowStatus::Warning => "advertencia",
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let path =
        path.context("la entidad report requiere --catalog con las tablas de categorías y estados")?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("no se pudo leer el catálogo {}", path.display()))?;
    Catalog::from_json(&content)
        .with_context(|| format!("catálogo inválido: {}", path.display()))
}

fn run_template(entity: EntityKind, output: Option<&Path>, config: &ImportConfig) -> Result<()> {
    let csv = match entity {
        EntityKind::Report => export::template_csv::<ReportImport>(config.csv_delimiter)?,
        EntityKind::State => export::template_csv::<StateImport>(config.csv_delimiter)?,
    };
    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("no se pudo escribir {}", path.display()))?;
            info!("Template written to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn print_row_diagnostics<S: ImportSchema>(row: &ImportRow<S>) {
    println!("  fila {}: {}", row.index, status_label(row.status));
    if let Some(error) = &row.error {
        println!("    error [{}]: {}", error.field, error.message);
    }
    for warning in &row.warnings {
        println!("    aviso [{}]: {}", warning.field, warning.message);
    }
}

fn run_validate(
    entity: EntityKind,
    file: &Path,
    catalog: Option<&Path>,
    query: Option<&str>,
    config: &ImportConfig,
) -> Result<()> {
    match entity {
        EntityKind::Report => validate_file::<ReportImport>(load_catalog(catalog)?, file, query, config),
        EntityKind::State => validate_file::<StateImport>((), file, query, config),
    }
}

fn validate_file<S: ImportSchema>(
    context: S::Context,
    file: &Path,
    query: Option<&str>,
    config: &ImportConfig,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("no se pudo leer {}", file.display()))?;
    let mut pipeline = ImportPipeline::<S>::new(context, config.csv_delimiter);
    let total = pipeline.load(&content)?;

    let rows = match query {
        Some(q) => pipeline.search(q),
        None => pipeline.rows().iter().collect(),
    };
    for row in rows {
        print_row_diagnostics(row);
    }

    println!(
        "{} filas, {} con errores, {} con advertencias",
        total,
        pipeline.error_count(),
        pipeline.warning_count()
    );
    if pipeline.can_commit() {
        println!("El lote está listo para importarse");
    } else {
        println!("El lote NO puede importarse hasta corregir o eliminar los errores");
    }
    Ok(())
}

async fn run_import(
    entity: EntityKind,
    file: &Path,
    catalog: Option<&Path>,
    output: &Path,
    yes: bool,
    delay_ms: Option<u64>,
    config: &ImportConfig,
) -> Result<()> {
    match entity {
        EntityKind::Report => {
            import_file::<ReportImport>(load_catalog(catalog)?, file, output, yes, delay_ms, config)
                .await
        }
        EntityKind::State => {
            import_file::<StateImport>((), file, output, yes, delay_ms, config).await
        }
    }
}

async fn import_file<S: ImportSchema>(
    context: S::Context,
    file: &Path,
    output: &Path,
    yes: bool,
    delay_ms: Option<u64>,
    config: &ImportConfig,
) -> Result<()> {
    let history = ImportHistory::with_file(config.history_file.clone());
    let run_tag = Uuid::new_v4();
    let started_at = Utc::now();
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("no se pudo leer {}", file.display()))?;

    let mut pipeline = ImportPipeline::<S>::new(context, config.csv_delimiter);
    let total = match pipeline.load(&content) {
        Ok(total) => total,
        Err(e) => {
            history.record_failed(run_tag, S::kind(), filename.as_deref(), started_at, e.to_string());
            return Err(e.into());
        }
    };
    println!("{} filas leídas de {}", total, file.display());

    for row in pipeline.rows() {
        if row.error.is_some() || !row.warnings.is_empty() {
            print_row_diagnostics(row);
        }
    }

    if !pipeline.can_commit() {
        let message = format!(
            "hay {} filas con errores; corrígelas o elimínalas antes de importar",
            pipeline.error_count()
        );
        history.record_failed(run_tag, S::kind(), filename.as_deref(), started_at, message.clone());
        anyhow::bail!(message);
    }
    if pipeline.needs_confirmation() && !yes {
        anyhow::bail!(
            "hay {} filas con advertencias; revisa los avisos y vuelve a ejecutar con --yes",
            pipeline.warning_count()
        );
    }

    let writer = JsonlWriter::new(output);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<CommitStatusUpdate>();
    let printer = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            if let CommitEvent::Progress {
                processed,
                total,
                succeeded,
                failed,
                ..
            } = update.event
            {
                println!(
                    "  {}/{} filas procesadas ({} ok, {} con error)",
                    processed, total, succeeded, failed
                );
            }
        }
    });

    let opts = CommitOptions {
        confirm: if yes {
            ConfirmBatch::confirmed()
        } else {
            ConfirmBatch::default()
        },
        pacing: delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.pacing()),
        cancel: None,
    };

    let result = pipeline.commit(&writer, &opts, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;

    match result {
        Ok(summary) => {
            println!(
                "Importación terminada: {} de {} filas importadas, {} con error, {} omitidas",
                summary.succeeded, summary.total, summary.failed, summary.skipped
            );
            for row in pipeline.rows() {
                if row.status == RowStatus::Error {
                    print_row_diagnostics(row);
                }
            }
            history.record_run(run_tag, S::kind(), filename.as_deref(), started_at, summary);
            Ok(())
        }
        Err(refusal) => {
            history.record_failed(
                run_tag,
                S::kind(),
                filename.as_deref(),
                started_at,
                refusal.to_string(),
            );
            Err(refusal.into())
        }
    }
}
