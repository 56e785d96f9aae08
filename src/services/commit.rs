//! Sequential commit engine
//!
//! Persists eligible rows one at a time, strictly in index order, awaiting
//! each create before moving on. One row's failure never aborts the batch;
//! progress is recomputed and emitted after every row.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::CommitRefusal;
use crate::services::writer::EntityWriter;
use crate::types::{
    CommitEvent, CommitStatusUpdate, CommitSummary, ConfirmBatch, ImportRow, ImportSchema,
    RowStatus,
};

/// Knobs for a single commit run
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Batch-level confirmation covering every warning row
    pub confirm: ConfirmBatch,
    /// Artificial delay between rows so progress stays visibly incremental.
    /// Purely presentational; zero is correct for tests.
    pub pacing: Duration,
    /// Cooperative cancellation, checked between rows
    pub cancel: Option<CancellationToken>,
}

/// True when the working set is non-empty and free of error rows.
pub fn can_commit<S: ImportSchema>(rows: &[ImportRow<S>]) -> bool {
    !rows.is_empty() && error_count(rows) == 0
}

pub fn error_count<S: ImportSchema>(rows: &[ImportRow<S>]) -> u32 {
    rows.iter().filter(|r| r.status == RowStatus::Error).count() as u32
}

pub fn warning_count<S: ImportSchema>(rows: &[ImportRow<S>]) -> u32 {
    rows.iter()
        .filter(|r| r.status == RowStatus::Warning)
        .count() as u32
}

/// Gate check, then sequential execution over the working set.
///
/// Refused entirely while any row is in error; a batch containing warning
/// rows additionally needs one explicit confirmation. During execution each
/// row transitions to `processing`, then `success` or `error`; failures are
/// isolated and execution always continues to the next row.
pub async fn run_commit<S, W>(
    run_id: Uuid,
    rows: &mut [ImportRow<S>],
    writer: &W,
    opts: &CommitOptions,
    events: Option<&UnboundedSender<CommitStatusUpdate>>,
) -> Result<CommitSummary, CommitRefusal>
where
    S: ImportSchema,
    W: EntityWriter<S::Record> + ?Sized,
{
    if rows.is_empty() {
        return Err(CommitRefusal::EmptyBatch);
    }
    let errors = error_count(rows);
    if errors > 0 {
        return Err(CommitRefusal::ErrorsPresent { count: errors });
    }
    let warnings = warning_count(rows);
    if warnings > 0 && !opts.confirm.confirmed {
        return Err(CommitRefusal::ConfirmationRequired { count: warnings });
    }

    let emit = |event: CommitEvent| {
        if let Some(tx) = events {
            let _ = tx.send(CommitStatusUpdate::new(run_id, event));
        }
    };

    let started = Instant::now();
    let total = rows.len() as u32;
    let mut processed = 0u32;
    let mut succeeded = 0u32;
    let mut failed = 0u32;
    let mut with_warnings = 0u32;
    let mut skipped = 0u32;
    let mut cancelled = false;

    info!("Import run {} started: {} {} rows", run_id, total, S::kind());
    emit(CommitEvent::Started { total });

    for row in rows.iter_mut() {
        if opts
            .cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            cancelled = true;
            break;
        }

        // An error row must never reach the writer
        if row.status == RowStatus::Error {
            skipped += 1;
            processed += 1;
            emit(CommitEvent::Progress {
                processed,
                total,
                succeeded,
                failed,
                skipped,
            });
            continue;
        }

        let had_warnings = !row.warnings.is_empty();
        row.status = RowStatus::Processing;
        emit(CommitEvent::Row {
            index: row.index,
            status: RowStatus::Processing,
            error: None,
        });

        let result = match row.final_data.as_ref() {
            Some(record) => writer.create(record).await,
            None => Err(anyhow::anyhow!("registro final ausente")),
        };

        match result {
            Ok(()) => {
                row.status = RowStatus::Success;
                row.error = None;
                succeeded += 1;
                if had_warnings {
                    with_warnings += 1;
                }
                emit(CommitEvent::Row {
                    index: row.index,
                    status: RowStatus::Success,
                    error: None,
                });
            }
            Err(e) => {
                warn!("Import run {}: row {} failed: {}", run_id, row.index, e);
                row.mark_commit_failed(e.to_string());
                failed += 1;
                emit(CommitEvent::Row {
                    index: row.index,
                    status: RowStatus::Error,
                    error: Some(e.to_string()),
                });
            }
        }

        processed += 1;
        emit(CommitEvent::Progress {
            processed,
            total,
            succeeded,
            failed,
            skipped,
        });

        if !opts.pacing.is_zero() && processed < total {
            tokio::time::sleep(opts.pacing).await;
        }
    }

    // Rows never attempted because of cancellation
    skipped += total - processed;

    let summary = CommitSummary {
        total,
        succeeded,
        failed,
        with_warnings,
        skipped,
        cancelled,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    if cancelled {
        info!(
            "Import run {} cancelled: {}/{} rows attempted",
            run_id, processed, total
        );
        emit(CommitEvent::Cancelled {
            summary: summary.clone(),
        });
    } else {
        info!(
            "Import run {} completed: {}/{} succeeded, {} failed",
            run_id, succeeded, total, failed
        );
        emit(CommitEvent::Completed {
            summary: summary.clone(),
        });
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use crate::services::validator::validate_rows;
    use crate::types::state::{StateImport, StateRawRow, StateRecord};

    /// Records every created entity; fails on demand for listed names.
    #[derive(Default)]
    struct RecordingWriter {
        created: Mutex<Vec<String>>,
        fail_names: Vec<String>,
        cancel_after_first: Option<CancellationToken>,
    }

    #[async_trait::async_trait]
    impl EntityWriter<StateRecord> for RecordingWriter {
        async fn create(&self, record: &StateRecord) -> anyhow::Result<()> {
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            if self.fail_names.contains(&record.name) {
                anyhow::bail!("clave duplicada: {}", record.name);
            }
            self.created.lock().push(record.name.clone());
            Ok(())
        }
    }

    fn state_row(index: u32, name: &str, color: Option<&str>) -> ImportRow<StateImport> {
        ImportRow::parsed(
            index,
            StateRawRow {
                nombre: Some(name.to_string()),
                descripcion: Some("desc".into()),
                color: color.map(str::to_string),
                icono: Some("inbox".into()),
            },
        )
    }

    fn validated(mut rows: Vec<ImportRow<StateImport>>) -> Vec<ImportRow<StateImport>> {
        validate_rows(&mut rows, &());
        rows
    }

    #[test]
    fn test_gate_refuses_empty_batch() {
        let mut rows: Vec<ImportRow<StateImport>> = vec![];
        let writer = RecordingWriter::default();
        let result = tokio_test::block_on(run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            None,
        ));
        assert!(matches!(result, Err(CommitRefusal::EmptyBatch)));
    }

    #[tokio::test]
    async fn test_gate_refuses_while_any_row_has_error() {
        let mut rows = validated(vec![state_row(1, "Nuevo", Some("#3B82F6"))]);
        rows[0].mark_commit_failed("previo");
        let writer = RecordingWriter::default();

        let result = run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            None,
        )
        .await;

        assert!(matches!(
            result,
            Err(CommitRefusal::ErrorsPresent { count: 1 })
        ));
        assert!(writer.created.lock().is_empty());
    }

    #[tokio::test]
    async fn test_warning_batch_requires_single_confirmation() {
        let mut rows = validated(vec![
            state_row(1, "Nuevo", Some("#3B82F6")),
            state_row(2, "Abierto", None),
        ]);
        let writer = RecordingWriter::default();

        let result = run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(CommitRefusal::ConfirmationRequired { count: 1 })
        ));

        let opts = CommitOptions {
            confirm: ConfirmBatch { confirmed: true },
            ..Default::default()
        };
        let summary = run_commit(Uuid::new_v4(), &mut rows, &writer, &opts, None)
            .await
            .unwrap();
        assert_eq!(summary.succeeded, 2);
    }

    #[tokio::test]
    async fn test_state_scenario_three_rows_two_warnings() {
        let mut rows = validated(vec![
            state_row(1, "Nuevo", Some("#3B82F6")),
            state_row(2, "Abierto", None),
            state_row(3, "Cerrado", Some("notacolor")),
        ]);
        assert_eq!(error_count(&rows), 0);
        assert_eq!(warning_count(&rows), 2);
        let defaulted: Vec<_> = rows
            .iter()
            .filter_map(|r| r.final_data.as_ref())
            .map(|d| d.color.clone())
            .collect();
        assert_eq!(defaulted, vec!["#3B82F6", "#3B82F6", "#3B82F6"]);

        let writer = RecordingWriter::default();
        let opts = CommitOptions {
            confirm: ConfirmBatch { confirmed: true },
            ..Default::default()
        };
        let summary = run_commit(Uuid::new_v4(), &mut rows, &writer, &opts, None)
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.with_warnings, 2);
        assert!(rows.iter().all(|r| r.status == RowStatus::Success));
    }

    #[tokio::test]
    async fn test_row_failure_is_isolated() {
        let mut rows = validated(vec![
            state_row(1, "Nuevo", Some("#3B82F6")),
            state_row(2, "Abierto", Some("#F59E0B")),
            state_row(3, "Cerrado", Some("#22C55E")),
        ]);
        let writer = RecordingWriter {
            fail_names: vec!["Abierto".into()],
            ..Default::default()
        };

        let summary = run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded + summary.failed + summary.skipped, summary.total);
        assert_eq!(rows[1].status, RowStatus::Error);
        assert!(rows[1].error_message().unwrap().contains("clave duplicada"));
        assert_eq!(rows[2].status, RowStatus::Success);
        assert_eq!(*writer.created.lock(), vec!["Nuevo", "Cerrado"]);
    }

    #[tokio::test]
    async fn test_rows_committed_in_index_order() {
        let mut rows = validated(vec![
            state_row(1, "Primero", Some("#111111")),
            state_row(2, "Segundo", Some("#222222")),
            state_row(3, "Tercero", Some("#333333")),
        ]);
        let writer = RecordingWriter::default();
        run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(*writer.created.lock(), vec!["Primero", "Segundo", "Tercero"]);
    }

    #[tokio::test]
    async fn test_progress_emitted_after_every_row() {
        let mut rows = validated(vec![
            state_row(1, "Nuevo", Some("#3B82F6")),
            state_row(2, "Abierto", Some("#F59E0B")),
        ]);
        let writer = RecordingWriter::default();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        run_commit(
            Uuid::new_v4(),
            &mut rows,
            &writer,
            &CommitOptions::default(),
            Some(&tx),
        )
        .await
        .unwrap();
        drop(tx);

        let mut progress = Vec::new();
        while let Some(update) = rx.recv().await {
            if let CommitEvent::Progress { processed, .. } = update.event {
                progress.push(processed);
            }
        }
        assert_eq!(progress, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_cancellation_between_rows() {
        let token = CancellationToken::new();
        let mut rows = validated(vec![
            state_row(1, "Nuevo", Some("#3B82F6")),
            state_row(2, "Abierto", Some("#F59E0B")),
            state_row(3, "Cerrado", Some("#22C55E")),
        ]);
        let writer = RecordingWriter {
            cancel_after_first: Some(token.clone()),
            ..Default::default()
        };
        let opts = CommitOptions {
            cancel: Some(token),
            ..Default::default()
        };

        let summary = run_commit(Uuid::new_v4(), &mut rows, &writer, &opts, None)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.succeeded + summary.failed + summary.skipped, summary.total);
        assert_eq!(rows[1].status, RowStatus::Pending);
        assert_eq!(rows[2].status, RowStatus::Pending);
    }
}
