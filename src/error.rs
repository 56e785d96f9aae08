//! Error taxonomy for the import pipeline
//!
//! `ParseError` is fatal and file-level; everything row-level is carried on
//! the rows themselves, never as a Rust error.

use thiserror::Error;

/// File-level parse failure. No rows are produced; the pipeline halts
/// before validation.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("el archivo no se pudo interpretar como CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// Rejected working-set operation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("hay una importación en curso")]
    Busy,
    #[error("fila {index} no encontrada")]
    RowNotFound { index: u32 },
    #[error("la fila {index} ya fue procesada y no puede modificarse")]
    RowLocked { index: u32 },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Commit gate refusal. Nothing is persisted when commit is refused.
#[derive(Debug, Error)]
pub enum CommitRefusal {
    #[error("no hay filas para importar")]
    EmptyBatch,
    #[error("hay {count} filas con errores; corrígelas o elimínalas antes de importar")]
    ErrorsPresent { count: u32 },
    #[error("hay {count} filas con advertencias; se requiere confirmación del lote")]
    ConfirmationRequired { count: u32 },
    #[error("ya hay una importación en curso")]
    AlreadyRunning,
}
