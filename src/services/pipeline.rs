//! Pipeline controller
//!
//! Single owner of the import state: working set, defaulting context and
//! the processing flag. Every operation — load, edit, delete, search,
//! export, commit — goes through here; nothing else mutates rows.

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use uuid::Uuid;

use crate::error::{CommitRefusal, PipelineError};
use crate::services::commit::{self, CommitOptions};
use crate::services::writer::EntityWriter;
use crate::services::{export, parser, search, validator};
use crate::types::{
    CommitStatusUpdate, CommitSummary, EditRequest, EditResult, ImportRow, ImportSchema, RowStatus,
};

pub struct ImportPipeline<S: ImportSchema> {
    rows: Vec<ImportRow<S>>,
    context: S::Context,
    delimiter: u8,
    is_processing: bool,
}

impl<S: ImportSchema> ImportPipeline<S> {
    pub fn new(context: S::Context, delimiter: u8) -> Self {
        Self {
            rows: Vec::new(),
            context,
            delimiter,
            is_processing: false,
        }
    }

    pub fn rows(&self) -> &[ImportRow<S>] {
        &self.rows
    }

    pub fn row(&self, index: u32) -> Option<&ImportRow<S>> {
        self.rows.iter().find(|r| r.index == index)
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn can_commit(&self) -> bool {
        commit::can_commit(&self.rows)
    }

    pub fn needs_confirmation(&self) -> bool {
        commit::warning_count(&self.rows) > 0
    }

    pub fn error_count(&self) -> u32 {
        commit::error_count(&self.rows)
    }

    pub fn warning_count(&self) -> u32 {
        commit::warning_count(&self.rows)
    }

    fn ensure_idle(&self) -> Result<(), PipelineError> {
        if self.is_processing {
            Err(PipelineError::Busy)
        } else {
            Ok(())
        }
    }

    /// Parse a file and replace the working set with its rows, validated.
    /// On parse failure the previous working set is left untouched.
    pub fn load(&mut self, content: &str) -> Result<usize, PipelineError> {
        self.ensure_idle()?;
        let mut rows = parser::parse::<S>(content, self.delimiter)?;
        validator::validate_rows(&mut rows, &self.context);
        info!("Loaded {} {} rows into working set", rows.len(), S::kind());
        self.rows = rows;
        Ok(self.rows.len())
    }

    /// Re-run validation over the whole working set.
    pub fn validate_all(&mut self) {
        validator::validate_rows(&mut self.rows, &self.context);
    }

    /// Replace the defaulting context (e.g. refreshed lookup tables) and
    /// re-validate everything against it.
    pub fn set_context(&mut self, context: S::Context) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        self.context = context;
        self.validate_all();
        Ok(())
    }

    /// Apply an operator correction to one row, then re-validate the whole
    /// set so shared-context effects show up everywhere. Previous
    /// diagnostics on the edited row are discarded before re-validation.
    pub fn edit(&mut self, request: EditRequest<S::Raw>) -> Result<EditResult, PipelineError> {
        self.ensure_idle()?;
        let position = self
            .rows
            .iter()
            .position(|r| r.index == request.index)
            .ok_or(PipelineError::RowNotFound {
                index: request.index,
            })?;
        if self.rows[position].status.is_locked() {
            return Err(PipelineError::RowLocked {
                index: request.index,
            });
        }

        {
            let row = &mut self.rows[position];
            row.raw = request.raw;
            row.status = RowStatus::Pending;
            row.error = None;
            row.warnings.clear();
            row.final_data = None;
        }
        self.validate_all();

        let row = &self.rows[position];
        Ok(EditResult {
            index: row.index,
            status: row.status,
            error: row.error.clone(),
            warnings: row.warnings.clone(),
        })
    }

    /// Remove a row from the working set. Surviving rows keep their
    /// original indices.
    pub fn delete(&mut self, index: u32) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        let position = self
            .rows
            .iter()
            .position(|r| r.index == index)
            .ok_or(PipelineError::RowNotFound { index })?;
        self.rows.remove(position);
        Ok(())
    }

    /// Discard the working set entirely.
    pub fn reset(&mut self) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        self.rows.clear();
        Ok(())
    }

    /// Non-mutating filter for operator inspection.
    pub fn search(&self, query: &str) -> Vec<&ImportRow<S>> {
        search::search_rows(&self.rows, query)
    }

    /// Serialize the working set — optionally filtered — back to CSV.
    pub fn export_csv(&self, query: Option<&str>) -> anyhow::Result<String> {
        match query {
            Some(q) => export::export_csv::<S>(self.search(q), self.delimiter),
            None => export::export_csv::<S>(&self.rows, self.delimiter),
        }
    }

    /// Run the commit engine over the working set. Edits and deletions are
    /// rejected until the run finishes.
    pub async fn commit<W>(
        &mut self,
        writer: &W,
        opts: &CommitOptions,
        events: Option<&UnboundedSender<CommitStatusUpdate>>,
    ) -> Result<CommitSummary, CommitRefusal>
    where
        W: EntityWriter<S::Record> + ?Sized,
    {
        if self.is_processing {
            return Err(CommitRefusal::AlreadyRunning);
        }
        self.is_processing = true;
        let run_id = Uuid::new_v4();
        let result = commit::run_commit(run_id, &mut self.rows, writer, opts, events).await;
        self.is_processing = false;
        result
    }
}
