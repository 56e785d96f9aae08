//! Row types for CSV import batches

use serde::{Deserialize, Serialize};

use super::schema::ImportSchema;

/// Row lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Pending,
    Processing,
    Success,
    Error,
    Warning,
}

impl RowStatus {
    /// True for rows owned by the commit engine, which the editor may not touch.
    pub fn is_locked(&self) -> bool {
        matches!(self, RowStatus::Processing | RowStatus::Success)
    }
}

/// Single per-field diagnostic attached to a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    pub field: String,
    pub message: String,
    pub original_value: Option<String>,
}

impl RowIssue {
    pub fn new(field: &str, message: impl Into<String>, original_value: Option<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            original_value,
        }
    }
}

/// Outcome of validating a single raw row
#[derive(Debug, Clone)]
pub enum RowOutcome<R> {
    /// Row is eligible for commit; warnings record substituted defaults
    Valid {
        record: R,
        warnings: Vec<RowIssue>,
    },
    /// Row is excluded from commit entirely
    Invalid {
        error: RowIssue,
        warnings: Vec<RowIssue>,
    },
}

/// One file-derived candidate awaiting validation/commit.
///
/// `index` is the 1-based position among data rows in the source file and
/// stays stable across edits and deletions of other rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
pub struct ImportRow<S: ImportSchema> {
    pub index: u32,
    pub raw: S::Raw,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowIssue>,
    pub warnings: Vec<RowIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_data: Option<S::Record>,
}

impl<S: ImportSchema> ImportRow<S> {
    /// Fresh row straight out of the parser, not yet validated.
    pub fn parsed(index: u32, raw: S::Raw) -> Self {
        Self {
            index,
            raw,
            status: RowStatus::Pending,
            error: None,
            warnings: Vec::new(),
            final_data: None,
        }
    }

    /// Apply a validation outcome, recomputing status and final data.
    ///
    /// Status precedence: error > warning > pending. A row with an error
    /// never carries final data; any other row always does.
    pub fn apply_outcome(&mut self, outcome: RowOutcome<S::Record>) {
        match outcome {
            RowOutcome::Valid { record, warnings } => {
                self.status = if warnings.is_empty() {
                    RowStatus::Pending
                } else {
                    RowStatus::Warning
                };
                self.error = None;
                self.warnings = warnings;
                self.final_data = Some(record);
            }
            RowOutcome::Invalid { error, warnings } => {
                self.status = RowStatus::Error;
                self.error = Some(error);
                self.warnings = warnings;
                self.final_data = None;
            }
        }
    }

    /// Record a per-row persistence failure from the commit engine.
    pub fn mark_commit_failed(&mut self, message: impl Into<String>) {
        self.status = RowStatus::Error;
        self.error = Some(RowIssue::new("persistencia", message, None));
    }

    /// Error message text, if the row is in error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::state::{StateImport, StateRecord};

    fn blank_row() -> ImportRow<StateImport> {
        ImportRow::parsed(1, Default::default())
    }

    #[test]
    fn test_parsed_row_starts_pending() {
        let row = blank_row();
        assert_eq!(row.status, RowStatus::Pending);
        assert!(row.error.is_none());
        assert!(row.final_data.is_none());
    }

    #[test]
    fn test_invalid_outcome_clears_final_data() {
        let mut row = blank_row();
        row.apply_outcome(RowOutcome::Invalid {
            error: RowIssue::new("latitud", "Falta la latitud", None),
            warnings: vec![],
        });
        assert_eq!(row.status, RowStatus::Error);
        assert!(row.final_data.is_none());
        assert_eq!(row.error_message(), Some("Falta la latitud"));
    }

    #[test]
    fn test_warning_outcome_keeps_final_data() {
        let mut row = blank_row();
        row.apply_outcome(RowOutcome::Valid {
            record: StateRecord {
                name: "Nuevo".into(),
                description: String::new(),
                color: "#3B82F6".into(),
                icon: "map-pin".into(),
            },
            warnings: vec![RowIssue::new("color", "Color vacío", None)],
        });
        assert_eq!(row.status, RowStatus::Warning);
        assert!(row.final_data.is_some());
    }

    #[test]
    fn test_locked_statuses() {
        assert!(RowStatus::Processing.is_locked());
        assert!(RowStatus::Success.is_locked());
        assert!(!RowStatus::Pending.is_locked());
        assert!(!RowStatus::Warning.is_locked());
        assert!(!RowStatus::Error.is_locked());
    }

    #[test]
    fn test_row_status_serializes_lowercase() {
        let json = serde_json::to_string(&RowStatus::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
