//! Whole-set validation pass

use tracing::debug;

use crate::types::{ImportSchema, ImportRow};

/// Run the schema's field rules over every row, recomputing status,
/// warnings and final data from the raw fields.
///
/// Pure with respect to everything but the rows themselves, and idempotent:
/// a second pass over already-validated rows changes nothing. Rows owned by
/// the commit engine (`processing`/`success`) are left untouched.
pub fn validate_rows<S: ImportSchema>(rows: &mut [ImportRow<S>], ctx: &S::Context) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for row in rows.iter_mut() {
        if row.status.is_locked() {
            continue;
        }
        row.apply_outcome(S::validate(&row.raw, ctx));
        if row.error.is_some() {
            errors += 1;
        } else if !row.warnings.is_empty() {
            warnings += 1;
        }
    }

    debug!(
        "Validated {} {} rows: {} errors, {} with warnings",
        rows.len(),
        S::kind(),
        errors,
        warnings
    );
}
