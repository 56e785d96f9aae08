//! Review/search surface over the working set

use crate::types::{ImportRow, ImportSchema};

/// Case-insensitive substring filter over every textual raw field of a row
/// and its error message. Never mutates the working set; an empty query
/// matches everything.
pub fn search_rows<'a, S: ImportSchema>(
    rows: &'a [ImportRow<S>],
    query: &str,
) -> Vec<&'a ImportRow<S>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| {
            S::search_text(&row.raw)
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
                || row
                    .error_message()
                    .is_some_and(|m| m.to_lowercase().contains(&needle))
        })
        .collect()
}
