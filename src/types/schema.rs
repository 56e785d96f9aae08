//! Entity schema trait
//!
//! One import pipeline, two entity kinds. Everything entity-specific —
//! raw CSV shape, validation/defaulting rules, canonical headers, template
//! content — lives behind this trait; the parser, validator, commit engine
//! and search/export surfaces are generic over it.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::row::RowOutcome;

pub trait ImportSchema: Sized + Send + Sync + 'static {
    /// Untouched field values as read from the file, every field optional.
    type Raw: DeserializeOwned + Serialize + Clone + Debug + Default + Send + Sync;

    /// Fully resolved candidate record, ready for persistence.
    type Record: Serialize + Clone + Debug + Send + Sync;

    /// Shared defaulting context consulted during validation (lookup tables
    /// for reports, nothing for states). A snapshot, so validation stays pure.
    type Context: Send + Sync;

    /// Entity kind name used in logs and history entries.
    fn kind() -> &'static str;

    /// Canonical header row of the tabular format.
    fn headers() -> &'static [&'static str];

    /// Example rows for the downloadable template.
    fn template_rows() -> Vec<Self::Raw>;

    /// Evaluate field rules in fixed order and classify the outcome.
    /// Must be deterministic for a given (raw, context) pair.
    fn validate(raw: &Self::Raw, ctx: &Self::Context) -> RowOutcome<Self::Record>;

    /// Textual raw fields, in header order, for the search surface.
    fn search_text(raw: &Self::Raw) -> Vec<&str>;

    /// Raw field values as CSV cells, in header order, for export.
    fn export_fields(raw: &Self::Raw) -> Vec<String>;
}
