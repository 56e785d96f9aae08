//! Vecindario bulk import engine
//!
//! Turns an operator-supplied CSV file into a set of validated, defaulted,
//! correctable candidate records and commits them one at a time with
//! partial-failure tolerance and live progress. One generic pipeline, two
//! entity kinds: civic-issue reports and report states.
//!
//! The pipeline stages:
//! 1. [`services::parser`] — file → ordered working set of rows
//! 2. [`services::validator`] — per-row field rules, soft defaults, hard errors
//! 3. [`services::pipeline::ImportPipeline`] — edits, deletion, search, export
//! 4. [`services::commit`] — sequential persistence with per-row isolation

pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;

pub use config::ImportConfig;
pub use error::{CommitRefusal, ParseError, PipelineError};
pub use services::commit::CommitOptions;
pub use services::pipeline::ImportPipeline;
pub use services::writer::EntityWriter;
