//! Core library for the ledger-sheets command line application.
//!
//! Bookkeeping exports from several accounting products are read as
//! worksheets, matched against a catalog of template descriptors and turned
//! into canonical [`model::OperationRecord`]s. Template knowledge lives under
//! [`template`], per-cell conversion in [`normalize`], row extraction in
//! [`extract`], record assembly in [`build`] and aggregation in [`summary`].
//! [`ingest`] wires the stages together and [`io`] adapts spreadsheet files.

pub mod build;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod io;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod template;

pub use error::{ConfigurationMismatch, FieldError, IngestError, ResolutionError, Result};
pub use ingest::{IngestOutcome, Ingestor, Operations};
pub use model::{OperationRecord, SummaryResult, TemplateId, ValidationIssue, Worksheet};
pub use template::{DetectorConfig, TemplateCatalog, TemplateChoice};
