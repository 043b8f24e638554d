use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Role, TemplateId};

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type covering the failures that abort processing of a whole file.
///
/// Row-scoped problems never show up here; they are reported as
/// [`ValidationIssue`](crate::model::ValidationIssue)s next to the records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Wrapper for IO failures such as reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when a workbook has no usable worksheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// The template of the file could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The resolved template does not fit the physical sheet layout.
    #[error(transparent)]
    Mismatch(#[from] ConfigurationMismatch),

    /// Raised when a template identifier string is not one of the known five.
    #[error("unknown template identifier '{0}'")]
    UnknownTemplate(String),

    /// Raised when the catalog in use holds no descriptor for the identifier.
    #[error("template {0} is not registered in the catalog")]
    NotFound(TemplateId),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// The header row of a sheet did not identify exactly one template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("header row does not match any known template")]
    NoMatch,

    #[error("header row matches several templates equally well: {candidates:?}")]
    Ambiguous { candidates: Vec<TemplateId> },
}

/// A descriptor references columns the actual sheet does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationMismatch {
    #[error("template {template} requires a '{role}' column which the sheet does not have")]
    MissingColumn { template: TemplateId, role: Role },

    #[error("no header row for template {template} within the first {scanned} rows")]
    HeaderNotFound { template: TemplateId, scanned: usize },
}

/// A single cell failed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unparseable date '{0}'")]
    UnparseableDate(String),

    #[error("unparseable amount '{0}'")]
    UnparseableAmount(String),

    #[error("negative amount '{0}' is not permitted by this template")]
    InvalidAmount(String),
}
