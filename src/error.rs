//! Error types for the preprocessing pipeline.

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type for pipeline operations.
///
/// All variants are fatal: the pipeline aborts at the stage that detected
/// the problem and no output artifact is written. Data-quality findings that
/// are not schema or I/O problems are reported as validator warnings instead
/// of raised through this type.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required column is missing or a column cannot be parsed to its
    /// expected type.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A data column has no entry in the column catalog, so no imputation
    /// strategy can be selected for it.
    #[error("No imputation category configured for column '{0}'")]
    Imputation(String),

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A post-processing invariant was violated; the exporter is not run.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Read or write failure. The prior output artifact, if any, is left
    /// untouched.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}
