//! Preprocessing and feature-engineering pipeline for the OWID COVID-19
//! dataset.
//!
//! The crate turns the raw long-format time series (one row per reporting
//! entity per date) into a cleaned, feature-enriched table: aggregate rows
//! are removed, missing values are imputed per column category, six derived
//! per-row metrics are computed, and the result is validated and exported.
//!
//! The stages run strictly in order: load, filter, impute, enrich, validate,
//! export. See [`preprocessing::PreprocessPipeline`] for the orchestration
//! entry point.

pub mod core;
pub mod error;
pub mod io;
pub mod preprocessing;
pub mod transformations;

pub use error::{PipelineError, PipelineResult};
pub use preprocessing::{PreprocessConfig, PreprocessPipeline, PreprocessResult};
