//! Dataset input and output.
//!
//! [`loaders`] reads the raw CSV and establishes the canonical schema (typed
//! date column, `Float64` numeric columns). [`exporter`] writes the cleaned
//! table in a stable column order with an atomic replace of the output
//! artifact.

pub mod exporter;
pub mod loaders;

pub use exporter::DatasetExporter;
pub use loaders::{DatasetLoader, LoadResult};
