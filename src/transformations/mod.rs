//! Table-level transformations applied ahead of imputation.
//!
//! - [`cleaning`]: duplicate (entity, date) removal and entity/date ordering
//! - [`filtering`]: aggregate-entity removal
//!
//! # Example
//!
//! ```no_run
//! use covid_prep::transformations::{sort_by_entity_date, EntityFilter};
//! use polars::prelude::*;
//!
//! # fn example(df: DataFrame) -> Result<(), PolarsError> {
//! let outcome = EntityFilter::new().apply(&df)?;
//! let ordered = sort_by_entity_date(&outcome.dataframe)?;
//! # Ok(())
//! # }
//! ```

pub mod cleaning;
pub mod filtering;

pub use cleaning::{drop_duplicate_rows, sort_by_entity_date};
pub use filtering::{EntityFilter, FilterOutcome};
