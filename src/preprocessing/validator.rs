//! Post-processing validation with detailed error and warning reporting.
//!
//! The validator is purely observational: it scans the enriched table,
//! asserts the pipeline invariants, and produces a quality report. Findings
//! that are schema-level defects (aggregate rows remaining, rates outside
//! `[0, 100]`) are errors; data-quality imperfections inherent to the source
//! (retroactive cumulative decreases, residual nulls) are warnings.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::domain::{
    has_column, ColumnCatalog, ColumnCategory, AGGREGATE_ENTITIES, ENTITY_COL, PERCENTAGE_COLUMNS,
};
use crate::error::PipelineResult;
use crate::transformations::cleaning::sort_by_entity_date;

/// Validation outcome with categorized issues and quality statistics.
///
/// Errors make `is_valid` false and stop the pipeline before the exporter
/// runs; warnings are informational and never fail a run.
///
/// # Examples
///
/// ```
/// use covid_prep::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_warning("3 monotonicity violations".to_string());
/// assert!(result.is_valid);
///
/// result.add_error("Aggregate rows remain".to_string());
/// assert!(!result.is_valid);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: QualityStats,
}

/// Quality report computed during validation.
///
/// Row counts before/after filtering are filled in by the pipeline, which is
/// the only component that sees both sides of the entity filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityStats {
    pub rows_before_filter: usize,
    pub rows_after_filter: usize,
    pub aggregate_rows_removed: usize,
    pub monotonicity_violations: usize,
    pub out_of_range_rates: usize,
    /// Percentage of remaining nulls per column category.
    pub null_pct_by_category: HashMap<String, f64>,
    pub generated_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: QualityStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for QualityStats {
    fn default() -> Self {
        Self {
            rows_before_filter: 0,
            rows_after_filter: 0,
            aggregate_rows_removed: 0,
            monotonicity_violations: 0,
            out_of_range_rates: 0,
            null_pct_by_category: HashMap::new(),
            generated_at: Utc::now(),
        }
    }
}

/// Validator for the cleaned, enriched table.
pub struct DatasetValidator;

impl DatasetValidator {
    /// Scan `df` and assert the post-processing invariants.
    ///
    /// Never mutates data. Checks:
    /// - no denylisted aggregate entity remains (error)
    /// - percentage metrics lie in `[0, 100]` or are null (error)
    /// - cumulative counters are non-decreasing within each entity (warning;
    ///   raw-data corrections occasionally cause small retroactive decreases)
    /// - remaining-null percentage per column category (stats only)
    pub fn validate(df: &DataFrame, catalog: &ColumnCatalog) -> PipelineResult<ValidationResult> {
        let mut result = ValidationResult::new();
        result.stats.rows_after_filter = df.height();

        Self::check_aggregates(df, &mut result)?;
        Self::check_percentage_ranges(df, &mut result)?;
        Self::check_monotonicity(df, catalog, &mut result)?;
        Self::collect_null_stats(df, catalog, &mut result)?;

        Ok(result)
    }

    fn check_aggregates(df: &DataFrame, result: &mut ValidationResult) -> PipelineResult<()> {
        let entities = df.column(ENTITY_COL)?.str()?;
        let remaining = entities
            .into_iter()
            .flatten()
            .filter(|entity| AGGREGATE_ENTITIES.contains(entity))
            .count();

        if remaining > 0 {
            result.add_error(format!(
                "{} aggregate entity rows remain after filtering",
                remaining
            ));
        }
        Ok(())
    }

    fn check_percentage_ranges(
        df: &DataFrame,
        result: &mut ValidationResult,
    ) -> PipelineResult<()> {
        let mut out_of_range = 0usize;
        for name in PERCENTAGE_COLUMNS {
            if !has_column(df, name) {
                continue;
            }
            let values = df.column(name)?.f64()?;
            let bad = values
                .into_iter()
                .flatten()
                .filter(|v| !(0.0..=100.0).contains(v) || !v.is_finite())
                .count();
            if bad > 0 {
                result.add_error(format!("Column {} has {} values outside [0, 100]", name, bad));
            }
            out_of_range += bad;
        }
        result.stats.out_of_range_rates = out_of_range;
        Ok(())
    }

    fn check_monotonicity(
        df: &DataFrame,
        catalog: &ColumnCatalog,
        result: &mut ValidationResult,
    ) -> PipelineResult<()> {
        let sorted = sort_by_entity_date(df)?;
        let entities = sorted.column(ENTITY_COL)?.str()?;

        let mut violations = 0usize;
        for name in catalog.columns_in(ColumnCategory::Cumulative) {
            if !has_column(&sorted, name) {
                continue;
            }
            let values = sorted.column(name)?.f64()?;

            let mut previous_entity: Option<&str> = None;
            let mut previous_value: Option<f64> = None;
            for i in 0..sorted.height() {
                let entity = entities.get(i);
                if entity != previous_entity {
                    previous_entity = entity;
                    previous_value = None;
                }
                if let Some(value) = values.get(i) {
                    if let Some(prev) = previous_value {
                        if value < prev {
                            violations += 1;
                        }
                    }
                    previous_value = Some(value);
                }
            }
        }

        if violations > 0 {
            result.add_warning(format!(
                "{} cumulative counter decreases within an entity (retroactive source corrections)",
                violations
            ));
        }
        result.stats.monotonicity_violations = violations;
        Ok(())
    }

    fn collect_null_stats(
        df: &DataFrame,
        catalog: &ColumnCatalog,
        result: &mut ValidationResult,
    ) -> PipelineResult<()> {
        let mut cells: HashMap<&'static str, (usize, usize)> = HashMap::new();

        for entry in &catalog.columns {
            if !has_column(df, &entry.name) {
                continue;
            }
            let column = df.column(&entry.name)?;
            let slot = cells.entry(entry.category.label()).or_insert((0, 0));
            slot.0 += column.null_count();
            slot.1 += df.height();
        }

        for (label, (nulls, total)) in cells {
            if total > 0 {
                result
                    .stats
                    .null_pct_by_category
                    .insert(label.to_string(), 100.0 * nulls as f64 / total as f64);
            }
        }
        Ok(())
    }
}
