//! Category-aware missing-value imputation.
//!
//! Each data column is filled with the strategy selected by its
//! [`ColumnCategory`] in the catalog. Fills are windowed over the entity
//! column, so one entity's values never leak into another's, and rows are
//! re-sorted by (entity, ascending date) before any fill executes.

use polars::prelude::*;

use crate::core::domain::{ColumnCatalog, ColumnCategory, DATE_COL, ENTITY_COL};
use crate::error::{PipelineError, PipelineResult};
use crate::transformations::cleaning::sort_by_entity_date;

/// Per-category missing-value imputation over the full table.
///
/// Strategies:
/// - cumulative counters: forward-fill within entity; leading gaps stay null
/// - daily increments: null becomes `0.0`
/// - smoothed metrics: linear interpolation within entity, no extrapolation
/// - static attributes: backward-fill then forward-fill within entity
///
/// A column without a catalog entry fails loud with
/// [`PipelineError::Imputation`] rather than guessing a default.
pub struct Imputer {
    catalog: ColumnCatalog,
}

impl Imputer {
    pub fn new(catalog: ColumnCatalog) -> Self {
        Self { catalog }
    }

    /// Fill missing values in every data column, returning a new table.
    ///
    /// Imputation is idempotent: running it again on its own output changes
    /// nothing.
    pub fn impute(&self, df: &DataFrame) -> PipelineResult<DataFrame> {
        let sorted = sort_by_entity_date(df)?;

        let mut fills: Vec<Expr> = Vec::new();
        for column in sorted.get_columns() {
            let name = column.name().as_str();
            if name == ENTITY_COL || name == DATE_COL {
                continue;
            }

            let category = self
                .catalog
                .category_of(name)
                .ok_or_else(|| PipelineError::Imputation(name.to_string()))?;

            fills.push(Self::fill_expr(column.name().clone(), category));
        }

        if fills.is_empty() {
            return Ok(sorted);
        }

        Ok(sorted.lazy().with_columns(fills).collect()?)
    }

    fn fill_expr(name: PlSmallStr, category: ColumnCategory) -> Expr {
        let by_entity = [col(ENTITY_COL)];
        match category {
            ColumnCategory::Cumulative => col(name)
                .fill_null_with_strategy(FillNullStrategy::Forward(None))
                .over(by_entity),
            ColumnCategory::DailyIncrement => col(name).fill_null(lit(0.0)),
            ColumnCategory::Smoothed => col(name)
                .interpolate(InterpolationMethod::Linear)
                .over(by_entity),
            ColumnCategory::Static => col(name)
                .fill_null_with_strategy(FillNullStrategy::Backward(None))
                .fill_null_with_strategy(FillNullStrategy::Forward(None))
                .over(by_entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::CatalogEntry;
    use proptest::prelude::*;

    fn catalog_for(entries: &[(&str, ColumnCategory)]) -> ColumnCatalog {
        ColumnCatalog {
            columns: entries
                .iter()
                .map(|(name, category)| CatalogEntry {
                    name: name.to_string(),
                    category: *category,
                })
                .collect(),
        }
    }

    #[test]
    fn test_cumulative_forward_fill_keeps_leading_gap() {
        let df = df!(
            "location" => &["A", "A", "A", "A"],
            "date" => &["2021-01-01", "2021-01-02", "2021-01-03", "2021-01-04"],
            "total_cases" => &[None, Some(100.0), None, Some(120.0)],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[("total_cases", ColumnCategory::Cumulative)]));
        let result = imputer.impute(&df).unwrap();

        let cases = result.column("total_cases").unwrap().f64().unwrap();
        assert_eq!(cases.get(0), None); // before first report
        assert_eq!(cases.get(1), Some(100.0));
        assert_eq!(cases.get(2), Some(100.0)); // carried forward
        assert_eq!(cases.get(3), Some(120.0));
    }

    #[test]
    fn test_daily_increment_fills_zero() {
        let df = df!(
            "location" => &["A", "A"],
            "date" => &["2021-01-01", "2021-01-02"],
            "new_cases" => &[Some(10.0), None],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[("new_cases", ColumnCategory::DailyIncrement)]));
        let result = imputer.impute(&df).unwrap();

        let new_cases = result.column("new_cases").unwrap().f64().unwrap();
        assert_eq!(new_cases.get(1), Some(0.0));
    }

    #[test]
    fn test_smoothed_interpolates_without_extrapolation() {
        let df = df!(
            "location" => &["A", "A", "A", "A"],
            "date" => &["2021-01-01", "2021-01-02", "2021-01-03", "2021-01-04"],
            "new_cases_smoothed" => &[Some(10.0), None, Some(20.0), None],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[(
            "new_cases_smoothed",
            ColumnCategory::Smoothed,
        )]));
        let result = imputer.impute(&df).unwrap();

        let smoothed = result.column("new_cases_smoothed").unwrap().f64().unwrap();
        assert_eq!(smoothed.get(1), Some(15.0)); // interior gap
        assert_eq!(smoothed.get(3), None); // past last known point
    }

    #[test]
    fn test_static_recovered_from_single_row() {
        let df = df!(
            "location" => &["A", "A", "A"],
            "date" => &["2021-01-01", "2021-01-02", "2021-01-03"],
            "population" => &[None, Some(1000.0), None],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[("population", ColumnCategory::Static)]));
        let result = imputer.impute(&df).unwrap();

        let population = result.column("population").unwrap().f64().unwrap();
        assert_eq!(population.get(0), Some(1000.0));
        assert_eq!(population.get(2), Some(1000.0));
    }

    #[test]
    fn test_no_cross_entity_leakage() {
        let df = df!(
            "location" => &["A", "A", "B", "B"],
            "date" => &["2021-01-01", "2021-01-02", "2021-01-01", "2021-01-02"],
            "total_cases" => &[Some(100.0), Some(110.0), None, Some(5.0)],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[("total_cases", ColumnCategory::Cumulative)]));
        let result = imputer.impute(&df).unwrap();

        let cases = result.column("total_cases").unwrap().f64().unwrap();
        // B's leading gap must not be filled from A's last value.
        assert_eq!(cases.get(2), None);
        assert_eq!(cases.get(3), Some(5.0));
    }

    #[test]
    fn test_unclassified_column_fails_loud() {
        let df = df!(
            "location" => &["A"],
            "date" => &["2021-01-01"],
            "mystery_metric" => &[1.0],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[]));
        match imputer.impute(&df) {
            Err(PipelineError::Imputation(column)) => assert_eq!(column, "mystery_metric"),
            other => panic!("Expected imputation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_reorders_unsorted_input_before_filling() {
        let df = df!(
            "location" => &["A", "A", "A"],
            "date" => &["2021-01-03", "2021-01-01", "2021-01-02"],
            "total_cases" => &[None, Some(100.0), None],
        )
        .unwrap();

        let imputer = Imputer::new(catalog_for(&[("total_cases", ColumnCategory::Cumulative)]));
        let result = imputer.impute(&df).unwrap();

        // After sorting, days 2 and 3 carry day 1's value forward.
        let cases = result.column("total_cases").unwrap().f64().unwrap();
        assert_eq!(cases.get(0), Some(100.0));
        assert_eq!(cases.get(1), Some(100.0));
        assert_eq!(cases.get(2), Some(100.0));
    }

    proptest! {
        #[test]
        fn test_imputation_idempotent(
            values in prop::collection::vec(prop::option::of(0.0f64..1e9), 1..32)
        ) {
            let dates: Vec<String> = (0..values.len())
                .map(|i| format!("2021-01-{:02}", i + 1))
                .collect();
            let entities = vec!["A"; values.len()];

            let df = df!(
                "location" => entities,
                "date" => dates,
                "total_cases" => values,
            )
            .unwrap();

            let imputer = Imputer::new(catalog_for(&[
                ("total_cases", ColumnCategory::Cumulative),
            ]));

            let once = imputer.impute(&df).unwrap();
            let twice = imputer.impute(&once).unwrap();
            prop_assert!(once.equals_missing(&twice));
        }
    }
}
