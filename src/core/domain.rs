//! Core domain model: column categories, the column catalog, and the
//! aggregate-entity denylist.
//!
//! The catalog is the single source of truth for how each data column is
//! imputed. Assignment is explicit configuration, never inferred from column
//! name patterns, so schema evolution in the raw data surfaces as a loud
//! [`PipelineError::Imputation`](crate::error::PipelineError) instead of a
//! silent misclassification.

use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Column holding the reporting entity (country-level geographic unit).
pub const ENTITY_COL: &str = "location";
/// Column holding the reporting date, `%Y-%m-%d` in the raw file.
pub const DATE_COL: &str = "date";
/// ISO 3166-1 alpha-3 code; OWID aggregates carry an `OWID_` prefix here.
pub const ISO_CODE_COL: &str = "iso_code";
pub const CONTINENT_COL: &str = "continent";

/// Non-geographic aggregate entities that must never survive filtering.
/// Continents, income groupings, and world totals would double count against
/// their member countries.
pub const AGGREGATE_ENTITIES: &[&str] = &[
    "World",
    "Africa",
    "Asia",
    "Europe",
    "European Union",
    "North America",
    "Oceania",
    "South America",
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
    "International",
];

/// Derived columns appended by the enricher, in canonical output order.
pub const DERIVED_COLUMNS: &[&str] = &[
    "vaccination_rate",
    "fully_vaccinated_rate",
    "mortality_rate",
    "active_cases",
    "cases_per_population",
    "deaths_per_population",
];

/// Derived columns that are percentage-scaled and must lie in `[0, 100]`
/// or be null.
pub const PERCENTAGE_COLUMNS: &[&str] =
    &["vaccination_rate", "fully_vaccinated_rate", "mortality_rate"];

/// Semantic category of a data column, selecting its imputation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnCategory {
    /// Running total, non-decreasing under correct reporting. Forward-filled
    /// within an entity; leading gaps stay null.
    Cumulative,
    /// Per-day delta. A missing report means "nothing new happened", so
    /// nulls become zero.
    DailyIncrement,
    /// Rolling-average metric supplied by the source. Linearly interpolated
    /// between known points, never extrapolated.
    Smoothed,
    /// Constant or near-constant per entity (population, GDP, iso code).
    /// Backward- then forward-filled within the entity.
    Static,
}

impl ColumnCategory {
    /// Stable label used in the quality report.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnCategory::Cumulative => "cumulative",
            ColumnCategory::DailyIncrement => "daily_increment",
            ColumnCategory::Smoothed => "smoothed",
            ColumnCategory::Static => "static",
        }
    }
}

/// One column-to-category assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: ColumnCategory,
}

/// Explicit column-to-category table.
///
/// Entry order is preserved and defines the canonical order of data columns
/// in the exported artifact. The built-in default covers the OWID schema
/// subset this pipeline consumes; a TOML file can override it:
///
/// ```toml
/// [[columns]]
/// name = "total_cases"
/// category = "cumulative"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnCatalog {
    pub columns: Vec<CatalogEntry>,
}

static DEFAULT_CATALOG: Lazy<ColumnCatalog> = Lazy::new(|| {
    use ColumnCategory::*;
    let columns = [
        ("total_cases", Cumulative),
        ("total_deaths", Cumulative),
        ("total_recovered", Cumulative),
        ("total_tests", Cumulative),
        ("total_vaccinations", Cumulative),
        ("people_vaccinated", Cumulative),
        ("people_fully_vaccinated", Cumulative),
        ("new_cases", DailyIncrement),
        ("new_deaths", DailyIncrement),
        ("new_tests", DailyIncrement),
        ("new_vaccinations", DailyIncrement),
        ("new_cases_smoothed", Smoothed),
        ("new_deaths_smoothed", Smoothed),
        ("new_vaccinations_smoothed", Smoothed),
        ("reproduction_rate", Smoothed),
        (ISO_CODE_COL, Static),
        (CONTINENT_COL, Static),
        ("population", Static),
        ("population_density", Static),
        ("median_age", Static),
        ("gdp_per_capita", Static),
        ("extreme_poverty", Static),
        ("human_development_index", Static),
        ("life_expectancy", Static),
        ("hospital_beds_per_thousand", Static),
    ];

    ColumnCatalog {
        columns: columns
            .iter()
            .map(|(name, category)| CatalogEntry {
                name: name.to_string(),
                category: *category,
            })
            .collect(),
    }
});

impl Default for ColumnCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

impl ColumnCatalog {
    /// Look up the category assigned to a column, if any.
    pub fn category_of(&self, name: &str) -> Option<ColumnCategory> {
        self.columns
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.category)
    }

    /// Iterate the names of columns assigned to `category`, in catalog order.
    pub fn columns_in(&self, category: ColumnCategory) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |entry| entry.category == category)
            .map(|entry| entry.name.as_str())
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        toml::from_str(text).map_err(|e| PipelineError::Config(format!("Invalid catalog: {}", e)))
    }

    /// Load a catalog override from a TOML file.
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

/// Whether `df` has a column named `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|s| s.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_classification() {
        let catalog = ColumnCatalog::default();
        assert_eq!(
            catalog.category_of("total_cases"),
            Some(ColumnCategory::Cumulative)
        );
        assert_eq!(
            catalog.category_of("new_cases"),
            Some(ColumnCategory::DailyIncrement)
        );
        assert_eq!(
            catalog.category_of("new_cases_smoothed"),
            Some(ColumnCategory::Smoothed)
        );
        assert_eq!(
            catalog.category_of("population"),
            Some(ColumnCategory::Static)
        );
        assert_eq!(catalog.category_of("mystery_metric"), None);
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_text = r#"
            [[columns]]
            name = "total_cases"
            category = "cumulative"

            [[columns]]
            name = "new_cases"
            category = "daily_increment"
        "#;

        let catalog = ColumnCatalog::from_toml_str(toml_text).unwrap();
        assert_eq!(catalog.columns.len(), 2);
        assert_eq!(
            catalog.category_of("total_cases"),
            Some(ColumnCategory::Cumulative)
        );
        assert_eq!(
            catalog.category_of("new_cases"),
            Some(ColumnCategory::DailyIncrement)
        );
    }

    #[test]
    fn test_catalog_from_invalid_toml() {
        let toml_text = r#"
            [[columns]]
            name = "total_cases"
            category = "no_such_category"
        "#;

        let result = ColumnCatalog::from_toml_str(toml_text);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_columns_in_category_preserves_order() {
        let catalog = ColumnCatalog::default();
        let cumulative: Vec<&str> = catalog.columns_in(ColumnCategory::Cumulative).collect();
        assert_eq!(cumulative[0], "total_cases");
        assert!(cumulative.contains(&"people_vaccinated"));
    }
}
