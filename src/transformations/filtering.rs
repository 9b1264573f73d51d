use polars::prelude::*;
use std::collections::HashSet;

use crate::core::domain::{has_column, AGGREGATE_ENTITIES, ENTITY_COL, ISO_CODE_COL};

/// OWID marks aggregate rows with this iso-code prefix.
const AGGREGATE_ISO_PREFIX: &str = "OWID_";

/// Result of the aggregate-row filter
#[derive(Debug)]
pub struct FilterOutcome {
    pub dataframe: DataFrame,
    pub removed_rows: usize,
}

/// Removes non-geographic aggregate rows (continents, income groupings,
/// world totals) so they cannot double count against member countries.
///
/// Aggregates are recognized by an explicit denylist of entity names and,
/// when an `iso_code` column is present, by the `OWID_` prefix the source
/// uses to flag synthetic entities. A never-seen aggregate name without the
/// prefix passes through silently; that is a known source-data limitation,
/// asserted against fixed expected entity counts in tests.
pub struct EntityFilter {
    denylist: HashSet<String>,
}

impl EntityFilter {
    /// Filter with the built-in OWID aggregate denylist.
    pub fn new() -> Self {
        Self {
            denylist: AGGREGATE_ENTITIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Filter with a caller-supplied denylist.
    pub fn with_denylist(denylist: impl IntoIterator<Item = String>) -> Self {
        Self {
            denylist: denylist.into_iter().collect(),
        }
    }

    /// Remove aggregate rows, reporting how many were dropped.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<FilterOutcome> {
        let entities = df.column(ENTITY_COL)?.str()?;
        let iso_codes = if has_column(df, ISO_CODE_COL) {
            Some(df.column(ISO_CODE_COL)?.str()?)
        } else {
            None
        };

        let mask: BooleanChunked = (0..df.height())
            .map(|i| {
                let denylisted = entities
                    .get(i)
                    .map(|e| self.denylist.contains(e))
                    .unwrap_or(false);
                let flagged = iso_codes
                    .and_then(|codes| codes.get(i))
                    .map(|code| code.starts_with(AGGREGATE_ISO_PREFIX))
                    .unwrap_or(false);
                !(denylisted || flagged)
            })
            .collect();

        let filtered = df.filter(&mask)?;
        let removed_rows = df.height() - filtered.height();

        Ok(FilterOutcome {
            dataframe: filtered,
            removed_rows,
        })
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_world_keeps_countries() {
        let df = df!(
            "location" => &["World", "Country X", "Country Y"],
            "date" => &["2021-01-01", "2021-01-01", "2021-01-01"],
            "total_cases" => &[1000.0, 100.0, 200.0],
        )
        .unwrap();

        let outcome = EntityFilter::new().apply(&df).unwrap();
        assert_eq!(outcome.dataframe.height(), 2);
        assert_eq!(outcome.removed_rows, 1);

        let entities = outcome.dataframe.column("location").unwrap().str().unwrap();
        assert_eq!(entities.get(0), Some("Country X"));
        assert_eq!(entities.get(1), Some("Country Y"));
    }

    #[test]
    fn test_iso_code_prefix_flags_aggregates() {
        // A synthetic aggregate the denylist has never seen, but flagged by
        // the iso-code convention.
        let df = df!(
            "location" => &["Landlocked countries", "Country X"],
            "iso_code" => &["OWID_LLC", "CXX"],
            "date" => &["2021-01-01", "2021-01-01"],
        )
        .unwrap();

        let outcome = EntityFilter::new().apply(&df).unwrap();
        assert_eq!(outcome.dataframe.height(), 1);
        assert_eq!(outcome.removed_rows, 1);
    }

    #[test]
    fn test_unknown_aggregate_without_flag_passes_through() {
        let df = df!(
            "location" => &["Some future grouping", "Country X"],
            "date" => &["2021-01-01", "2021-01-01"],
        )
        .unwrap();

        let outcome = EntityFilter::new().apply(&df).unwrap();
        // Known limitation: nothing identifies the synthetic row.
        assert_eq!(outcome.dataframe.height(), 2);
        assert_eq!(outcome.removed_rows, 0);
    }

    #[test]
    fn test_custom_denylist() {
        let df = df!(
            "location" => &["Gondor", "Rohan"],
            "date" => &["2021-01-01", "2021-01-01"],
        )
        .unwrap();

        let filter = EntityFilter::with_denylist(vec!["Gondor".to_string()]);
        let outcome = filter.apply(&df).unwrap();
        assert_eq!(outcome.dataframe.height(), 1);
    }
}
