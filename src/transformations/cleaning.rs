use polars::prelude::*;
use std::collections::HashSet;

use crate::core::domain::{DATE_COL, ENTITY_COL};

/// Drop rows that repeat an already-seen (entity, date) pair, keeping the
/// first occurrence.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    let entities = df.column(ENTITY_COL)?.str()?;
    let dates = df.column(DATE_COL)?;

    let mut seen: HashSet<(Option<String>, String)> = HashSet::with_capacity(df.height());
    let mut keep: Vec<bool> = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let key = (
            entities.get(i).map(str::to_string),
            dates.get(i)?.to_string(),
        );
        keep.push(seen.insert(key));
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    df.filter(&mask)
}

/// Sort rows by entity, then ascending date.
///
/// Fill directionality depends on this order; the imputer re-establishes it
/// before any per-entity fill executes.
pub fn sort_by_entity_date(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.sort([ENTITY_COL, DATE_COL], SortMultipleOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_duplicate_rows_keeps_first() {
        let df = df!(
            "location" => &["A", "A", "A", "B"],
            "date" => &["2021-01-01", "2021-01-01", "2021-01-02", "2021-01-01"],
            "total_cases" => &[10.0, 99.0, 12.0, 5.0],
        )
        .unwrap();

        let deduped = drop_duplicate_rows(&df).unwrap();
        assert_eq!(deduped.height(), 3);

        let cases = deduped.column("total_cases").unwrap().f64().unwrap();
        assert_eq!(cases.get(0), Some(10.0));
    }

    #[test]
    fn test_sort_by_entity_date() {
        let df = df!(
            "location" => &["B", "A", "A"],
            "date" => &["2021-01-01", "2021-01-02", "2021-01-01"],
        )
        .unwrap();

        let sorted = sort_by_entity_date(&df).unwrap();
        let entities = sorted.column("location").unwrap().str().unwrap();
        let dates = sorted.column("date").unwrap().str().unwrap();

        assert_eq!(entities.get(0), Some("A"));
        assert_eq!(dates.get(0), Some("2021-01-01"));
        assert_eq!(entities.get(1), Some("A"));
        assert_eq!(dates.get(1), Some("2021-01-02"));
        assert_eq!(entities.get(2), Some("B"));
    }
}
