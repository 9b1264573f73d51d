use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::core::domain::{
    has_column, ColumnCatalog, CONTINENT_COL, DATE_COL, DERIVED_COLUMNS, ENTITY_COL, ISO_CODE_COL,
};
use crate::error::{PipelineError, PipelineResult};

/// Writer for the cleaned dataset artifact.
///
/// Columns are emitted in a stable, documented order: identifiers first
/// (`location`, `iso_code`, `continent`, `date`), then the original data
/// columns in catalog order, then the six derived columns. The file is
/// written to a sibling temporary path and renamed over the target, so a
/// failed write leaves any prior artifact untouched.
pub struct DatasetExporter;

impl DatasetExporter {
    /// Write `df` to `path` as CSV in the canonical column order.
    pub fn export_csv(df: &DataFrame, path: &Path, catalog: &ColumnCatalog) -> PipelineResult<()> {
        let mut ordered = df.select(Self::canonical_order(df, catalog))?;

        let tmp_path = Self::sibling_tmp_path(path);
        let write_result = Self::write_csv(&mut ordered, &tmp_path);

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Canonical output order for the columns present in `df`.
    pub fn canonical_order(df: &DataFrame, catalog: &ColumnCatalog) -> Vec<String> {
        let identifiers = [ENTITY_COL, ISO_CODE_COL, CONTINENT_COL, DATE_COL];

        let mut names: Vec<String> = identifiers
            .iter()
            .filter(|name| has_column(df, name))
            .map(|name| name.to_string())
            .collect();

        for entry in &catalog.columns {
            if has_column(df, &entry.name) && !names.contains(&entry.name) {
                names.push(entry.name.clone());
            }
        }

        // Anything not covered by identifiers, catalog, or derived columns
        // keeps its position ahead of the derived block.
        for column in df.get_column_names() {
            let name = column.as_str();
            if !names.iter().any(|n| n == name) && !DERIVED_COLUMNS.contains(&name) {
                names.push(name.to_string());
            }
        }

        for name in DERIVED_COLUMNS {
            if has_column(df, name) {
                names.push(name.to_string());
            }
        }

        names
    }

    fn sibling_tmp_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }

    fn write_csv(df: &mut DataFrame, path: &Path) -> PipelineResult<()> {
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| PipelineError::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}
