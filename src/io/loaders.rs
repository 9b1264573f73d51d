use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

use crate::core::domain::{has_column, CONTINENT_COL, DATE_COL, ENTITY_COL, ISO_CODE_COL};
use crate::error::{PipelineError, PipelineResult};

/// Result of loading the raw dataset
#[derive(Debug)]
pub struct LoadResult {
    pub dataframe: DataFrame,
    pub num_rows: usize,
    pub num_columns: usize,
}

impl LoadResult {
    pub fn new(dataframe: DataFrame) -> Self {
        let num_rows = dataframe.height();
        let num_columns = dataframe.width();
        Self {
            dataframe,
            num_rows,
            num_columns,
        }
    }
}

/// Loader for the raw long-format dataset.
///
/// Only establishes types: the date column is parsed to the `Date` dtype and
/// integer-inferred numeric columns are normalized to `Float64`. No filtering
/// or imputation happens here.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load the raw dataset from a CSV file.
    ///
    /// Fails with [`PipelineError::Schema`] when the `location` or `date`
    /// column is missing or the date column cannot be parsed.
    pub fn load_from_csv(path: &Path) -> PipelineResult<LoadResult> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?;

        Self::establish_schema(df)
    }

    /// Load the raw dataset from CSV text (testing and embedding).
    pub fn load_from_csv_str(csv: &str) -> PipelineResult<LoadResult> {
        let cursor = Cursor::new(csv.as_bytes().to_vec());
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(cursor)
            .finish()?;

        Self::establish_schema(df)
    }

    fn establish_schema(df: DataFrame) -> PipelineResult<LoadResult> {
        for required in [ENTITY_COL, DATE_COL] {
            if !has_column(&df, required) {
                return Err(PipelineError::Schema(format!(
                    "Missing required column: {}",
                    required
                )));
            }
        }

        let df = Self::parse_date_column(df)?;
        let df = Self::normalize_numeric_columns(df)?;

        Ok(LoadResult::new(df))
    }

    /// Parse the date column into the comparable `Date` dtype.
    fn parse_date_column(df: DataFrame) -> PipelineResult<DataFrame> {
        match df.column(DATE_COL)?.dtype() {
            DataType::Date => Ok(df),
            DataType::String => {
                let options = StrptimeOptions {
                    format: Some("%Y-%m-%d".into()),
                    strict: true,
                    exact: true,
                    cache: true,
                };
                df.lazy()
                    .with_column(col(DATE_COL).str().to_date(options))
                    .collect()
                    .map_err(|e| {
                        PipelineError::Schema(format!("Cannot parse date column: {}", e))
                    })
            }
            other => Err(PipelineError::Schema(format!(
                "Unsupported dtype for date column: {:?}",
                other
            ))),
        }
    }

    /// Cast integer-inferred columns to Float64 so imputation and arithmetic
    /// operate on one numeric dtype. A data column that is entirely empty in
    /// the CSV carries no values to infer from and also becomes Float64, so
    /// downstream arithmetic sees nulls instead of a stray String column.
    fn normalize_numeric_columns(df: DataFrame) -> PipelineResult<DataFrame> {
        let casts: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|column| {
                let all_null_without_dtype = matches!(
                    column.dtype(),
                    DataType::String | DataType::Null
                ) && column.null_count() == column.len();
                all_null_without_dtype
                    || matches!(
                        column.dtype(),
                        DataType::Int8
                            | DataType::Int16
                            | DataType::Int32
                            | DataType::Int64
                            | DataType::UInt8
                            | DataType::UInt16
                            | DataType::UInt32
                            | DataType::UInt64
                            | DataType::Float32
                    )
            })
            .filter(|column| {
                let name = column.name().as_str();
                name != ENTITY_COL && name != DATE_COL && name != ISO_CODE_COL && name != CONTINENT_COL
            })
            .map(|column| col(column.name().clone()).cast(DataType::Float64))
            .collect();

        if casts.is_empty() {
            return Ok(df);
        }

        Ok(df.lazy().with_columns(casts).collect()?)
    }
}
