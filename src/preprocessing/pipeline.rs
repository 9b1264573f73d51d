use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::core::domain::ColumnCatalog;
use crate::error::{PipelineError, PipelineResult};
use crate::io::exporter::DatasetExporter;
use crate::io::loaders::DatasetLoader;
use crate::preprocessing::enricher::MetricEnricher;
use crate::preprocessing::imputer::Imputer;
use crate::preprocessing::validator::{DatasetValidator, ValidationResult};
use crate::transformations::cleaning;
use crate::transformations::filtering::EntityFilter;

/// Result of a full pipeline run
pub struct PreprocessResult {
    pub dataframe: DataFrame,
    pub validation: ValidationResult,
    pub rows_loaded: usize,
    pub rows_removed: usize,
}

/// Configuration for the preprocessing pipeline
pub struct PreprocessConfig {
    pub validate: bool,
    pub catalog: ColumnCatalog,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            validate: true,
            catalog: ColumnCatalog::default(),
        }
    }
}

/// Main preprocessing pipeline.
///
/// Control flow is strictly linear: load, filter, impute, enrich, validate,
/// export. Every stage consumes the full table produced by the previous
/// stage; a failed stage aborts the run with no partial output, since the
/// exporter is the only stage with externally observable side effects and it
/// runs last. Re-running on identical input yields identical output.
pub struct PreprocessPipeline {
    config: PreprocessConfig,
}

impl PreprocessPipeline {
    /// Create a pipeline with default configuration
    pub fn new() -> Self {
        Self {
            config: PreprocessConfig::default(),
        }
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Process a raw CSV file into the cleaned artifact at `output_path`.
    pub fn process(&self, input_path: &Path, output_path: &Path) -> PipelineResult<PreprocessResult> {
        let loaded = DatasetLoader::load_from_csv(input_path)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            loaded.num_rows,
            loaded.num_columns,
            input_path.display()
        );

        let result = self.process_dataframe(loaded.dataframe)?;

        DatasetExporter::export_csv(&result.dataframe, output_path, &self.config.catalog)?;
        info!(
            "Wrote {} cleaned rows to {}",
            result.dataframe.height(),
            output_path.display()
        );

        Ok(result)
    }

    /// Run every stage except file I/O (useful for testing and embedding).
    pub fn process_dataframe(&self, df: DataFrame) -> PipelineResult<PreprocessResult> {
        let rows_loaded = df.height();

        let df = cleaning::drop_duplicate_rows(&df)?;

        let outcome = EntityFilter::new().apply(&df)?;
        let rows_removed = outcome.removed_rows;
        info!("Removed {} aggregate rows", rows_removed);

        let imputer = Imputer::new(self.config.catalog.clone());
        let df = imputer.impute(&outcome.dataframe)?;

        let df = MetricEnricher::enrich(df)?;

        let mut validation = if self.config.validate {
            DatasetValidator::validate(&df, &self.config.catalog)?
        } else {
            ValidationResult::new()
        };
        validation.stats.rows_before_filter = rows_loaded;
        validation.stats.aggregate_rows_removed = rows_removed;

        for warning in &validation.warnings {
            warn!("{}", warning);
        }

        if self.config.validate && !validation.is_valid {
            return Err(PipelineError::Validation(validation.errors.join("; ")));
        }

        Ok(PreprocessResult {
            dataframe: df,
            validation,
            rows_loaded,
            rows_removed,
        })
    }
}

impl Default for PreprocessPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to run the full pipeline over a dataset file.
pub fn preprocess_dataset(input_path: &Path, output_path: &Path) -> PipelineResult<PreprocessResult> {
    PreprocessPipeline::new().process(input_path, output_path)
}
