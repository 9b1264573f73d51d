pub mod enricher;
pub mod imputer;
pub mod pipeline;
pub mod validator;

pub use enricher::MetricEnricher;
pub use imputer::Imputer;
pub use pipeline::{preprocess_dataset, PreprocessConfig, PreprocessPipeline, PreprocessResult};
pub use validator::{DatasetValidator, QualityStats, ValidationResult};
