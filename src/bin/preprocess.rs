//! Dataset preprocessing binary.
//!
//! Runs the full pipeline over a raw OWID-format CSV and writes the cleaned
//! artifact plus a JSON quality report on stdout.
//!
//! # Usage
//!
//! ```bash
//! covid-prep [RAW_CSV] [CLEANED_CSV]
//! ```
//!
//! # Environment Variables
//!
//! - `COLUMN_CATALOG`: path to a TOML column-catalog override
//! - `RUST_LOG`: log level (default: info)

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use covid_prep::core::domain::ColumnCatalog;
use covid_prep::preprocessing::{PreprocessConfig, PreprocessPipeline};

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let input_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("owid-covid-data.csv");
    let output_path = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("cleaned_covid_data.csv");

    let catalog = match env::var("COLUMN_CATALOG") {
        Ok(path) => ColumnCatalog::from_file(Path::new(&path))
            .with_context(|| format!("Failed to load column catalog from {}", path))?,
        Err(_) => ColumnCatalog::default(),
    };

    println!("=== COVID Dataset Preprocessing ===");
    println!("Input file: {}", input_path);
    println!("Output file: {}", output_path);
    println!();

    let config = PreprocessConfig {
        validate: true,
        catalog,
    };
    let pipeline = PreprocessPipeline::with_config(config);

    match pipeline.process(Path::new(input_path), Path::new(output_path)) {
        Ok(result) => {
            println!();
            println!("✓ Preprocessing completed successfully!");
            println!("  Rows loaded: {}", result.rows_loaded);
            println!("  Aggregate rows removed: {}", result.rows_removed);
            println!("  Rows exported: {}", result.dataframe.height());
            println!();
            println!("Quality report:");
            println!("{}", serde_json::to_string_pretty(&result.validation)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Preprocessing failed: {}", e);
            Err(e.into())
        }
    }
}
