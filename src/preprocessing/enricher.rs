//! Derived per-row metrics.
//!
//! Appends six columns computed from fields in the same row plus the
//! entity's static population. All formulas are pure and deterministic;
//! upstream columns are never mutated. Percentage rates are capped at 100
//! to absorb reporting overshoot, and every division is guarded so a zero
//! or unknown denominator yields null, never `NaN` or `inf`.

use polars::prelude::*;

use crate::error::PipelineResult;

const POPULATION: &str = "population";
const TOTAL_CASES: &str = "total_cases";
const TOTAL_DEATHS: &str = "total_deaths";
const TOTAL_RECOVERED: &str = "total_recovered";
const PEOPLE_VACCINATED: &str = "people_vaccinated";
const PEOPLE_FULLY_VACCINATED: &str = "people_fully_vaccinated";

/// Computes the six derived metrics.
pub struct MetricEnricher;

impl MetricEnricher {
    /// Append the derived columns to `df`.
    ///
    /// A source column missing from the frame behaves as all-null input, so
    /// the corresponding derived column comes out all null instead of
    /// failing the run.
    pub fn enrich(df: DataFrame) -> PipelineResult<DataFrame> {
        let population = source(&df, POPULATION);
        let cases = source(&df, TOTAL_CASES);
        let deaths = source(&df, TOTAL_DEATHS);
        let recovered = source(&df, TOTAL_RECOVERED);
        let vaccinated = source(&df, PEOPLE_VACCINATED);
        let fully_vaccinated = source(&df, PEOPLE_FULLY_VACCINATED);

        let active = cases.clone() - deaths.clone() - recovered.clone();

        let enriched = df
            .lazy()
            .with_columns([
                capped_pct(vaccinated, population.clone()).alias("vaccination_rate"),
                capped_pct(fully_vaccinated, population.clone()).alias("fully_vaccinated_rate"),
                capped_pct(deaths.clone(), cases.clone()).alias("mortality_rate"),
                // Clamped at zero: a negative difference is a reporting
                // inconsistency, not a crash.
                when(
                    cases
                        .clone()
                        .is_not_null()
                        .and(deaths.clone().is_not_null())
                        .and(recovered.is_not_null()),
                )
                .then(
                    when(active.clone().lt(lit(0.0)))
                        .then(lit(0.0))
                        .otherwise(active),
                )
                .otherwise(null_f64())
                .alias("active_cases"),
                per_population(cases, population.clone()).alias("cases_per_population"),
                per_population(deaths, population).alias("deaths_per_population"),
            ])
            .collect()?;

        Ok(enriched)
    }
}

/// The named column if present, otherwise an all-null stand-in.
fn source(df: &DataFrame, name: &str) -> Expr {
    if crate::core::domain::has_column(df, name) {
        col(name)
    } else {
        null_f64()
    }
}

fn null_f64() -> Expr {
    lit(NULL).cast(DataType::Float64)
}

/// `min(100, numerator / denominator * 100)` when the denominator is
/// positive, else null.
fn capped_pct(numerator: Expr, denominator: Expr) -> Expr {
    let rate = numerator / denominator.clone() * lit(100.0);
    when(denominator.gt(lit(0.0)))
        .then(
            when(rate.clone().gt(lit(100.0)))
                .then(lit(100.0))
                .otherwise(rate),
        )
        .otherwise(null_f64())
}

/// `count / population` when population is positive, else null.
fn per_population(count: Expr, population: Expr) -> Expr {
    when(population.clone().gt(lit(0.0)))
        .then(count / population)
        .otherwise(null_f64())
}
