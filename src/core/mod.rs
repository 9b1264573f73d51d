pub mod domain;

pub use domain::{
    has_column, ColumnCatalog, ColumnCategory, AGGREGATE_ENTITIES, CONTINENT_COL, DATE_COL,
    DERIVED_COLUMNS, ENTITY_COL, ISO_CODE_COL, PERCENTAGE_COLUMNS,
};
