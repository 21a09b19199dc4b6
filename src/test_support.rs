//! Fixture builders shared by the unit tests

use crate::models::{Column, ForeignKey, Table};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Nullable column with no extras
pub fn column(id: &str, name: &str, data_type: &str) -> Column {
    Column {
        id: id.to_string(),
        name: name.to_string(),
        data_type: data_type.to_string(),
        is_nullable: true,
        ..Default::default()
    }
}

pub fn pk_column(id: &str, name: &str, data_type: &str) -> Column {
    Column {
        is_primary_key: true,
        is_nullable: false,
        ..column(id, name, data_type)
    }
}

/// Table in the `dbo` schema
pub fn table(id: &str, name: &str, columns: Vec<Column>, foreign_keys: Vec<ForeignKey>) -> Table {
    Table {
        id: id.to_string(),
        schema: "dbo".to_string(),
        name: name.to_string(),
        columns,
        foreign_keys,
    }
}

/// Foreign key referencing a `dbo` table by name
pub fn foreign_key(
    id: &str,
    name: &str,
    columns: &[&str],
    referenced_table: &str,
    referenced_columns: &[&str],
) -> ForeignKey {
    ForeignKey {
        id: id.to_string(),
        name: name.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        referenced_schema_name: "dbo".to_string(),
        referenced_table_name: referenced_table.to_string(),
        referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}
