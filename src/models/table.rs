//! Table, column and schema snapshot models
//!
//! These mirror the JSON shapes exchanged with the designer canvas. Every
//! object carries a stable `id` that survives renames; names are payload.

use crate::error::SchemaError;
use crate::models::foreign_key::ForeignKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use validator::Validate;

/// A complete schema snapshot (baseline or working copy)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Find a table by its stable id
    pub fn find_table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Find a table by schema and name.
    ///
    /// An empty `schema` matches any schema. Used where the lookup has to go
    /// through names rather than ids (foreign key targets).
    pub fn find_table_by_name(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name && (schema.is_empty() || t.schema == schema))
    }

    /// Compute a SHA-256 fingerprint of the ordered schema structure.
    ///
    /// Two snapshots with the same fingerprint produce identical diffs, so
    /// callers can key memoized results on it.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();

        for table in &self.tables {
            hasher.update(format!("T:{}:{}.{}", table.id, table.schema, table.name).as_bytes());

            for col in &table.columns {
                hasher.update(b"C:");
                hasher.update(serde_json::to_vec(col).unwrap_or_default());
            }

            for fk in &table.foreign_keys {
                hasher.update(b"FK:");
                hasher.update(serde_json::to_vec(fk).unwrap_or_default());
            }
        }

        let result = hasher.finalize();
        format!("{:x}", result)
    }

    /// Check that the snapshot is well formed: non-empty names and unique ids
    /// for tables, and for columns and foreign keys within each table.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut table_ids = HashSet::new();

        for table in &self.tables {
            if !table_ids.insert(table.id.as_str()) {
                return Err(SchemaError::DuplicateTableId(table.id.clone()));
            }

            Validate::validate(table).map_err(|e| SchemaError::Invalid {
                table: table.name.clone(),
                details: e.to_string(),
            })?;

            let mut column_ids = HashSet::new();
            for col in &table.columns {
                if !column_ids.insert(col.id.as_str()) {
                    return Err(SchemaError::DuplicateColumnId {
                        table: table.name.clone(),
                        id: col.id.clone(),
                    });
                }
            }

            let mut fk_ids = HashSet::new();
            for fk in &table.foreign_keys {
                if !fk_ids.insert(fk.id.as_str()) {
                    return Err(SchemaError::DuplicateForeignKeyId {
                        table: table.name.clone(),
                        id: fk.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Table representation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,

    #[serde(default)]
    pub schema: String,

    #[validate(length(min = 1, message = "Table name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(nested)]
    pub columns: Vec<Column>,

    #[serde(default)]
    #[validate(nested)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn find_column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn find_column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn find_foreign_key(&self, id: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.id == id)
    }
}

/// Column representation
///
/// Field set follows the designer's column editor. `max_length` is textual
/// because it accepts `MAX` as well as numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub id: String,

    #[validate(length(min = 1, message = "Column name is required"))]
    pub name: String,

    pub data_type: String,
    pub max_length: String,
    pub precision: i32,
    pub scale: i32,
    pub is_primary_key: bool,
    pub is_identity: bool,
    pub identity_seed: i64,
    pub identity_increment: i64,
    pub is_nullable: bool,
    pub default_value: String,
    pub is_computed: bool,
    pub computed_formula: String,
    pub computed_persisted: bool,
}
