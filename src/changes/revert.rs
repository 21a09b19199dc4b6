//! Revert computation
//!
//! Produces the table list that results from undoing exactly one change.
//! The inputs are never touched: the current tables are deep-copied and the
//! single undo is applied to the copy.

use crate::changes::identity::restore_position;
use crate::error::{RevertError, RevertOutcome};
use crate::models::{ChangeAction, ChangeCategory, Schema, SchemaChange, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Revert outcome in the `{ success, tables?, error? }` shape the webview expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<Table>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RevertOutcome<Vec<Table>>> for RevertResult {
    fn from(outcome: RevertOutcome<Vec<Table>>) -> Self {
        match outcome {
            Ok(tables) => Self {
                success: true,
                tables: Some(tables),
                error: None,
            },
            Err(e) => Self {
                success: false,
                tables: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Compute the tables of `current` with `change` undone against `baseline`
pub fn compute_reverted_schema(
    change: &SchemaChange,
    baseline: &Schema,
    current: &Schema,
) -> RevertOutcome<Vec<Table>> {
    let mut tables = current.tables.clone();

    let result = match change.category {
        ChangeCategory::Table => revert_table(change, baseline, &mut tables),
        ChangeCategory::Column => revert_column(change, baseline, &mut tables),
        ChangeCategory::ForeignKey => revert_foreign_key(change, baseline, &mut tables),
    };

    match result {
        Ok(()) => {
            debug!("Reverted {}", change.id);
            Ok(tables)
        }
        Err(e) => {
            warn!("Cannot revert {}: {}", change.id, e);
            Err(e)
        }
    }
}

fn revert_table(change: &SchemaChange, baseline: &Schema, tables: &mut Vec<Table>) -> RevertOutcome<()> {
    match change.action {
        ChangeAction::Add => {
            let index = table_index(tables, &change.table_id)?;
            tables.remove(index);
        }
        ChangeAction::Delete => {
            let original = baseline
                .find_table(&change.table_id)
                .ok_or(RevertError::TableNotFound)?;

            if tables.iter().all(|t| t.id != original.id) {
                // Foreign keys come back through their own reverts
                let restored = Table {
                    foreign_keys: Vec::new(),
                    ..original.clone()
                };
                let at = restore_position(&baseline.tables, tables, &original.id);
                tables.insert(at, restored);
            }
        }
        ChangeAction::Modify => {
            let original = baseline
                .find_table(&change.table_id)
                .ok_or(RevertError::TableNotFound)?;
            let index = table_index(tables, &change.table_id)?;

            let table = &mut tables[index];
            table.name = original.name.clone();
            table.schema = original.schema.clone();
        }
    }

    Ok(())
}

fn revert_column(change: &SchemaChange, baseline: &Schema, tables: &mut [Table]) -> RevertOutcome<()> {
    let column_id = object_id(change)?;
    let index = table_index(tables, &change.table_id)?;
    let table = &mut tables[index];

    match change.action {
        ChangeAction::Add => {
            let at = table
                .columns
                .iter()
                .position(|c| c.id == column_id)
                .ok_or(RevertError::ColumnNotFound)?;
            table.columns.remove(at);
        }
        ChangeAction::Delete => {
            let original_table = baseline
                .find_table(&change.table_id)
                .ok_or(RevertError::TableNotFound)?;
            let original = original_table
                .find_column(column_id)
                .ok_or(RevertError::ColumnNotFound)?;

            if table.find_column(column_id).is_none() {
                let at = restore_position(&original_table.columns, &table.columns, column_id);
                table.columns.insert(at, original.clone());
            }
        }
        ChangeAction::Modify => {
            let original = baseline
                .find_table(&change.table_id)
                .and_then(|t| t.find_column(column_id))
                .ok_or(RevertError::ColumnNotFound)?;
            let col = table
                .columns
                .iter_mut()
                .find(|c| c.id == column_id)
                .ok_or(RevertError::ColumnNotFound)?;
            *col = original.clone();
        }
    }

    Ok(())
}

fn revert_foreign_key(change: &SchemaChange, baseline: &Schema, tables: &mut [Table]) -> RevertOutcome<()> {
    let fk_id = object_id(change)?;
    let index = table_index(tables, &change.table_id)?;
    let table = &mut tables[index];

    match change.action {
        ChangeAction::Add => {
            let at = table
                .foreign_keys
                .iter()
                .position(|fk| fk.id == fk_id)
                .ok_or(RevertError::ForeignKeyNotFound)?;
            table.foreign_keys.remove(at);
        }
        ChangeAction::Delete => {
            let original_table = baseline
                .find_table(&change.table_id)
                .ok_or(RevertError::TableNotFound)?;
            let original = original_table
                .find_foreign_key(fk_id)
                .ok_or(RevertError::ForeignKeyNotFound)?;

            if table.find_foreign_key(fk_id).is_none() {
                let at = restore_position(&original_table.foreign_keys, &table.foreign_keys, fk_id);
                table.foreign_keys.insert(at, original.clone());
            }
        }
        ChangeAction::Modify => {
            let original = baseline
                .find_table(&change.table_id)
                .and_then(|t| t.find_foreign_key(fk_id))
                .ok_or(RevertError::ForeignKeyNotFound)?;
            let fk = table
                .foreign_keys
                .iter_mut()
                .find(|fk| fk.id == fk_id)
                .ok_or(RevertError::ForeignKeyNotFound)?;
            *fk = original.clone();
        }
    }

    Ok(())
}

fn table_index(tables: &[Table], id: &str) -> RevertOutcome<usize> {
    tables
        .iter()
        .position(|t| t.id == id)
        .ok_or(RevertError::TableNotFound)
}

fn object_id(change: &SchemaChange) -> RevertOutcome<&str> {
    change
        .object_id
        .as_deref()
        .ok_or_else(|| RevertError::MissingObjectId(change.key()))
}
