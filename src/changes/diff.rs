//! Schema Diff Engine
//!
//! Compares a baseline snapshot with the working copy and reports every
//! structural change, grouped by table. Objects are matched by id, so a
//! rename shows up as a modification rather than a delete plus an add.

use crate::changes::identity::{arrays_equal, partition_by_id, RenameMap};
use crate::models::{
    ChangeAction, ChangeCategory, ChangeKey, Column, ForeignKey, PropertyChange, Schema,
    SchemaChange, SchemaChangesSummary, Table, TableChangeGroup,
};
use serde::Serialize;
use tracing::debug;

/// Collects the differing properties of one object in declaration order
#[derive(Default)]
struct PropertyDiff {
    changes: Vec<PropertyChange>,
}

impl PropertyDiff {
    fn compare<T: PartialEq + Serialize + ?Sized>(
        &mut self,
        property: &str,
        display_name: &str,
        old: &T,
        new: &T,
    ) {
        if old != new {
            self.push(property, display_name, old, new);
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, property: &str, display_name: &str, old: &T, new: &T) {
        self.changes.push(PropertyChange {
            property: property.to_string(),
            display_name: display_name.to_string(),
            old_value: serde_json::to_value(old).unwrap_or_default(),
            new_value: serde_json::to_value(new).unwrap_or_default(),
        });
    }

    fn into_changes(self) -> Vec<PropertyChange> {
        self.changes
    }
}

/// The diff engine that compares schema snapshots
pub struct DiffEngine;

impl DiffEngine {
    /// Compare two schema snapshots and return all differences
    pub fn diff(baseline: &Schema, current: &Schema) -> SchemaChangesSummary {
        let tables = partition_by_id(&baseline.tables, &current.tables);
        let renames = RenameMap::new(baseline, current);
        let mut groups = Vec::new();

        for table in &tables.added {
            groups.push(Self::added_table_group(table));
        }

        for table in &tables.deleted {
            groups.push(Self::deleted_table_group(table));
        }

        for (old, new) in &tables.common {
            groups.push(Self::modified_table_group(old, new, &renames));
        }

        let summary = SchemaChangesSummary::from_groups(groups);

        debug!(
            "Schema diff: {} changes across {} tables ({} added, {} deleted)",
            summary.total_changes,
            summary.groups.len(),
            tables.added.len(),
            tables.deleted.len()
        );

        summary
    }

    /// A new table surfaces its columns and foreign keys as individual adds
    fn added_table_group(table: &Table) -> TableChangeGroup {
        let mut changes = vec![Self::change(
            ChangeCategory::Table,
            ChangeAction::Add,
            table,
            None,
            Vec::new(),
        )];

        for col in &table.columns {
            changes.push(Self::change(
                ChangeCategory::Column,
                ChangeAction::Add,
                table,
                Some((col.id.as_str(), col.name.as_str())),
                Vec::new(),
            ));
        }

        for fk in &table.foreign_keys {
            changes.push(Self::change(
                ChangeCategory::ForeignKey,
                ChangeAction::Add,
                table,
                Some((fk.id.as_str(), fk.name.as_str())),
                Vec::new(),
            ));
        }

        Self::group(table, true, false, changes)
    }

    /// Deletion is table-granular: children are not listed separately
    fn deleted_table_group(table: &Table) -> TableChangeGroup {
        let changes = vec![Self::change(
            ChangeCategory::Table,
            ChangeAction::Delete,
            table,
            None,
            Vec::new(),
        )];

        Self::group(table, false, true, changes)
    }

    fn modified_table_group(old: &Table, new: &Table, renames: &RenameMap<'_>) -> TableChangeGroup {
        let mut changes = Vec::new();

        let mut props = PropertyDiff::default();
        props.compare("name", "Name", &old.name, &new.name);
        props.compare("schema", "Schema", &old.schema, &new.schema);
        let props = props.into_changes();
        if !props.is_empty() {
            changes.push(Self::change(
                ChangeCategory::Table,
                ChangeAction::Modify,
                new,
                None,
                props,
            ));
        }

        Self::diff_columns(old, new, &mut changes);
        Self::diff_foreign_keys(old, new, renames, &mut changes);

        Self::group(new, false, false, changes)
    }

    fn diff_columns(old_table: &Table, new_table: &Table, changes: &mut Vec<SchemaChange>) {
        let columns = partition_by_id(&old_table.columns, &new_table.columns);

        for col in &columns.added {
            changes.push(Self::change(
                ChangeCategory::Column,
                ChangeAction::Add,
                new_table,
                Some((col.id.as_str(), col.name.as_str())),
                Vec::new(),
            ));
        }

        for col in &columns.deleted {
            changes.push(Self::change(
                ChangeCategory::Column,
                ChangeAction::Delete,
                new_table,
                Some((col.id.as_str(), col.name.as_str())),
                Vec::new(),
            ));
        }

        for (old, new) in &columns.common {
            let props = Self::compare_columns(old, new);
            if !props.is_empty() {
                changes.push(Self::change(
                    ChangeCategory::Column,
                    ChangeAction::Modify,
                    new_table,
                    Some((new.id.as_str(), new.name.as_str())),
                    props,
                ));
            }
        }
    }

    fn compare_columns(old: &Column, new: &Column) -> Vec<PropertyChange> {
        let mut props = PropertyDiff::default();

        props.compare("name", "Name", &old.name, &new.name);
        props.compare("dataType", "Data Type", &old.data_type, &new.data_type);
        props.compare("maxLength", "Max Length", &old.max_length, &new.max_length);
        props.compare("precision", "Precision", &old.precision, &new.precision);
        props.compare("scale", "Scale", &old.scale, &new.scale);
        props.compare("isPrimaryKey", "Primary Key", &old.is_primary_key, &new.is_primary_key);
        props.compare("isIdentity", "Identity", &old.is_identity, &new.is_identity);
        props.compare("identitySeed", "Identity Seed", &old.identity_seed, &new.identity_seed);
        props.compare(
            "identityIncrement",
            "Identity Increment",
            &old.identity_increment,
            &new.identity_increment,
        );
        props.compare("isNullable", "Allow Nulls", &old.is_nullable, &new.is_nullable);
        props.compare("defaultValue", "Default Value", &old.default_value, &new.default_value);
        props.compare("isComputed", "Computed", &old.is_computed, &new.is_computed);
        props.compare(
            "computedFormula",
            "Computed Formula",
            &old.computed_formula,
            &new.computed_formula,
        );
        props.compare(
            "computedPersisted",
            "Persisted",
            &old.computed_persisted,
            &new.computed_persisted,
        );

        props.into_changes()
    }

    fn diff_foreign_keys(
        old_table: &Table,
        new_table: &Table,
        renames: &RenameMap<'_>,
        changes: &mut Vec<SchemaChange>,
    ) {
        let fks = partition_by_id(&old_table.foreign_keys, &new_table.foreign_keys);

        for fk in &fks.added {
            changes.push(Self::change(
                ChangeCategory::ForeignKey,
                ChangeAction::Add,
                new_table,
                Some((fk.id.as_str(), fk.name.as_str())),
                Vec::new(),
            ));
        }

        for fk in &fks.deleted {
            changes.push(Self::change(
                ChangeCategory::ForeignKey,
                ChangeAction::Delete,
                new_table,
                Some((fk.id.as_str(), fk.name.as_str())),
                Vec::new(),
            ));
        }

        for (old, new) in &fks.common {
            let props = Self::compare_foreign_keys(old, new, renames);
            if !props.is_empty() {
                changes.push(Self::change(
                    ChangeCategory::ForeignKey,
                    ChangeAction::Modify,
                    new_table,
                    Some((new.id.as_str(), new.name.as_str())),
                    props,
                ));
            }
        }
    }

    /// Compare a foreign key across snapshots.
    ///
    /// Every field is compared literally except `referenced_columns`: when a
    /// referenced column was renamed, the rewritten name is not a change of
    /// the foreign key. The rename is reported on the column instead.
    fn compare_foreign_keys(
        old: &ForeignKey,
        new: &ForeignKey,
        renames: &RenameMap<'_>,
    ) -> Vec<PropertyChange> {
        let mut props = PropertyDiff::default();

        props.compare("name", "Name", &old.name, &new.name);
        if !arrays_equal(&old.columns, &new.columns) {
            props.push("columns", "Columns", &old.columns, &new.columns);
        }
        props.compare(
            "referencedSchemaName",
            "Referenced Schema",
            &old.referenced_schema_name,
            &new.referenced_schema_name,
        );
        props.compare(
            "referencedTableName",
            "Referenced Table",
            &old.referenced_table_name,
            &new.referenced_table_name,
        );

        let expected_referenced =
            renames.column_names(renames.referenced_table(old), &old.referenced_columns);
        if !arrays_equal(&old.referenced_columns, &new.referenced_columns)
            && !arrays_equal(&expected_referenced, &new.referenced_columns)
        {
            props.push(
                "referencedColumns",
                "Referenced Columns",
                &old.referenced_columns,
                &new.referenced_columns,
            );
        }

        props.compare("onDeleteAction", "On Delete", &old.on_delete_action, &new.on_delete_action);
        props.compare("onUpdateAction", "On Update", &old.on_update_action, &new.on_update_action);

        props.into_changes()
    }

    fn change(
        category: ChangeCategory,
        action: ChangeAction,
        table: &Table,
        object: Option<(&str, &str)>,
        property_changes: Vec<PropertyChange>,
    ) -> SchemaChange {
        let key = ChangeKey::new(
            category,
            action,
            table.id.clone(),
            object.map(|(id, _)| id.to_string()),
        );

        SchemaChange {
            id: key.to_string(),
            category,
            action,
            table_id: table.id.clone(),
            table_schema: table.schema.clone(),
            table_name: table.name.clone(),
            object_id: key.object_id,
            object_name: object.map(|(_, name)| name.to_string()),
            property_changes,
        }
    }

    fn group(table: &Table, is_new: bool, is_deleted: bool, changes: Vec<SchemaChange>) -> TableChangeGroup {
        TableChangeGroup {
            table_id: table.id.clone(),
            table_schema: table.schema.clone(),
            table_name: table.name.clone(),
            is_new,
            is_deleted,
            changes,
        }
    }
}

/// Compute the grouped change summary between two snapshots
pub fn calculate_schema_diff(baseline: &Schema, current: &Schema) -> SchemaChangesSummary {
    DiffEngine::diff(baseline, current)
}
