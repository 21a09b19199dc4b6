//! Change records produced by the diff engine
//!
//! A change is identified by its category, action and target ids. The
//! string `id` on [`SchemaChange`] is derived from that identity and is only
//! meant for display keys on the UI side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of schema object a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeCategory {
    Table,
    Column,
    ForeignKey,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Table => "table",
            ChangeCategory::Column => "column",
            ChangeCategory::ForeignKey => "foreignKey",
        }
    }
}

/// What happened to the object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Add,
    Delete,
    Modify,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Add => "add",
            ChangeAction::Delete => "delete",
            ChangeAction::Modify => "modify",
        }
    }
}

/// Typed identity of a change: `{category, action, table, object?}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeKey {
    pub category: ChangeCategory,
    pub action: ChangeAction,
    pub table_id: String,
    pub object_id: Option<String>,
}

impl ChangeKey {
    pub fn new(
        category: ChangeCategory,
        action: ChangeAction,
        table_id: impl Into<String>,
        object_id: Option<String>,
    ) -> Self {
        Self {
            category,
            action,
            table_id: table_id.into(),
            object_id,
        }
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.category.as_str(), self.action.as_str(), self.table_id)?;
        if let Some(object_id) = &self.object_id {
            write!(f, ":{}", object_id)?;
        }
        Ok(())
    }
}

/// One scalar (or name list) field's before/after values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub property: String,
    pub display_name: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// A single add/delete/modify event on a table, column or foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaChange {
    pub id: String,
    pub category: ChangeCategory,
    pub action: ChangeAction,
    pub table_id: String,
    pub table_schema: String,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_changes: Vec<PropertyChange>,
}

impl SchemaChange {
    pub fn key(&self) -> ChangeKey {
        ChangeKey::new(
            self.category,
            self.action,
            self.table_id.clone(),
            self.object_id.clone(),
        )
    }

    /// Whether this change targets the given key
    pub fn matches(&self, key: &ChangeKey) -> bool {
        self.category == key.category
            && self.action == key.action
            && self.table_id == key.table_id
            && self.object_id == key.object_id
    }
}

/// All changes scoped to one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableChangeGroup {
    pub table_id: String,
    pub table_schema: String,
    pub table_name: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub changes: Vec<SchemaChange>,
}

/// Added/deleted/modified tally for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
}

/// Summary statistics for the diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCounts {
    pub tables: CategoryCounts,
    pub columns: CategoryCounts,
    pub foreign_keys: CategoryCounts,
}

impl ChangeCounts {
    fn record(&mut self, change: &SchemaChange) {
        let counts = match change.category {
            ChangeCategory::Table => &mut self.tables,
            ChangeCategory::Column => &mut self.columns,
            ChangeCategory::ForeignKey => &mut self.foreign_keys,
        };

        match change.action {
            ChangeAction::Add => counts.added += 1,
            ChangeAction::Delete => counts.deleted += 1,
            ChangeAction::Modify => counts.modified += 1,
        }
    }
}

/// Grouped result of comparing two snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaChangesSummary {
    pub has_changes: bool,
    pub total_changes: usize,
    pub groups: Vec<TableChangeGroup>,
    #[serde(default)]
    pub counts: ChangeCounts,
}

impl SchemaChangesSummary {
    /// Build the summary from groups, dropping any group with no changes
    pub fn from_groups(groups: Vec<TableChangeGroup>) -> Self {
        let groups: Vec<TableChangeGroup> = groups
            .into_iter()
            .filter(|g| !g.changes.is_empty())
            .collect();

        let mut counts = ChangeCounts::default();
        for change in groups.iter().flat_map(|g| g.changes.iter()) {
            counts.record(change);
        }

        let total_changes = groups.iter().map(|g| g.changes.len()).sum();

        Self {
            has_changes: total_changes > 0,
            total_changes,
            groups,
            counts,
        }
    }

    /// Every change across all groups, in group order
    pub fn changes(&self) -> impl Iterator<Item = &SchemaChange> {
        self.groups.iter().flat_map(|g| g.changes.iter())
    }

    pub fn find(&self, key: &ChangeKey) -> Option<&SchemaChange> {
        self.changes().find(|c| c.matches(key))
    }

    /// Owned copy of every change, the shape the revert validator expects
    pub fn all_changes(&self) -> Vec<SchemaChange> {
        self.changes().cloned().collect()
    }
}
