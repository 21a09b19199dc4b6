//! Foreign key model
//!
//! A foreign key carries two addressing modes side by side. The name-based
//! fields (`columns`, `referenced_*_name`, `referenced_columns`) are what the
//! change engine diffs and describes; the id-based fields are kept for the
//! canvas and passed through untouched. Across snapshots a foreign key is
//! matched by `id` only.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Referential action for ON DELETE / ON UPDATE
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Foreign key constraint owned by a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ForeignKey {
    pub id: String,

    #[validate(length(min = 1, message = "Foreign key name is required"))]
    pub name: String,

    /// Source column names on the owning table
    pub columns: Vec<String>,

    pub referenced_schema_name: String,
    pub referenced_table_name: String,

    /// Referenced column names, positionally paired with `columns`
    pub referenced_columns: Vec<String>,

    pub on_delete_action: ReferentialAction,
    pub on_update_action: ReferentialAction,

    // Canvas addressing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_column_ids: Option<Vec<String>>,
}
