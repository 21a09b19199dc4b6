//! Revert validation
//!
//! Decides whether a single pending change can be undone on its own without
//! leaving a dangling reference. Each call looks only at the live schema; it
//! never simulates reverting the other pending changes first.
//!
//! Foreign key targets are resolved by NAME against the current schema. A
//! referenced table or column that was renamed therefore counts as missing,
//! even though its id still exists. This is deliberately conservative: the
//! restored foreign key would reference the old name.

use crate::config::RevertMessages;
use crate::models::{ChangeAction, ChangeCategory, ForeignKey, Schema, SchemaChange};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of a revert feasibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertCheck {
    pub can_revert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Id of a pending change that explains the refusal, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
}

impl RevertCheck {
    pub fn allowed() -> Self {
        Self {
            can_revert: true,
            reason: None,
            blocked_by: None,
        }
    }

    pub fn blocked(reason: impl Into<String>, blocked_by: Option<String>) -> Self {
        Self {
            can_revert: false,
            reason: Some(reason.into()),
            blocked_by,
        }
    }
}

/// Check whether `change` can be reverted in isolation.
///
/// `all_changes` is the full pending change list; it is only used to point at
/// the change responsible for a refusal and never alters the decision.
pub fn can_revert_change(
    change: &SchemaChange,
    baseline: &Schema,
    current: &Schema,
    all_changes: &[SchemaChange],
    messages: &RevertMessages,
) -> RevertCheck {
    match (change.category, change.action) {
        (ChangeCategory::Table, _) => RevertCheck::allowed(),

        // Restoring a column is safe even if a foreign key that used it was
        // dropped too; that foreign key's own revert is checked separately.
        (ChangeCategory::Column, _) => RevertCheck::allowed(),

        // Dropping an added foreign key cannot break referential integrity
        (ChangeCategory::ForeignKey, ChangeAction::Add) => RevertCheck::allowed(),

        (ChangeCategory::ForeignKey, ChangeAction::Delete | ChangeAction::Modify) => {
            check_foreign_key_target(change, baseline, current, all_changes, messages)
        }
    }
}

/// Restoring the baseline foreign key requires its referenced table and every
/// referenced column to exist, by name, in the current schema
fn check_foreign_key_target(
    change: &SchemaChange,
    baseline: &Schema,
    current: &Schema,
    all_changes: &[SchemaChange],
    messages: &RevertMessages,
) -> RevertCheck {
    let baseline_fk = change.object_id.as_deref().and_then(|fk_id| {
        baseline
            .find_table(&change.table_id)
            .and_then(|t| t.find_foreign_key(fk_id))
    });

    let Some(fk) = baseline_fk else {
        warn!("Foreign key {} has no baseline definition", change.id);
        return RevertCheck::blocked(&messages.cannot_revert_foreign_key, None);
    };

    let target_exists = current
        .find_table_by_name(&fk.referenced_schema_name, &fk.referenced_table_name)
        .is_some_and(|table| {
            fk.referenced_columns
                .iter()
                .all(|name| table.find_column_by_name(name).is_some())
        });

    if target_exists {
        return RevertCheck::allowed();
    }

    let blocked_by = find_blocking_change(fk, baseline, all_changes);
    debug!(
        "Revert of {} blocked: {}.{} ({}) not found in current schema{}",
        change.id,
        fk.referenced_schema_name,
        fk.referenced_table_name,
        fk.referenced_columns.join(", "),
        blocked_by
            .as_deref()
            .map(|id| format!(", caused by {}", id))
            .unwrap_or_default()
    );

    RevertCheck::blocked(&messages.cannot_revert_foreign_key, blocked_by)
}

/// Find the pending change that removed or renamed the foreign key's target:
/// a table delete/modify first, then a column delete/modify on a referenced
/// column
fn find_blocking_change(
    fk: &ForeignKey,
    baseline: &Schema,
    all_changes: &[SchemaChange],
) -> Option<String> {
    let target = baseline.find_table_by_name(&fk.referenced_schema_name, &fk.referenced_table_name)?;

    let table_change = all_changes.iter().find(|c| {
        c.category == ChangeCategory::Table
            && c.table_id == target.id
            && matches!(c.action, ChangeAction::Delete | ChangeAction::Modify)
    });
    if let Some(c) = table_change {
        return Some(c.id.clone());
    }

    fk.referenced_columns
        .iter()
        .filter_map(|name| target.find_column_by_name(name))
        .find_map(|col| {
            all_changes.iter().find(|c| {
                c.category == ChangeCategory::Column
                    && c.table_id == target.id
                    && c.object_id.as_deref() == Some(col.id.as_str())
                    && matches!(c.action, ChangeAction::Delete | ChangeAction::Modify)
            })
        })
        .map(|c| c.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::diff::calculate_schema_diff;
    use crate::models::{ChangeKey, SchemaChangesSummary, Table};
    use crate::test_support::{column, foreign_key, pk_column, table};

    fn customers() -> Table {
        table(
            "t_customers",
            "customers",
            vec![
                pk_column("c_customer_id", "customer_id", "int"),
                column("c_region", "region", "nvarchar"),
            ],
            vec![],
        )
    }

    fn invoices() -> Table {
        table(
            "t_invoices",
            "invoices",
            vec![
                pk_column("c_invoice_id", "invoice_id", "int"),
                column("c_invoice_customer", "customer_id", "int"),
            ],
            vec![foreign_key(
                "fk_invoices_customers",
                "FK_invoices_customers",
                &["customer_id"],
                "customers",
                &["customer_id"],
            )],
        )
    }

    fn check(summary: &SchemaChangesSummary, key: &ChangeKey, baseline: &Schema, current: &Schema) -> RevertCheck {
        let change = summary.find(key).expect("change should be in the summary");
        can_revert_change(change, baseline, current, &summary.all_changes(), &RevertMessages::default())
    }

    fn fk_key(action: ChangeAction) -> ChangeKey {
        ChangeKey::new(
            ChangeCategory::ForeignKey,
            action,
            "t_invoices",
            Some("fk_invoices_customers".to_string()),
        )
    }

    #[test]
    fn test_deleted_foreign_key_with_intact_target_can_be_reverted() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let mut current = baseline.clone();
        current.tables[1].foreign_keys.clear();

        let summary = calculate_schema_diff(&baseline, &current);
        let result = check(&summary, &fk_key(ChangeAction::Delete), &baseline, &current);

        assert_eq!(result, RevertCheck::allowed());
    }

    #[test]
    fn test_deleted_foreign_key_with_deleted_target_table_is_blocked() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let mut current = Schema::new(vec![invoices()]);
        current.tables[0].foreign_keys.clear();

        let summary = calculate_schema_diff(&baseline, &current);
        let result = check(&summary, &fk_key(ChangeAction::Delete), &baseline, &current);

        assert!(!result.can_revert);
        assert_eq!(
            result.reason.as_deref(),
            Some(RevertMessages::default().cannot_revert_foreign_key.as_str())
        );
        assert_eq!(result.blocked_by.as_deref(), Some("table:delete:t_customers"));
    }

    #[test]
    fn test_deleted_foreign_key_with_missing_referenced_column_is_blocked() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let mut current = baseline.clone();
        current.tables[0].columns.remove(0);
        current.tables[1].foreign_keys.clear();

        let summary = calculate_schema_diff(&baseline, &current);
        let result = check(&summary, &fk_key(ChangeAction::Delete), &baseline, &current);

        assert!(!result.can_revert);
        assert_eq!(
            result.blocked_by.as_deref(),
            Some("column:delete:t_customers:c_customer_id")
        );
    }

    #[test]
    fn test_modified_foreign_key_after_table_rename_is_blocked() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let mut current = baseline.clone();
        current.tables[0].name = "clients".to_string();
        current.tables[1].foreign_keys[0].referenced_table_name = "clients".to_string();

        let summary = calculate_schema_diff(&baseline, &current);
        let fk_change = summary.find(&fk_key(ChangeAction::Modify)).expect("foreign key modify");
        assert_eq!(fk_change.property_changes[0].property, "referencedTableName");

        let result = check(&summary, &fk_key(ChangeAction::Modify), &baseline, &current);

        assert!(!result.can_revert);
        assert_eq!(result.blocked_by.as_deref(), Some("table:modify:t_customers"));
    }

    #[test]
    fn test_non_foreign_key_changes_are_always_revertable() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let mut current = Schema::new(vec![invoices()]);
        current.tables[0].columns.remove(1);
        current.tables[0].columns.push(column("c_total", "total", "decimal"));
        current.tables[0].foreign_keys.clear();

        let summary = calculate_schema_diff(&baseline, &current);
        let all = summary.all_changes();

        for change in all.iter().filter(|c| c.category != ChangeCategory::ForeignKey) {
            let result = can_revert_change(change, &baseline, &current, &all, &RevertMessages::default());
            assert!(result.can_revert, "{} should be revertable", change.id);
        }
    }

    #[test]
    fn test_added_foreign_key_is_always_revertable() {
        let baseline = Schema::new(vec![invoices()]);
        let mut current = baseline.clone();
        current.tables[0].foreign_keys[0].id = "fk_new".to_string();

        let summary = calculate_schema_diff(&baseline, &current);
        let added = ChangeKey::new(
            ChangeCategory::ForeignKey,
            ChangeAction::Add,
            "t_invoices",
            Some("fk_new".to_string()),
        );

        assert!(check(&summary, &added, &baseline, &current).can_revert);
    }

    #[test]
    fn test_unknown_foreign_key_is_blocked() {
        let baseline = Schema::new(vec![customers(), invoices()]);
        let change = SchemaChange {
            id: "foreignKey:delete:t_invoices:fk_ghost".to_string(),
            category: ChangeCategory::ForeignKey,
            action: ChangeAction::Delete,
            table_id: "t_invoices".to_string(),
            table_schema: "dbo".to_string(),
            table_name: "invoices".to_string(),
            object_id: Some("fk_ghost".to_string()),
            object_name: None,
            property_changes: Vec::new(),
        };
        let messages = RevertMessages {
            cannot_revert_foreign_key: "blocked".to_string(),
            ..RevertMessages::default()
        };

        let result = can_revert_change(&change, &baseline, &baseline, &[], &messages);
        assert_eq!(result, RevertCheck::blocked("blocked", None));
    }
}
