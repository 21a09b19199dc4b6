//! Schema Change Engine
//!
//! Compares the designer's working schema with its baseline and lets the
//! user undo individual changes. This module provides:
//! - Identity helpers (matching objects across snapshots by id)
//! - The diff engine (grouped, id-keyed change summary)
//! - Change descriptions (one line per change, localizable)
//! - Revert validation (is undoing this change safe on its own?)
//! - Revert computation (the schema with one change undone)
//!
//! Every entry point is a pure function of its arguments.

pub mod describe;
pub mod diff;
pub mod identity;
pub mod revert;
pub mod validate;

pub use describe::{describe_change, describe_change_with};
pub use diff::{calculate_schema_diff, DiffEngine};
pub use revert::{compute_reverted_schema, RevertResult};
pub use validate::{can_revert_change, RevertCheck};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RevertMessages;
    use crate::models::{ChangeAction, ChangeCategory, ChangeKey, Schema, Table};
    use crate::test_support::{column, foreign_key, init_tracing, pk_column, table};
    use pretty_assertions::assert_eq;

    fn baseline() -> Schema {
        Schema::new(vec![
            table(
                "t_users",
                "users",
                vec![
                    pk_column("c_user_id", "user_id", "int"),
                    column("c_phone", "phone_number", "nvarchar"),
                ],
                vec![],
            ),
            table(
                "t_returns",
                "returns",
                vec![
                    pk_column("c_return_id", "return_id", "int"),
                    column("c_order_item", "order_item_id", "int"),
                ],
                vec![foreign_key(
                    "fk_returns_items",
                    "FK_returns_order_items",
                    &["order_item_id"],
                    "order_items",
                    &["order_item_id"],
                )],
            ),
            table(
                "t_promotions",
                "promotions",
                vec![pk_column("c_promotion_id", "promotion_id", "int")],
                vec![],
            ),
        ])
    }

    fn edited() -> Schema {
        let mut schema = baseline();

        let users = &mut schema.tables[0];
        users.name = "app_users".to_string();
        users.columns[0].data_type = "bigint".to_string();
        users.columns[0].is_nullable = true;

        schema.tables[1].foreign_keys[0].referenced_table_name = "order_items_v2".to_string();

        schema.tables.remove(2);

        schema.tables.push(table(
            "t_order_items_v2",
            "order_items_v2",
            vec![pk_column("c_v2_item", "order_item_id", "int")],
            vec![],
        ));
        schema.tables.push(table(
            "t_audit_log",
            "audit_log",
            vec![
                pk_column("c_audit_id", "audit_id", "bigint"),
                column("c_audit_action", "action", "nvarchar"),
            ],
            vec![],
        ));

        schema
    }

    fn group_names(tables: &[Table]) -> Vec<&str> {
        tables.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_edit_session() {
        init_tracing();
        let baseline = baseline();
        let current = edited();

        let summary = calculate_schema_diff(&baseline, &current);

        assert!(summary.has_changes);
        assert_eq!(summary.groups.len(), 5);
        assert!(summary.groups.iter().all(|g| !g.changes.is_empty()));

        let promotions = summary.groups.iter().find(|g| g.table_id == "t_promotions").unwrap();
        assert!(promotions.is_deleted);
        assert_eq!(promotions.changes.len(), 1);

        let audit = summary.groups.iter().find(|g| g.table_id == "t_audit_log").unwrap();
        assert!(audit.is_new);
        assert_eq!(audit.changes.len(), 3);

        let users = summary.groups.iter().find(|g| g.table_id == "t_users").unwrap();
        assert_eq!(users.table_name, "app_users");
        assert_eq!(
            describe_change(&users.changes[0]),
            "Modified table [dbo].[app_users]: Name changed from 'users' to 'app_users'"
        );
        assert_eq!(
            describe_change(&users.changes[1]),
            "Modified column 'user_id': Data Type changed from 'int' to 'bigint', Allow Nulls changed from 'false' to 'true'"
        );

        let returns = summary.groups.iter().find(|g| g.table_id == "t_returns").unwrap();
        assert_eq!(
            describe_change(&returns.changes[0]),
            "Modified foreign key 'FK_returns_order_items': Referenced Table changed from 'order_items' to 'order_items_v2'"
        );

        let total: usize = summary.groups.iter().map(|g| g.changes.len()).sum();
        assert_eq!(summary.total_changes, total);
        assert_eq!(summary.counts.tables.added, 2);
        assert_eq!(summary.counts.tables.deleted, 1);
        assert_eq!(summary.counts.tables.modified, 1);
    }

    #[test]
    fn test_end_to_end_reverts() {
        let baseline = baseline();
        let current = edited();
        let summary = calculate_schema_diff(&baseline, &current);
        let all = summary.all_changes();
        let messages = RevertMessages::default();

        // The old FK target never existed in the working copy
        let fk_change = summary
            .find(&ChangeKey::new(
                ChangeCategory::ForeignKey,
                ChangeAction::Modify,
                "t_returns",
                Some("fk_returns_items".to_string()),
            ))
            .unwrap();
        let check = can_revert_change(fk_change, &baseline, &current, &all, &messages);
        assert!(!check.can_revert);
        assert_eq!(check.reason.as_deref(), Some(messages.cannot_revert_foreign_key.as_str()));
        assert!(check.blocked_by.is_none());

        let rename = summary
            .find(&ChangeKey::new(ChangeCategory::Table, ChangeAction::Modify, "t_users", None))
            .unwrap();
        assert!(can_revert_change(rename, &baseline, &current, &all, &messages).can_revert);
        let tables = compute_reverted_schema(rename, &baseline, &current).unwrap();
        assert_eq!(
            group_names(&tables),
            vec!["users", "returns", "order_items_v2", "audit_log"]
        );

        let dropped = summary
            .find(&ChangeKey::new(ChangeCategory::Table, ChangeAction::Delete, "t_promotions", None))
            .unwrap();
        let tables = compute_reverted_schema(dropped, &baseline, &current).unwrap();
        assert_eq!(
            group_names(&tables),
            vec!["app_users", "returns", "promotions", "order_items_v2", "audit_log"]
        );

        // Undoing every change one at a time, replaying the result, converges
        // back to the baseline minus the foreign key that cannot be restored.
        let mut working = current.clone();
        loop {
            let pending = calculate_schema_diff(&baseline, &working);
            let all = pending.all_changes();
            let next = all.iter().find(|c| {
                can_revert_change(c, &baseline, &working, &all, &messages).can_revert
                    && compute_reverted_schema(c, &baseline, &working).is_ok()
            });
            let Some(next) = next else { break };
            working = Schema::new(compute_reverted_schema(next, &baseline, &working).unwrap());
        }

        let remaining = calculate_schema_diff(&baseline, &working);
        assert_eq!(remaining.total_changes, 1);
        assert_eq!(remaining.groups[0].changes[0].id, "foreignKey:modify:t_returns:fk_returns_items");
    }
}
