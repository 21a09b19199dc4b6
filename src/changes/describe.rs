//! Change descriptions
//!
//! Turns a change record into the one-line sentence shown in the changes
//! panel. Wording comes from a [`Messages`] bundle so hosts can localize it.

use crate::config::Messages;
use crate::models::{ChangeAction, ChangeCategory, PropertyChange, SchemaChange};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static DEFAULT_MESSAGES: Lazy<Messages> = Lazy::new(Messages::default);

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Describe a change using the built-in English messages
pub fn describe_change(change: &SchemaChange) -> String {
    describe_change_with(change, &DEFAULT_MESSAGES)
}

/// Describe a change using a localized message bundle
pub fn describe_change_with(change: &SchemaChange, messages: &Messages) -> String {
    let template = match (change.category, change.action) {
        (ChangeCategory::Table, ChangeAction::Add) => &messages.created_table,
        (ChangeCategory::Table, ChangeAction::Delete) => &messages.deleted_table,
        (ChangeCategory::Table, ChangeAction::Modify) => &messages.modified_table,
        (ChangeCategory::Column, ChangeAction::Add) => &messages.added_column,
        (ChangeCategory::Column, ChangeAction::Delete) => &messages.deleted_column,
        (ChangeCategory::Column, ChangeAction::Modify) => &messages.modified_column,
        (ChangeCategory::ForeignKey, ChangeAction::Add) => &messages.added_foreign_key,
        (ChangeCategory::ForeignKey, ChangeAction::Delete) => &messages.deleted_foreign_key,
        (ChangeCategory::ForeignKey, ChangeAction::Modify) => &messages.modified_foreign_key,
    };

    let name = match change.category {
        ChangeCategory::Table => format!("[{}].[{}]", change.table_schema, change.table_name),
        ChangeCategory::Column | ChangeCategory::ForeignKey => change
            .object_name
            .clone()
            .or_else(|| change.object_id.clone())
            .unwrap_or_default(),
    };

    let changes = change
        .property_changes
        .iter()
        .map(|p| describe_property(p, messages))
        .collect::<Vec<_>>()
        .join(&messages.property_separator);

    render(template, &[("name", name.as_str()), ("changes", changes.as_str())])
}

fn describe_property(change: &PropertyChange, messages: &Messages) -> String {
    let old = display_value(&change.old_value);
    let new = display_value(&change.new_value);

    render(
        &messages.property_changed,
        &[
            ("property", change.display_name.as_str()),
            ("old", old.as_str()),
            ("new", new.as_str()),
        ],
    )
}

/// Stringify a property value for display. Name lists are comma-joined.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Substitute `{key}` placeholders; unknown placeholders are left as is
fn render(template: &str, args: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            args.iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
