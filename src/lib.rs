//! SchemaFlow Designer - structural diff and revert engine
//!
//! Powers the "pending changes" panel of the visual schema designer:
//! - Compute an id-keyed, per-table change summary between a baseline
//!   snapshot and the working copy
//! - Describe each change in one localized sentence
//! - Decide whether a single change can be undone safely on its own
//! - Compute the schema with exactly that change undone
//!
//! The engine is synchronous and pure. It takes snapshots by reference,
//! returns new values, and never holds state between calls.
//!
//! ```
//! use schemaflow_designer::{calculate_schema_diff, describe_change, Schema};
//!
//! let baseline = Schema::default();
//! let summary = calculate_schema_diff(&baseline, &baseline);
//! assert!(!summary.has_changes);
//! assert!(summary.changes().map(describe_change).next().is_none());
//! ```

pub mod changes;
pub mod config;
pub mod error;
pub mod models;

#[cfg(test)]
mod test_support;

pub use changes::{
    can_revert_change, calculate_schema_diff, compute_reverted_schema, describe_change,
    describe_change_with, RevertCheck, RevertResult,
};
pub use config::{Messages, RevertMessages, Settings};
pub use error::{RevertError, SchemaError};
pub use models::{
    ChangeAction, ChangeCategory, ChangeKey, Column, ForeignKey, PropertyChange,
    ReferentialAction, Schema, SchemaChange, SchemaChangesSummary, Table, TableChangeGroup,
};
