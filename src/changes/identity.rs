//! Identity and equality helpers
//!
//! Tables, columns and foreign keys are matched across snapshots by `id`
//! alone. These helpers split two ordered lists into added / deleted / common
//! by id, and compute where a baseline object belongs when it is put back.

use crate::models::{Column, ForeignKey, Schema, Table};
use std::collections::{HashMap, HashSet};

/// Anything with a stable id that survives renames
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Table {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Column {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ForeignKey {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Result of matching two lists by id.
///
/// `added` and `common` follow current order, `deleted` follows baseline order.
#[derive(Debug)]
pub struct IdPartition<'a, T> {
    pub added: Vec<&'a T>,
    pub deleted: Vec<&'a T>,
    pub common: Vec<(&'a T, &'a T)>,
}

/// Split `baseline` and `current` into added, deleted and common items by id
pub fn partition_by_id<'a, T: Identified>(baseline: &'a [T], current: &'a [T]) -> IdPartition<'a, T> {
    let baseline_map: HashMap<&str, &T> = baseline.iter().map(|item| (item.id(), item)).collect();
    let current_ids: HashSet<&str> = current.iter().map(|item| item.id()).collect();

    let mut added = Vec::new();
    let mut common = Vec::new();

    for item in current {
        match baseline_map.get(item.id()) {
            Some(old) => common.push((*old, item)),
            None => added.push(item),
        }
    }

    let deleted = baseline
        .iter()
        .filter(|item| !current_ids.contains(item.id()))
        .collect();

    IdPartition {
        added,
        deleted,
        common,
    }
}

/// Order-sensitive list equality: same length, same element at every index
pub fn arrays_equal<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Index in `current` at which the baseline item `id` should be reinserted.
///
/// The item goes right after the nearest baseline predecessor that still
/// exists in `current`; with no surviving predecessor it goes first.
pub fn restore_position<T: Identified>(baseline: &[T], current: &[T], id: &str) -> usize {
    let Some(baseline_index) = baseline.iter().position(|item| item.id() == id) else {
        return current.len();
    };

    baseline[..baseline_index]
        .iter()
        .rev()
        .find_map(|prev| current.iter().position(|item| item.id() == prev.id()))
        .map(|index| index + 1)
        .unwrap_or(0)
}

/// Translates baseline names into the names the same objects carry in the
/// current snapshot, following ids through renames.
///
/// Foreign keys store their referenced columns by name, so renaming a
/// referenced column rewrites that list without the foreign key itself
/// changing.
pub struct RenameMap<'a> {
    baseline: &'a Schema,
    current: &'a Schema,
}

impl<'a> RenameMap<'a> {
    pub fn new(baseline: &'a Schema, current: &'a Schema) -> Self {
        Self { baseline, current }
    }

    /// Current names of baseline columns `names` on `baseline_table`
    pub fn column_names(&self, baseline_table: Option<&Table>, names: &[String]) -> Vec<String> {
        let current_table = baseline_table.and_then(|t| self.current.find_table(&t.id));

        names
            .iter()
            .map(|name| {
                baseline_table
                    .and_then(|t| t.find_column_by_name(name))
                    .and_then(|old| current_table.and_then(|t| t.find_column(&old.id)))
                    .map(|new| new.name.clone())
                    .unwrap_or_else(|| name.clone())
            })
            .collect()
    }

    /// Baseline table that a baseline foreign key points at, by name
    pub fn referenced_table(&self, fk: &ForeignKey) -> Option<&'a Table> {
        self.baseline
            .find_table_by_name(&fk.referenced_schema_name, &fk.referenced_table_name)
    }
}
