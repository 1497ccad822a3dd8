// src/process/group.rs

use std::collections::BTreeMap;
use tracing::{info, warn};

use super::rows::PropertyRow;

/// Every property row of one mutation, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationGroup {
    pub id: String,
    pub rows: Vec<PropertyRow>,
}

/// Partition rows by `id_mutation`, groups in ascending id order.
///
/// Rows without an identifier cannot be attributed to a mutation and are
/// skipped.
pub fn group_mutations(rows: Vec<PropertyRow>) -> Vec<MutationGroup> {
    let total = rows.len();
    let mut by_id: BTreeMap<String, Vec<PropertyRow>> = BTreeMap::new();
    let mut orphans = 0usize;

    for row in rows {
        match row.id_mutation.clone() {
            Some(id) => by_id.entry(id).or_default().push(row),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        warn!(rows = orphans, "skipped rows without id_mutation");
    }

    let groups: Vec<MutationGroup> = by_id
        .into_iter()
        .map(|(id, rows)| MutationGroup { id, rows })
        .collect();
    info!(rows = total, groups = groups.len(), "grouped mutations");
    groups
}
