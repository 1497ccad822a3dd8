// src/process/mod.rs

//! Cleaning stages, in pipeline order: sanitize, materialise rows, group by
//! mutation, fuse in parallel, normalise storage types.

pub mod fusion;
pub mod group;
pub mod normalize;
pub mod parallel;
pub mod rows;
pub mod sanitize;

pub use fusion::{fuse_group, select_principal, FusedRecord};
pub use group::{group_mutations, MutationGroup};
pub use normalize::normalize_types;
pub use parallel::{build_pool, fuse_all, fuse_table, records_to_table};
pub use rows::{rows_from_batch, PropertyKind, PropertyRow};
pub use sanitize::{sanitize, Sanitized};
