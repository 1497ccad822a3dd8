// src/process/parallel.rs

use anyhow::Context;
use arrow::{
    array::{ArrayRef, Float64Array, StringArray, UInt64Array},
    record_batch::RecordBatch,
};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::{sync::Arc, time::Instant};
use tracing::{info, instrument};

use super::{
    fusion::{fuse_group, FusedRecord},
    group::MutationGroup,
};
use crate::{
    error::Result,
    schema::{fused_schema, FusedColumn, RawKind},
};

/// A dedicated pool for one run's fusion phase.
pub fn build_pool(threads: usize) -> anyhow::Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("dvf-fusion-{}", i))
        .build()
        .with_context(|| format!("building fusion pool with {} threads", threads))
}

/// Fuse every group on `pool`. Output order follows `groups`; the first
/// failing group fails the whole run.
#[instrument(level = "info", skip_all, fields(groups = groups.len(), threads = pool.current_num_threads()))]
pub fn fuse_all(groups: &[MutationGroup], pool: &ThreadPool) -> Result<Vec<FusedRecord>> {
    let start = Instant::now();
    let records = pool.install(|| {
        groups
            .par_iter()
            .map(fuse_group)
            .collect::<Result<Vec<_>>>()
    })?;
    info!(records = records.len(), elapsed = ?start.elapsed(), "fused mutations");
    Ok(records)
}

/// Assemble fused records into the fixed-order fused table.
pub fn records_to_table(records: &[FusedRecord]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = FusedColumn::ALL
        .iter()
        .map(|&col| -> ArrayRef {
            let cells = records.iter().map(move |r| r.cell(col));
            match col.raw_kind() {
                RawKind::Text => Arc::new(cells.map(|c| c.text()).collect::<StringArray>()),
                RawKind::Float => Arc::new(cells.map(|c| c.float()).collect::<Float64Array>()),
                RawKind::Count => Arc::new(cells.map(|c| c.count()).collect::<UInt64Array>()),
            }
        })
        .collect();
    Ok(RecordBatch::try_new(fused_schema(), columns)?)
}

/// Fusion phase: groups in, fused table out.
pub fn fuse_table(groups: &[MutationGroup], pool: &ThreadPool) -> Result<RecordBatch> {
    records_to_table(&fuse_all(groups, pool)?)
}
