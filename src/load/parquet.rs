// src/load/parquet.rs

use anyhow::{Context, Result};
use arrow::{compute::concat_batches, record_batch::RecordBatch};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{fs::File, path::Path};
use tracing::debug;

/// Read every row group of a Parquet file into a single batch.
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<RecordBatch> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet footer of {}", path.display()))?
        .with_batch_size(batch_size);
    let schema = builder.schema().clone();
    debug!(
        row_groups = builder.metadata().num_row_groups(),
        columns = schema.fields().len(),
        "opened parquet source"
    );

    let reader = builder.build().context("building parquet reader")?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("decoding {}", path.display()))?;

    concat_batches(&schema, &batches).context("concatenating parquet batches")
}
