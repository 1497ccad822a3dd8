// src/load/mod.rs

pub mod csv;
pub mod parquet;
pub mod pickle;

use anyhow::Result;
use arrow::record_batch::RecordBatch;
use std::{path::Path, time::Instant};
use tracing::{info, instrument};

use crate::format::InputFormat;
pub use csv::CsvTyping;

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub batch_size: usize,
    pub csv_typing: CsvTyping,
}

/// Load a whole DVF source into one in-memory table.
#[instrument(level = "info", skip(path, options), fields(path = %path.display(), format = %format))]
pub fn load_table(path: &Path, format: InputFormat, options: &LoadOptions) -> Result<RecordBatch> {
    let start = Instant::now();
    let batch = match format {
        InputFormat::Csv => csv::read_csv(path, options.csv_typing, options.batch_size)?,
        InputFormat::Parquet => parquet::read_parquet(path, options.batch_size)?,
        InputFormat::Pickle => pickle::read_pickle(path)?,
    };
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        elapsed = ?start.elapsed(),
        "loaded source"
    );
    Ok(batch)
}
