// src/pipeline.rs

use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, instrument};

use crate::{
    config::PipelineConfig,
    format::InputFormat,
    load::{load_table, CsvTyping, LoadOptions},
    output::{write_parquet, OutputKind, WriteOptions},
    paths::{clean_output_path, store_output_path},
    process::{
        build_pool, fuse_table, group_mutations, normalize_types, rows_from_batch, sanitize,
    },
    schema::{coerce_raw_types, INDEX_COLUMN},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub output: PathBuf,
    pub source_rows: usize,
    pub removed_mutations: usize,
    pub mutations: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub bytes: u64,
}

/// Load a raw DVF export, fuse it to one record per mutation and write the
/// result as Parquet indexed by `id_mutation`.
#[instrument(level = "info", skip(output, config), fields(source = %source.display()))]
pub fn clean(
    source: &Path,
    output: Option<&Path>,
    format: &str,
    config: &PipelineConfig,
) -> Result<CleanReport> {
    let format: InputFormat = format.parse()?;
    let start = Instant::now();
    let target = clean_output_path(source, output);

    let options = LoadOptions {
        batch_size: config.batch_size,
        csv_typing: CsvTyping::Text,
    };
    let raw = load_table(source, format, &options)
        .with_context(|| format!("loading {}", source.display()))?;
    let source_rows = raw.num_rows();
    let raw = coerce_raw_types(&raw)?;

    let sanitized = sanitize(&raw)?;
    let rows = rows_from_batch(&sanitized.batch)?;
    let groups = group_mutations(rows);

    let pool = build_pool(config.threads)?;
    let fused = fuse_table(&groups, &pool)?;
    let table = normalize_types(&fused)?;

    let bytes = write_parquet(
        &table,
        &target,
        &WriteOptions {
            brotli_level: config.brotli_level,
            index_columns: vec![INDEX_COLUMN.name().to_string()],
            kind: OutputKind::Cleaned,
        },
    )
    .with_context(|| format!("writing {}", target.display()))?;

    let report = CleanReport {
        output: target,
        source_rows,
        removed_mutations: sanitized.removed_mutations.len(),
        mutations: table.num_rows(),
        bytes,
    };
    info!(
        rows = report.source_rows,
        removed = report.removed_mutations,
        mutations = report.mutations,
        bytes = report.bytes,
        elapsed = ?start.elapsed(),
        output = %report.output.display(),
        "clean complete"
    );
    Ok(report)
}

/// Convert any supported source to Parquet without transforming it.
#[instrument(level = "info", skip(output, config), fields(source = %source.display()))]
pub fn store(
    source: &Path,
    output: Option<&Path>,
    format: &str,
    config: &PipelineConfig,
) -> Result<StoreReport> {
    let format: InputFormat = format.parse()?;
    let target = store_output_path(source, output);

    let options = LoadOptions {
        batch_size: config.batch_size,
        csv_typing: CsvTyping::Infer,
    };
    let table = load_table(source, format, &options)
        .with_context(|| format!("loading {}", source.display()))?;

    let bytes = write_parquet(
        &table,
        &target,
        &WriteOptions {
            brotli_level: config.brotli_level,
            index_columns: Vec::new(),
            kind: OutputKind::Stored,
        },
    )
    .with_context(|| format!("writing {}", target.display()))?;

    let report = StoreReport {
        output: target,
        rows: table.num_rows(),
        columns: table.num_columns(),
        bytes,
    };
    info!(
        rows = report.rows,
        columns = report.columns,
        bytes = report.bytes,
        output = %report.output.display(),
        "store complete"
    );
    Ok(report)
}
