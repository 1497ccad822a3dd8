// src/output.rs

use anyhow::{Context, Result};
use arrow::{datatypes::DataType, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
    format::KeyValue,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    ffi::OsString,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Key of the file-level metadata entry written with every output.
pub const METADATA_KEY: &str = "dvf_maintenance";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Cleaned,
    Stored,
}

/// Content of the `dvf_maintenance` metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub index_columns: Vec<String>,
    pub rows: usize,
    pub kind: OutputKind,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub brotli_level: u32,
    pub index_columns: Vec<String>,
    pub kind: OutputKind,
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn writer_properties(batch: &RecordBatch, options: &WriteOptions) -> Result<WriterProperties> {
    let level = BrotliLevel::try_new(options.brotli_level)
        .with_context(|| format!("invalid brotli level {}", options.brotli_level))?;
    let meta = OutputMetadata {
        index_columns: options.index_columns.clone(),
        rows: batch.num_rows(),
        kind: options.kind,
    };
    let json = serde_json::to_string(&meta).context("serializing output metadata")?;

    Ok(WriterProperties::builder()
        .set_compression(Compression::BROTLI(level))
        .set_dictionary_enabled(true)
        .set_key_value_metadata(Some(vec![KeyValue::new(METADATA_KEY.to_string(), json)]))
        .build())
}

fn write_file(batch: &RecordBatch, path: &Path, props: WriterProperties) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating temporary Parquet file {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("initializing Parquet writer")?;
    writer.write(batch).context("writing batch to Parquet")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

/// Write `batch` as one Brotli-compressed Parquet file at `path`.
///
/// The data lands in `<path>.tmp` first and is renamed over `path` once the
/// writer is closed; on any failure the temporary file is removed. Returns the
/// size of the written file.
#[instrument(level = "info", skip(batch, options), fields(path = %path.display(), rows = batch.num_rows()))]
pub fn write_parquet(batch: &RecordBatch, path: &Path, options: &WriteOptions) -> Result<u64> {
    let props = writer_properties(batch, options)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let tmp = tmp_path(path);
    let finished = write_file(batch, &tmp, props).and_then(|()| {
        let size = fs::metadata(&tmp).context("getting file metadata")?.len();
        fs::rename(&tmp, path)
            .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
        Ok(size)
    });

    match finished {
        Ok(size) => {
            info!(bytes = size, "wrote Parquet output");
            Ok(size)
        }
        Err(e) => {
            if tmp.exists() {
                if let Err(rm) = fs::remove_file(&tmp) {
                    warn!(path = %tmp.display(), error = %rm, "could not remove temporary file");
                }
            }
            Err(e)
        }
    }
}

/// What an output file holds, read back from its footer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSummary {
    pub rows: i64,
    pub row_groups: usize,
    pub columns: Vec<(String, DataType)>,
    pub compression: BTreeSet<String>,
    pub metadata: Option<OutputMetadata>,
    pub file_size: u64,
}

impl OutputSummary {
    pub fn index_columns(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|m| m.index_columns.as_slice())
            .unwrap_or(&[])
    }
}

pub fn summarize(path: &Path) -> Result<OutputSummary> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet footer of {}", path.display()))?;

    let parquet_meta = builder.metadata();
    let file_meta = parquet_meta.file_metadata();

    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), f.data_type().clone()))
        .collect();

    let compression = parquet_meta
        .row_groups()
        .iter()
        .flat_map(|rg| rg.columns().iter().map(|c| format!("{:?}", c.compression())))
        .collect();

    let metadata = match file_meta
        .key_value_metadata()
        .and_then(|kv| kv.iter().find(|e| e.key == METADATA_KEY))
        .and_then(|e| e.value.as_deref())
    {
        Some(json) => Some(
            serde_json::from_str(json)
                .with_context(|| format!("parsing `{}` metadata", METADATA_KEY))?,
        ),
        None => None,
    };

    Ok(OutputSummary {
        rows: file_meta.num_rows(),
        row_groups: parquet_meta.num_row_groups(),
        columns,
        compression,
        metadata,
        file_size: fs::metadata(path)?.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{ArrayRef, Float64Array, StringArray},
        datatypes::{Field, Schema},
    };
    use std::sync::Arc;

    fn small_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id_mutation", DataType::Utf8, false),
            Field::new("valeur_fonciere", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["2021-1", "2021-2", "2021-3"])),
            Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.5)])),
        ];
        RecordBatch::try_new(schema, columns).unwrap()
    }

    fn options(kind: OutputKind) -> WriteOptions {
        WriteOptions {
            brotli_level: 5,
            index_columns: vec!["id_mutation".into()],
            kind,
        }
    }

    #[test]
    fn writes_brotli_with_metadata() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/out.parquet");
        let size = write_parquet(&small_batch(), &path, &options(OutputKind::Cleaned))?;

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());

        let summary = summarize(&path)?;
        assert_eq!(summary.file_size, size);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.row_groups, 1);
        assert_eq!(summary.columns[0], ("id_mutation".to_string(), DataType::Utf8));
        assert!(summary.compression.iter().all(|c| c.starts_with("BROTLI")));
        assert_eq!(summary.index_columns(), ["id_mutation".to_string()]);

        let meta = summary.metadata.unwrap();
        assert_eq!(meta.rows, 3);
        assert_eq!(meta.kind, OutputKind::Cleaned);
        Ok(())
    }

    #[test]
    fn overwrites_previous_output() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet");
        fs::write(&path, b"stale")?;
        write_parquet(&small_batch(), &path, &options(OutputKind::Stored))?;
        assert_eq!(summarize(&path)?.rows, 3);
        Ok(())
    }

    #[test]
    fn failed_write_leaves_nothing_behind() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        // a non-empty directory cannot be replaced by the rename
        let path = dir.path().join("taken.parquet");
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), b"x")?;

        assert!(write_parquet(&small_batch(), &path, &options(OutputKind::Cleaned)).is_err());
        assert!(!tmp_path(&path).exists());
        assert!(path.join("keep").exists());
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_level() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet");
        let mut opts = options(OutputKind::Cleaned);
        opts.brotli_level = 12;
        assert!(write_parquet(&small_batch(), &path, &opts).is_err());
        assert!(!path.exists());
        assert!(!tmp_path(&path).exists());
        Ok(())
    }

    #[test]
    fn metadata_json_shape() -> anyhow::Result<()> {
        let meta = OutputMetadata {
            index_columns: vec![],
            rows: 7,
            kind: OutputKind::Stored,
        };
        assert_eq!(
            serde_json::to_string(&meta)?,
            r#"{"index_columns":[],"rows":7,"kind":"stored"}"#
        );
        Ok(())
    }
}
