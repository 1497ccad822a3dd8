// src/load/csv.rs

use anyhow::{Context, Result};
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::Arc,
};
use tracing::{debug, warn};

/// How column types are chosen for a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvTyping {
    /// Every column is read as `Utf8`; typing happens later.
    Text,
    /// Types are inferred by scanning the whole file.
    Infer,
}

fn csv_format() -> Format {
    Format::default()
        .with_header(true)
        .with_delimiter(b',')
        .with_quote(b'"')
}

/// Open `path` for reading, transparently gunzipping `*.gz` files.
fn open_text(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let gz = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    if gz {
        debug!(path = %path.display(), "reading gzip-compressed csv");
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn read_schema(path: &Path, typing: CsvTyping) -> Result<Schema> {
    let reader = open_text(path)?;
    match typing {
        CsvTyping::Infer => {
            let (schema, records) = csv_format()
                .infer_schema(reader, None)
                .with_context(|| format!("inferring schema of {}", path.display()))?;
            debug!(records, columns = schema.fields().len(), "inferred csv schema");
            Ok(schema)
        }
        CsvTyping::Text => {
            let (header, _) = csv_format()
                .infer_schema(reader, Some(0))
                .with_context(|| format!("reading header of {}", path.display()))?;
            let fields: Vec<Field> = header
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect();
            Ok(Schema::new(fields))
        }
    }
}

/// Read a comma-separated file with a header row into a single batch.
/// Empty fields are null.
pub fn read_csv(path: &Path, typing: CsvTyping, batch_size: usize) -> Result<RecordBatch> {
    let schema = Arc::new(read_schema(path, typing)?);
    if schema.fields().is_empty() {
        warn!(path = %path.display(), "csv has no header columns");
    }

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(csv_format())
        .with_batch_size(batch_size)
        .build(open_text(path)?)
        .context("creating CSV reader")?;

    let mut batches = Vec::new();
    for (idx, batch) in reader.enumerate() {
        let batch = batch.with_context(|| {
            format!("CSV parse error in {} at batch {}", path.display(), idx)
        })?;
        batches.push(batch);
    }

    concat_batches(&schema, &batches).context("concatenating csv batches")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, StringArray};
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = "id_mutation,code_departement,surface_reelle_bati\n\
2021-1,01,90\n\
2021-2,2A,\n";

    #[test]
    fn text_mode_keeps_leading_zeros() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dvf.csv");
        std::fs::write(&path, SAMPLE)?;

        let batch = read_csv(&path, CsvTyping::Text, 1024)?;
        assert_eq!(batch.num_rows(), 2);
        assert!(batch
            .schema()
            .fields()
            .iter()
            .all(|f| f.data_type() == &DataType::Utf8));

        let dep = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(dep.value(0), "01");
        assert!(batch.column(2).is_null(1));
        Ok(())
    }

    #[test]
    fn infer_mode_types_numbers() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dvf.csv");
        std::fs::write(&path, SAMPLE)?;

        let batch = read_csv(&path, CsvTyping::Infer, 1)?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(2).data_type(), &DataType::Int64);
        Ok(())
    }

    #[test]
    fn reads_gzip_files() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("full.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path)?, Compression::default());
        enc.write_all(SAMPLE.as_bytes())?;
        enc.finish()?;

        let batch = read_csv(&path, CsvTyping::Text, 1024)?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "id_mutation");
        Ok(())
    }

    #[test]
    fn header_only_file_is_empty_table() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "id_mutation,date_mutation\n")?;

        let batch = read_csv(&path, CsvTyping::Text, 1024)?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
        Ok(())
    }
}
