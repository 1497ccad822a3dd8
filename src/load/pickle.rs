// src/load/pickle.rs

//! Pickled record lists: `[{"id_mutation": "2021-1", "surface_terrain": 120.0, ...}, ...]`.

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray},
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::BufReader,
    path::Path,
    sync::Arc,
};
use tracing::debug;

/// A scalar cell of a pickled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickleCell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PickleCell {
    fn render(&self) -> String {
        match self {
            PickleCell::Bool(b) => b.to_string(),
            PickleCell::Int(i) => i.to_string(),
            PickleCell::Float(f) => f.to_string(),
            PickleCell::Text(s) => s.clone(),
        }
    }
}

pub type PickleRecord = BTreeMap<String, Option<PickleCell>>;

pub fn read_pickle(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records: Vec<PickleRecord> =
        serde_pickle::from_reader(BufReader::new(file), serde_pickle::DeOptions::new())
            .with_context(|| format!("decoding pickle {}", path.display()))?;
    debug!(records = records.len(), "decoded pickle records");
    records_to_batch(&records)
}

/// Columns come out in name order; a key missing from a record is a null.
pub fn records_to_batch(records: &[PickleRecord]) -> Result<RecordBatch> {
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let mut fields = Vec::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let cells: Vec<Option<&PickleCell>> = records
            .iter()
            .map(|r| r.get(name).and_then(Option::as_ref))
            .collect();
        let array = build_column(&cells);
        fields.push(Field::new(name, array.data_type().clone(), true));
        columns.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }
    RecordBatch::try_new(schema, columns).context("assembling pickle batch")
}

fn build_column(cells: &[Option<&PickleCell>]) -> ArrayRef {
    let present = || cells.iter().flatten();

    if present().next().is_some() {
        if present().all(|c| matches!(c, PickleCell::Int(_))) {
            let arr: Int64Array = cells
                .iter()
                .map(|c| match c {
                    Some(PickleCell::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect();
            return Arc::new(arr);
        }
        if present().all(|c| matches!(c, PickleCell::Int(_) | PickleCell::Float(_))) {
            let arr: Float64Array = cells
                .iter()
                .map(|c| match c {
                    Some(PickleCell::Int(i)) => Some(*i as f64),
                    Some(PickleCell::Float(f)) => Some(*f),
                    _ => None,
                })
                .collect();
            return Arc::new(arr);
        }
        if present().all(|c| matches!(c, PickleCell::Bool(_))) {
            let arr: BooleanArray = cells
                .iter()
                .map(|c| match c {
                    Some(PickleCell::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            return Arc::new(arr);
        }
    }

    let arr: StringArray = cells.iter().map(|c| c.map(PickleCell::render)).collect();
    Arc::new(arr)
}
