// src/process/sanitize.rs

use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray},
    compute::filter_record_batch,
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, info, instrument};

use super::rows::{number_column, text_column};
use crate::{
    error::{DvfError, Result},
    schema::columns::{
        CODE_TYPE_LOCAL, COMMERCIAL_CODE, DEPENDANCE_CODE, DEPENDANCE_LABEL, EMPTY_FILLED,
        EMPTY_MARKER, ID_MUTATION, LEGACY_COLUMNS, TYPE_LOCAL, ZERO_FILLED,
        ZERO_TEXT_FILLED,
    },
};

/// Output of [`sanitize`].
#[derive(Debug, Clone)]
pub struct Sanitized {
    pub batch: RecordBatch,
    /// Mutations dropped because one of their lines is a business premises.
    pub removed_mutations: BTreeSet<String>,
}

enum Fill {
    Number(f64),
    Text(&'static str),
}

fn fill_for(name: &str) -> Option<Fill> {
    if ZERO_FILLED.contains(&name) {
        Some(Fill::Number(0.0))
    } else if ZERO_TEXT_FILLED.contains(&name) {
        Some(Fill::Text("0"))
    } else if name == CODE_TYPE_LOCAL {
        Some(Fill::Number(DEPENDANCE_CODE))
    } else if name == TYPE_LOCAL {
        Some(Fill::Text(DEPENDANCE_LABEL))
    } else if EMPTY_FILLED.contains(&name) {
        Some(Fill::Text(EMPTY_MARKER))
    } else {
        None
    }
}

/// Drop legacy columns and commercial mutations, then fill missing values.
///
/// A mutation with any `code_type_local == 4` line is removed whole, including
/// its residential lines.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn sanitize(batch: &RecordBatch) -> Result<Sanitized> {
    let batch = drop_legacy_columns(batch)?;

    for name in ZERO_FILLED
        .iter()
        .chain(ZERO_TEXT_FILLED.iter())
        .chain(EMPTY_FILLED.iter())
        .chain([CODE_TYPE_LOCAL, TYPE_LOCAL].iter())
    {
        if batch.schema().index_of(name).is_err() {
            return Err(DvfError::MissingColumn(name.to_string()));
        }
    }

    let (batch, removed_mutations) = drop_commercial_mutations(&batch)?;
    let batch = fill_missing(&batch)?;

    info!(
        rows = batch.num_rows(),
        removed_mutations = removed_mutations.len(),
        "sanitized"
    );
    Ok(Sanitized {
        batch,
        removed_mutations,
    })
}

fn drop_legacy_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let keep: Vec<usize> = (0..batch.num_columns())
        .filter(|&i| !LEGACY_COLUMNS.contains(&schema.field(i).name().as_str()))
        .collect();
    for legacy in LEGACY_COLUMNS {
        if schema.index_of(legacy).is_err() {
            debug!(column = legacy, "legacy column absent");
        }
    }
    Ok(batch.project(&keep)?)
}

fn drop_commercial_mutations(batch: &RecordBatch) -> Result<(RecordBatch, BTreeSet<String>)> {
    let ids = text_column(batch, ID_MUTATION)?;
    let codes = number_column(batch, CODE_TYPE_LOCAL)?;

    let commercial: BTreeSet<String> = (0..batch.num_rows())
        .filter(|&i| codes.is_valid(i) && codes.value(i) == COMMERCIAL_CODE && ids.is_valid(i))
        .map(|i| ids.value(i).to_string())
        .collect();
    if commercial.is_empty() {
        return Ok((batch.clone(), commercial));
    }

    let keep: BooleanArray = ids
        .iter()
        .map(|id| Some(!id.is_some_and(|id| commercial.contains(id))))
        .collect();
    let filtered = filter_record_batch(batch, &keep)?;
    debug!(
        mutations = commercial.len(),
        rows = batch.num_rows() - filtered.num_rows(),
        "dropped commercial mutations"
    );
    Ok((filtered, commercial))
}

fn fill_missing(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, arr) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let filled: ArrayRef = match fill_for(name) {
            Some(Fill::Number(value)) => {
                let nums = number_column(batch, name)?;
                Arc::new(Float64Array::from_iter_values(
                    nums.iter().map(|v| v.unwrap_or(value)),
                ))
            }
            Some(Fill::Text(value)) => {
                let texts = text_column(batch, name)?;
                Arc::new(StringArray::from_iter_values(
                    texts.iter().map(|v| v.unwrap_or(value)),
                ))
            }
            None => {
                fields.push(field.as_ref().clone());
                columns.push(arr.clone());
                continue;
            }
        };
        if arr.null_count() > 0 {
            debug!(column = %name, filled = arr.null_count(), "filled missing values");
        }
        fields.push(Field::new(name, filled.data_type().clone(), false));
        columns.push(filled);
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(RecordBatch::try_new(schema, columns)?)
}
