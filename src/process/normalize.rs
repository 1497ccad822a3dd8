// src/process/normalize.rs

use arrow::{
    array::ArrayRef,
    compute::cast_with_options,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    error::{DvfError, Result},
    schema::{fused::FusedColumn, strict_cast_options},
};

fn categorical() -> DataType {
    DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
}

/// Storage type of a fused column, by name. `None` keeps the column as is.
pub fn target_type(name: &str) -> Option<DataType> {
    if name.starts_with("nombre_") {
        return Some(DataType::UInt16);
    }
    if name.starts_with("surface_") {
        return Some(DataType::Float32);
    }
    let column = FusedColumn::ALL.iter().find(|c| c.name() == name)?;
    match column {
        FusedColumn::CodePostal => Some(DataType::UInt32),
        FusedColumn::AdresseNumero => Some(DataType::UInt16),
        FusedColumn::JourMutation | FusedColumn::MoisMutation => Some(DataType::UInt8),
        FusedColumn::AnneeMutation => Some(DataType::UInt16),
        FusedColumn::CodeDepartement
        | FusedColumn::NatureMutation
        | FusedColumn::AdresseSuffixe
        | FusedColumn::NatureCulture
        | FusedColumn::NatureCultureSpeciale => Some(categorical()),
        _ => None,
    }
}

fn coerce(name: &str, arr: &ArrayRef, target: &DataType) -> Result<ArrayRef> {
    cast_with_options(arr, target, &strict_cast_options()).map_err(|source| {
        DvfError::TypeCoercion {
            column: name.to_string(),
            target: target.clone(),
            source,
        }
    })
}

/// Cast the fused table to its storage types.
///
/// Narrow integer casts are checked: a negative, too large or non-numeric
/// value fails instead of wrapping or turning into a null. Fractional values
/// are truncated toward zero.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn normalize_types(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, arr) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let Some(target) = target_type(name) else {
            fields.push(field.as_ref().clone());
            columns.push(arr.clone());
            continue;
        };

        let cast = if matches!(target, DataType::Dictionary(..)) {
            // codes such as "2A" or "01" must reach the dictionary as text
            let text = coerce(name, arr, &DataType::Utf8)?;
            coerce(name, &text, &target)?
        } else {
            coerce(name, arr, &target)?
        };
        debug!(column = %name, from = ?arr.data_type(), to = ?target, "normalized");
        fields.push(Field::new(name, target, field.is_nullable()));
        columns.push(cast);
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(RecordBatch::try_new(schema, columns)?)
}
