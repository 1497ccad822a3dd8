// src/schema/arrow.rs

use arrow::{
    array::ArrayRef,
    compute::{can_cast_types, cast_with_options, CastOptions},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::columns::is_numeric_column;
use crate::error::{DvfError, Result};

/// Map a raw DVF column name to the Arrow type the cleaning stages expect.
///
/// - numeric DVF fields (surfaces, values, coordinates, counts) → Float64
/// - everything else (ids, labels, dates, lot numbers, codes)  → Utf8
pub fn raw_arrow_type(name: &str) -> DataType {
    if is_numeric_column(name) {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Cast options that refuse to silently null out a value.
pub fn strict_cast_options() -> CastOptions<'static> {
    CastOptions {
        safe: false,
        ..Default::default()
    }
}

/// Canonicalise a freshly loaded table so every known column carries its
/// [`raw_arrow_type`], whatever the source format produced.
///
/// Columns that Arrow cannot cast to their target type are kept as they are;
/// a present value that does not parse fails the whole table.
pub fn coerce_raw_types(batch: &RecordBatch) -> Result<RecordBatch> {
    let options = strict_cast_options();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, arr) in batch.schema().fields().iter().zip(batch.columns()) {
        let target = raw_arrow_type(field.name());
        if arr.data_type() == &target || !can_cast_types(arr.data_type(), &target) {
            if arr.data_type() != &target {
                debug!(column = %field.name(), from = ?arr.data_type(), "left uncast");
            }
            fields.push(field.as_ref().clone());
            columns.push(arr.clone());
            continue;
        }

        let cast = cast_with_options(arr, &target, &options).map_err(|source| {
            DvfError::TypeCoercion {
                column: field.name().clone(),
                target: target.clone(),
                source,
            }
        })?;
        debug!(column = %field.name(), from = ?arr.data_type(), to = ?target, "coerced");
        fields.push(Field::new(field.name(), target, true));
        columns.push(cast);
    }

    let schema = Arc::new(Schema::new_with_metadata(
        fields,
        batch.schema().metadata().clone(),
    ));
    Ok(RecordBatch::try_new(schema, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, Int64Array, StringArray};

    fn batch(cols: Vec<(&str, ArrayRef)>) -> RecordBatch {
        RecordBatch::try_from_iter(cols).unwrap()
    }

    #[test]
    fn text_numbers_become_floats() -> anyhow::Result<()> {
        let input = batch(vec![
            (
                "surface_reelle_bati",
                Arc::new(StringArray::from(vec![Some("90"), None, Some("12.5")])) as ArrayRef,
            ),
            (
                "code_departement",
                Arc::new(StringArray::from(vec![Some("01"), Some("2A"), None])) as ArrayRef,
            ),
        ]);

        let out = coerce_raw_types(&input)?;
        let surf = out
            .column(0)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(surf.value(0), 90.0);
        assert!(surf.is_null(1));
        assert_eq!(surf.value(2), 12.5);

        let dep = out.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(dep.value(0), "01");
        assert_eq!(dep.value(1), "2A");
        Ok(())
    }

    #[test]
    fn integer_codes_become_text() -> anyhow::Result<()> {
        let input = batch(vec![(
            "code_commune",
            Arc::new(Int64Array::from(vec![1053, 75056])) as ArrayRef,
        )]);
        let out = coerce_raw_types(&input)?;
        assert_eq!(out.schema().field(0).data_type(), &DataType::Utf8);
        let codes = out.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(codes.value(1), "75056");
        Ok(())
    }

    #[test]
    fn lot_and_volume_numbers_are_not_parsed() -> anyhow::Result<()> {
        let input = batch(vec![
            (
                "numero_volume",
                Arc::new(StringArray::from(vec![Some("A1"), None])) as ArrayRef,
            ),
            (
                "lot1_numero",
                Arc::new(StringArray::from(vec![Some("12B"), Some("3")])) as ArrayRef,
            ),
        ]);
        let out = coerce_raw_types(&input)?;
        let volume = out.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(volume.value(0), "A1");
        let lot = out.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(lot.value(0), "12B");
        Ok(())
    }

    #[test]
    fn unparsable_number_is_reported() {
        let input = batch(vec![(
            "valeur_fonciere",
            Arc::new(StringArray::from(vec!["12000", "douze"])) as ArrayRef,
        )]);
        let err = coerce_raw_types(&input).unwrap_err();
        assert!(
            matches!(err, DvfError::TypeCoercion { ref column, .. } if column == "valeur_fonciere")
        );
    }
}
