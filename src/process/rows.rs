// src/process/rows.rs

use arrow::{
    array::{Array, Float64Array, StringArray},
    datatypes::DataType,
    record_batch::RecordBatch,
};

use crate::{
    error::{DvfError, Result},
    schema::columns::*,
};

/// Kind of property, from `code_type_local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    House,
    Apartment,
    Dependency,
    Other,
}

impl PropertyKind {
    pub const BUCKETS: [PropertyKind; 3] = [
        PropertyKind::House,
        PropertyKind::Apartment,
        PropertyKind::Dependency,
    ];

    pub fn from_code(code: f64) -> Self {
        if code == 1.0 {
            PropertyKind::House
        } else if code == 2.0 {
            PropertyKind::Apartment
        } else if code == DEPENDANCE_CODE {
            PropertyKind::Dependency
        } else {
            PropertyKind::Other
        }
    }

    /// Principal-selection priority: houses, then apartments, then the rest.
    pub fn priority(self) -> u8 {
        match self {
            PropertyKind::House => 2,
            PropertyKind::Apartment => 1,
            PropertyKind::Dependency | PropertyKind::Other => 0,
        }
    }
}

/// One sanitized line of the source: a single property of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    pub id_mutation: Option<String>,
    pub date_mutation: Option<String>,
    pub nature_mutation: Option<String>,
    pub valeur_fonciere: f64,
    pub adresse_numero: f64,
    pub adresse_suffixe: String,
    pub adresse_nom_voie: String,
    pub adresse_code_voie: String,
    pub code_postal: f64,
    pub nom_commune: Option<String>,
    pub code_departement: Option<String>,
    pub id_parcelle: Option<String>,
    /// `lot1_surface_carrez` .. `lot5_surface_carrez`.
    pub carrez: [f64; 5],
    pub nombre_lots: Option<f64>,
    pub code_type_local: f64,
    pub surface_reelle_bati: f64,
    pub surface_terrain: f64,
    pub nombre_pieces_principales: f64,
    pub nature_culture: String,
    pub nature_culture_speciale: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl PropertyRow {
    pub fn kind(&self) -> PropertyKind {
        PropertyKind::from_code(self.code_type_local)
    }

    pub fn carrez_total(&self) -> f64 {
        self.carrez.iter().sum()
    }
}

pub(crate) fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DvfError::MissingColumn(name.to_string()))?;
    let col = batch.column(idx);
    col.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DvfError::UnexpectedColumnType {
            column: name.to_string(),
            expected: DataType::Utf8,
            found: col.data_type().clone(),
        })
}

pub(crate) fn number_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DvfError::MissingColumn(name.to_string()))?;
    let col = batch.column(idx);
    col.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| DvfError::UnexpectedColumnType {
            column: name.to_string(),
            expected: DataType::Float64,
            found: col.data_type().clone(),
        })
}

fn opt_text(arr: &StringArray, i: usize) -> Option<String> {
    arr.is_valid(i).then(|| arr.value(i).to_string())
}

fn opt_number(arr: &Float64Array, i: usize) -> Option<f64> {
    arr.is_valid(i).then(|| arr.value(i))
}

/// Materialise the rows of a sanitized table.
///
/// Filled columns are read as-is; a null left in one of them reads as the
/// column's zero value.
pub fn rows_from_batch(batch: &RecordBatch) -> Result<Vec<PropertyRow>> {
    let id = text_column(batch, ID_MUTATION)?;
    let date = text_column(batch, DATE_MUTATION)?;
    let nature = text_column(batch, NATURE_MUTATION)?;
    let valeur = number_column(batch, VALEUR_FONCIERE)?;
    let numero = number_column(batch, ADRESSE_NUMERO)?;
    let suffixe = text_column(batch, ADRESSE_SUFFIXE)?;
    let nom_voie = text_column(batch, ADRESSE_NOM_VOIE)?;
    let code_voie = text_column(batch, ADRESSE_CODE_VOIE)?;
    let code_postal = number_column(batch, CODE_POSTAL)?;
    let commune = text_column(batch, NOM_COMMUNE)?;
    let departement = text_column(batch, CODE_DEPARTEMENT)?;
    let parcelle = text_column(batch, ID_PARCELLE)?;
    let carrez = CARREZ_COLUMNS
        .iter()
        .map(|c| number_column(batch, c))
        .collect::<Result<Vec<_>>>()?;
    let lots = number_column(batch, NOMBRE_LOTS)?;
    let code_type = number_column(batch, CODE_TYPE_LOCAL)?;
    let bati = number_column(batch, SURFACE_REELLE_BATI)?;
    let terrain = number_column(batch, SURFACE_TERRAIN)?;
    let pieces = number_column(batch, NOMBRE_PIECES_PRINCIPALES)?;
    let culture = text_column(batch, NATURE_CULTURE)?;
    let culture_speciale = text_column(batch, NATURE_CULTURE_SPECIALE)?;
    let longitude = number_column(batch, LONGITUDE)?;
    let latitude = number_column(batch, LATITUDE)?;

    let rows = (0..batch.num_rows())
        .map(|i| PropertyRow {
            id_mutation: opt_text(id, i),
            date_mutation: opt_text(date, i),
            nature_mutation: opt_text(nature, i),
            valeur_fonciere: valeur.value(i),
            adresse_numero: numero.value(i),
            adresse_suffixe: suffixe.value(i).to_string(),
            adresse_nom_voie: nom_voie.value(i).to_string(),
            adresse_code_voie: code_voie.value(i).to_string(),
            code_postal: code_postal.value(i),
            nom_commune: opt_text(commune, i),
            code_departement: opt_text(departement, i),
            id_parcelle: opt_text(parcelle, i),
            carrez: std::array::from_fn(|k| carrez[k].value(i)),
            nombre_lots: opt_number(lots, i),
            code_type_local: code_type.value(i),
            surface_reelle_bati: bati.value(i),
            surface_terrain: terrain.value(i),
            nombre_pieces_principales: pieces.value(i),
            nature_culture: culture.value(i).to_string(),
            nature_culture_speciale: culture_speciale.value(i).to_string(),
            longitude: longitude.value(i),
            latitude: latitude.value(i),
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        process::sanitize::sanitize,
        test_support::{raw_batch, DvfRow},
    };

    #[test]
    fn kinds_from_codes() {
        assert_eq!(PropertyKind::from_code(1.0), PropertyKind::House);
        assert_eq!(PropertyKind::from_code(2.0), PropertyKind::Apartment);
        assert_eq!(PropertyKind::from_code(3.0), PropertyKind::Dependency);
        assert_eq!(PropertyKind::from_code(4.0), PropertyKind::Other);
        assert!(PropertyKind::House.priority() > PropertyKind::Apartment.priority());
        assert!(PropertyKind::Apartment.priority() > PropertyKind::Dependency.priority());
    }

    #[test]
    fn reads_sanitized_rows() -> anyhow::Result<()> {
        let raw = raw_batch(&[
            DvfRow::new("2021-1")
                .kind("2", "Appartement")
                .set("lot1_surface_carrez", "40.5")
                .set("lot2_surface_carrez", "9.5"),
            DvfRow::new("2021-1").clear("nom_commune").clear("nombre_lots"),
        ])?;
        let clean = sanitize(&raw)?;
        let rows = rows_from_batch(&clean.batch)?;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind(), PropertyKind::Apartment);
        assert_eq!(rows[0].carrez_total(), 50.0);
        assert_eq!(rows[0].code_departement.as_deref(), Some("01"));
        assert_eq!(rows[0].adresse_suffixe, "<EMPTY>");
        assert_eq!(rows[1].nom_commune, None);
        assert_eq!(rows[1].nombre_lots, None);
        Ok(())
    }

    #[test]
    fn missing_column_is_named() -> anyhow::Result<()> {
        let raw = raw_batch(&[DvfRow::new("2021-1")])?;
        let idx = raw.schema().index_of("latitude")?;
        let mut trimmed = raw.clone();
        trimmed.remove_column(idx);

        let err = rows_from_batch(&trimmed).unwrap_err();
        assert!(matches!(err, DvfError::MissingColumn(ref c) if c == "latitude"));
        Ok(())
    }
}
