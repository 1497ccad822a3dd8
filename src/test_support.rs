//! Fixtures shared by unit tests: DVF-shaped CSV rows and typed property rows.

use anyhow::Result;
use arrow::record_batch::RecordBatch;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Once,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    load::csv::{read_csv, CsvTyping},
    process::rows::PropertyRow,
    schema::coerce_raw_types,
};

/// Column layout of the geolocated DVF export.
pub const DVF_HEADER: [&str; 40] = [
    "id_mutation",
    "date_mutation",
    "numero_disposition",
    "nature_mutation",
    "valeur_fonciere",
    "adresse_numero",
    "adresse_suffixe",
    "adresse_nom_voie",
    "adresse_code_voie",
    "code_postal",
    "code_commune",
    "nom_commune",
    "code_departement",
    "ancien_code_commune",
    "ancien_nom_commune",
    "id_parcelle",
    "ancien_id_parcelle",
    "numero_volume",
    "lot1_numero",
    "lot1_surface_carrez",
    "lot2_numero",
    "lot2_surface_carrez",
    "lot3_numero",
    "lot3_surface_carrez",
    "lot4_numero",
    "lot4_surface_carrez",
    "lot5_numero",
    "lot5_surface_carrez",
    "nombre_lots",
    "code_type_local",
    "type_local",
    "surface_reelle_bati",
    "nombre_pieces_principales",
    "code_nature_culture",
    "nature_culture",
    "code_nature_culture_speciale",
    "nature_culture_speciale",
    "surface_terrain",
    "longitude",
    "latitude",
];

static LOGGING: Once = Once::new();

pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,dvf_maintenance=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// One CSV line of a DVF export. Unset cells are empty (null).
#[derive(Debug, Clone)]
pub struct DvfRow {
    cells: BTreeMap<&'static str, String>,
}

impl DvfRow {
    /// A sold house with plausible defaults.
    pub fn new(id: &str) -> Self {
        let defaults = [
            ("id_mutation", id),
            ("date_mutation", "2021-01-05"),
            ("numero_disposition", "000001"),
            ("nature_mutation", "Vente"),
            ("valeur_fonciere", "185000"),
            ("adresse_numero", "12"),
            ("adresse_nom_voie", "RUE DES LILAS"),
            ("adresse_code_voie", "0420"),
            ("code_postal", "01000"),
            ("code_commune", "01053"),
            ("nom_commune", "Bourg-en-Bresse"),
            ("code_departement", "01"),
            ("id_parcelle", "01053000AB0012"),
            ("nombre_lots", "0"),
            ("code_type_local", "1"),
            ("type_local", "Maison"),
            ("surface_reelle_bati", "90"),
            ("nombre_pieces_principales", "4"),
            ("code_nature_culture", "S"),
            ("nature_culture", "sols"),
            ("surface_terrain", "300"),
            ("longitude", "5.2257"),
            ("latitude", "46.2052"),
        ];
        Self {
            cells: defaults
                .iter()
                .map(|(k, v)| (*k, v.to_string()))
                .collect(),
        }
    }

    pub fn set(mut self, column: &str, value: &str) -> Self {
        let key = DVF_HEADER
            .iter()
            .find(|c| **c == column)
            .unwrap_or_else(|| panic!("unknown DVF column {}", column));
        self.cells.insert(key, value.to_string());
        self
    }

    pub fn clear(mut self, column: &str) -> Self {
        self.cells.remove(column);
        self
    }

    pub fn kind(self, code: &str, label: &str) -> Self {
        self.set("code_type_local", code).set("type_local", label)
    }

    pub fn built(self, surface: &str) -> Self {
        self.set("surface_reelle_bati", surface)
    }

    fn line(&self) -> String {
        DVF_HEADER
            .iter()
            .map(|c| {
                let v = self.cells.get(c).map(String::as_str).unwrap_or("");
                if v.contains(',') {
                    format!("\"{}\"", v)
                } else {
                    v.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn dvf_csv(rows: &[DvfRow]) -> String {
    let mut out = DVF_HEADER.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.line());
        out.push('\n');
    }
    out
}

pub fn write_dvf_csv(dir: &Path, name: &str, rows: &[DvfRow]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, dvf_csv(rows))?;
    Ok(path)
}

/// Rows as the loader hands them to the sanitizer.
pub fn raw_batch(rows: &[DvfRow]) -> Result<RecordBatch> {
    let dir = tempfile::tempdir()?;
    let path = write_dvf_csv(dir.path(), "dvf.csv", rows)?;
    let batch = read_csv(&path, CsvTyping::Text, 1024)?;
    Ok(coerce_raw_types(&batch)?)
}

/// A sanitized property row of the given kind and built surface.
pub fn property(id: &str, code_type_local: f64, surface_reelle_bati: f64) -> PropertyRow {
    PropertyRow {
        id_mutation: Some(id.to_string()),
        date_mutation: Some("2021-01-05".to_string()),
        nature_mutation: Some("Vente".to_string()),
        valeur_fonciere: 185_000.0,
        adresse_numero: 12.0,
        adresse_suffixe: "<EMPTY>".to_string(),
        adresse_nom_voie: "RUE DES LILAS".to_string(),
        adresse_code_voie: "0420".to_string(),
        code_postal: 1000.0,
        nom_commune: Some("Bourg-en-Bresse".to_string()),
        code_departement: Some("01".to_string()),
        id_parcelle: Some("01053000AB0012".to_string()),
        carrez: [0.0; 5],
        nombre_lots: Some(0.0),
        code_type_local,
        surface_reelle_bati,
        surface_terrain: 0.0,
        nombre_pieces_principales: 0.0,
        nature_culture: "<EMPTY>".to_string(),
        nature_culture_speciale: "<EMPTY>".to_string(),
        longitude: 5.2257,
        latitude: 46.2052,
    }
}
