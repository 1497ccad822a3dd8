// src/schema/columns.rs

//! Column names of the raw DVF export.

pub const ID_MUTATION: &str = "id_mutation";
pub const DATE_MUTATION: &str = "date_mutation";
pub const NATURE_MUTATION: &str = "nature_mutation";
pub const VALEUR_FONCIERE: &str = "valeur_fonciere";
pub const ADRESSE_NUMERO: &str = "adresse_numero";
pub const ADRESSE_SUFFIXE: &str = "adresse_suffixe";
pub const ADRESSE_NOM_VOIE: &str = "adresse_nom_voie";
pub const ADRESSE_CODE_VOIE: &str = "adresse_code_voie";
pub const CODE_POSTAL: &str = "code_postal";
pub const NOM_COMMUNE: &str = "nom_commune";
pub const CODE_DEPARTEMENT: &str = "code_departement";
pub const ID_PARCELLE: &str = "id_parcelle";
pub const NUMERO_VOLUME: &str = "numero_volume";
pub const NOMBRE_LOTS: &str = "nombre_lots";
pub const CODE_TYPE_LOCAL: &str = "code_type_local";
pub const TYPE_LOCAL: &str = "type_local";
pub const SURFACE_REELLE_BATI: &str = "surface_reelle_bati";
pub const NOMBRE_PIECES_PRINCIPALES: &str = "nombre_pieces_principales";
pub const CODE_NATURE_CULTURE: &str = "code_nature_culture";
pub const NATURE_CULTURE: &str = "nature_culture";
pub const CODE_NATURE_CULTURE_SPECIALE: &str = "code_nature_culture_speciale";
pub const NATURE_CULTURE_SPECIALE: &str = "nature_culture_speciale";
pub const SURFACE_TERRAIN: &str = "surface_terrain";
pub const LONGITUDE: &str = "longitude";
pub const LATITUDE: &str = "latitude";

/// Renamed-commune artifacts, never used downstream.
pub const LEGACY_COLUMNS: [&str; 3] = [
    "ancien_code_commune",
    "ancien_nom_commune",
    "ancien_id_parcelle",
];

pub const CARREZ_COLUMNS: [&str; 5] = [
    "lot1_surface_carrez",
    "lot2_surface_carrez",
    "lot3_surface_carrez",
    "lot4_surface_carrez",
    "lot5_surface_carrez",
];

pub const LOT_NUMBER_COLUMNS: [&str; 5] = [
    "lot1_numero",
    "lot2_numero",
    "lot3_numero",
    "lot4_numero",
    "lot5_numero",
];

/// Numeric columns defaulted to `0` when a value is missing.
pub const ZERO_FILLED: [&str; 13] = [
    VALEUR_FONCIERE,
    NOMBRE_PIECES_PRINCIPALES,
    SURFACE_REELLE_BATI,
    SURFACE_TERRAIN,
    CARREZ_COLUMNS[0],
    CARREZ_COLUMNS[1],
    CARREZ_COLUMNS[2],
    CARREZ_COLUMNS[3],
    CARREZ_COLUMNS[4],
    ADRESSE_NUMERO,
    CODE_POSTAL,
    LONGITUDE,
    LATITUDE,
];

/// Lot and volume identifiers: defaulted to `"0"` but kept as text, since
/// exports carry values such as `12B`.
pub const ZERO_TEXT_FILLED: [&str; 6] = [
    LOT_NUMBER_COLUMNS[0],
    LOT_NUMBER_COLUMNS[1],
    LOT_NUMBER_COLUMNS[2],
    LOT_NUMBER_COLUMNS[3],
    LOT_NUMBER_COLUMNS[4],
    NUMERO_VOLUME,
];

/// Text columns defaulted to [`EMPTY_MARKER`] when a value is missing.
pub const EMPTY_FILLED: [&str; 7] = [
    ADRESSE_NOM_VOIE,
    ADRESSE_CODE_VOIE,
    CODE_NATURE_CULTURE,
    ADRESSE_SUFFIXE,
    NATURE_CULTURE,
    CODE_NATURE_CULTURE_SPECIALE,
    NATURE_CULTURE_SPECIALE,
];

pub const EMPTY_MARKER: &str = "<EMPTY>";

/// Label written into `type_local` when it is missing.
pub const DEPENDANCE_LABEL: &str = "Dépendance";

/// `code_type_local` of business premises.
pub const COMMERCIAL_CODE: f64 = 4.0;
/// `code_type_local` assumed when it is missing.
pub const DEPENDANCE_CODE: f64 = 3.0;

/// Columns read as `Float64` after raw coercion.
pub fn is_numeric_column(name: &str) -> bool {
    name == CODE_TYPE_LOCAL || name == NOMBRE_LOTS || ZERO_FILLED.contains(&name)
}
