// src/schema/fused.rs

//! The one-row-per-mutation output layout.
//!
//! [`FusedColumn::ALL`] is the only place the output order is written down:
//! the fusion engine fills records against it, the parallel driver builds the
//! fused table from it and the type normalizer walks it.

use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow type of a fused column before type normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Text,
    Float,
    Count,
}

impl RawKind {
    pub fn data_type(self) -> DataType {
        match self {
            RawKind::Text => DataType::Utf8,
            RawKind::Float => DataType::Float64,
            RawKind::Count => DataType::UInt64,
        }
    }
}

macro_rules! fused_columns {
    ($( $variant:ident => $name:literal : $kind:ident ),+ $(,)?) => {
        /// One column of the fused table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FusedColumn {
            $( $variant ),+
        }

        impl FusedColumn {
            /// Every output column, in output order.
            pub const ALL: &'static [FusedColumn] = &[$( FusedColumn::$variant ),+];

            pub fn name(self) -> &'static str {
                match self {
                    $( FusedColumn::$variant => $name ),+
                }
            }

            pub fn raw_kind(self) -> RawKind {
                match self {
                    $( FusedColumn::$variant => RawKind::$kind ),+
                }
            }
        }
    };
}

fused_columns! {
    IdMutation => "id_mutation": Text,
    JourMutation => "jour_mutation": Text,
    MoisMutation => "mois_mutation": Text,
    AnneeMutation => "annee_mutation": Text,
    NatureMutation => "nature_mutation": Text,
    ValeurFonciere => "valeur_fonciere": Float,
    AdresseNumero => "adresse_numero": Float,
    AdresseSuffixe => "adresse_suffixe": Text,
    AdresseNomVoie => "adresse_nom_voie": Text,
    AdresseCodeVoie => "adresse_code_voie": Text,
    CodePostal => "code_postal": Float,
    NomCommune => "nom_commune": Text,
    CodeDepartement => "code_departement": Text,
    IdParcelle => "id_parcelle": Text,
    SurfaceCarrezTotal => "surface_carrez_total": Float,
    SurfaceReelleBatiTotal => "surface_reelle_bati_total": Float,
    SurfaceTerrainTotal => "surface_terrain_total": Float,
    NombreLots => "nombre_lots": Float,
    NombreMaisons => "nombre_maisons": Count,
    SurfaceCarrezMaisons => "surface_carrez_maisons": Float,
    SurfaceReelleBatiMaisons => "surface_reelle_bati_maisons": Float,
    SurfaceTerrainMaisons => "surface_terrain_maisons": Float,
    NombreAppartements => "nombre_appartements": Count,
    SurfaceCarrezAppartements => "surface_carrez_appartements": Float,
    SurfaceReelleBatiAppartements => "surface_reelle_bati_appartements": Float,
    SurfaceTerrainAppartements => "surface_terrain_appartements": Float,
    NombreDependances => "nombre_dependances": Count,
    SurfaceCarrezDependances => "surface_carrez_dependances": Float,
    SurfaceReelleBatiDependances => "surface_reelle_bati_dependances": Float,
    SurfaceTerrainDependances => "surface_terrain_dependances": Float,
    NombrePiecesPrincipales => "nombre_pieces_principales": Float,
    NatureCulture => "nature_culture": Text,
    NatureCultureSpeciale => "nature_culture_speciale": Text,
    Longitude => "longitude": Float,
    Latitude => "latitude": Float,
}

/// Column used as the table index.
pub const INDEX_COLUMN: FusedColumn = FusedColumn::IdMutation;

/// Schema of the fused table as the driver assembles it.
pub fn fused_schema() -> Arc<Schema> {
    let fields: Vec<Field> = FusedColumn::ALL
        .iter()
        .map(|c| Field::new(c.name(), c.raw_kind().data_type(), *c != INDEX_COLUMN))
        .collect();
    Arc::new(Schema::new(fields))
}

pub fn column_names() -> Vec<&'static str> {
    FusedColumn::ALL.iter().map(|c| c.name()).collect()
}
