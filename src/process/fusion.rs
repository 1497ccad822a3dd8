// src/process/fusion.rs

//! Collapse the property lines of one mutation into a single record.
//!
//! The *principal* property (the one whose address, parcel and coordinates
//! represent the sale) is the row with the highest rank key
//! `(kind priority, surface_reelle_bati)`, the first such row on ties. Houses
//! outrank apartments, apartments outrank everything else, and surface only
//! breaks ties inside a kind.

use super::{
    group::MutationGroup,
    rows::{PropertyKind, PropertyRow},
};
use crate::{
    error::{DvfError, Result},
    schema::{FusedColumn, RawKind},
};

const DATE_SEPARATOR: char = '-';

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceTotals {
    pub carrez: f64,
    pub reelle_bati: f64,
    pub terrain: f64,
}

impl SurfaceTotals {
    fn add(&mut self, row: &PropertyRow) {
        self.carrez += row.carrez_total();
        self.reelle_bati += row.surface_reelle_bati;
        self.terrain += row.surface_terrain;
    }
}

/// Count and surfaces of the rows of one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindAggregate {
    pub count: u64,
    pub surfaces: SurfaceTotals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedRecord {
    pub id_mutation: String,
    pub jour_mutation: Option<String>,
    pub mois_mutation: Option<String>,
    pub annee_mutation: Option<String>,
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
    pub totals: SurfaceTotals,
    pub nombre_lots: f64,
    pub maisons: KindAggregate,
    pub appartements: KindAggregate,
    pub dependances: KindAggregate,
    pub nombre_pieces_principales: f64,
    pub nature_culture: String,
    pub nature_culture_speciale: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// A single value of a fused record, typed by its column's [`RawKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(Option<&'a str>),
    Float(f64),
    Count(u64),
}

impl<'a> Cell<'a> {
    pub fn kind(&self) -> RawKind {
        match self {
            Cell::Text(_) => RawKind::Text,
            Cell::Float(_) => RawKind::Float,
            Cell::Count(_) => RawKind::Count,
        }
    }

    pub fn text(self) -> Option<&'a str> {
        match self {
            Cell::Text(t) => t,
            _ => None,
        }
    }

    pub fn float(self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn count(self) -> Option<u64> {
        match self {
            Cell::Count(c) => Some(c),
            _ => None,
        }
    }
}

impl FusedRecord {
    pub fn cell(&self, column: FusedColumn) -> Cell<'_> {
        use FusedColumn as C;
        fn text(s: &Option<String>) -> Cell<'_> {
            Cell::Text(s.as_deref())
        }
        match column {
            C::IdMutation => Cell::Text(Some(&self.id_mutation)),
            C::JourMutation => text(&self.jour_mutation),
            C::MoisMutation => text(&self.mois_mutation),
            C::AnneeMutation => text(&self.annee_mutation),
            C::NatureMutation => text(&self.nature_mutation),
            C::ValeurFonciere => Cell::Float(self.valeur_fonciere),
            C::AdresseNumero => Cell::Float(self.adresse_numero),
            C::AdresseSuffixe => Cell::Text(Some(&self.adresse_suffixe)),
            C::AdresseNomVoie => Cell::Text(Some(&self.adresse_nom_voie)),
            C::AdresseCodeVoie => Cell::Text(Some(&self.adresse_code_voie)),
            C::CodePostal => Cell::Float(self.code_postal),
            C::NomCommune => text(&self.nom_commune),
            C::CodeDepartement => text(&self.code_departement),
            C::IdParcelle => text(&self.id_parcelle),
            C::SurfaceCarrezTotal => Cell::Float(self.totals.carrez),
            C::SurfaceReelleBatiTotal => Cell::Float(self.totals.reelle_bati),
            C::SurfaceTerrainTotal => Cell::Float(self.totals.terrain),
            C::NombreLots => Cell::Float(self.nombre_lots),
            C::NombreMaisons => Cell::Count(self.maisons.count),
            C::SurfaceCarrezMaisons => Cell::Float(self.maisons.surfaces.carrez),
            C::SurfaceReelleBatiMaisons => Cell::Float(self.maisons.surfaces.reelle_bati),
            C::SurfaceTerrainMaisons => Cell::Float(self.maisons.surfaces.terrain),
            C::NombreAppartements => Cell::Count(self.appartements.count),
            C::SurfaceCarrezAppartements => Cell::Float(self.appartements.surfaces.carrez),
            C::SurfaceReelleBatiAppartements => {
                Cell::Float(self.appartements.surfaces.reelle_bati)
            }
            C::SurfaceTerrainAppartements => Cell::Float(self.appartements.surfaces.terrain),
            C::NombreDependances => Cell::Count(self.dependances.count),
            C::SurfaceCarrezDependances => Cell::Float(self.dependances.surfaces.carrez),
            C::SurfaceReelleBatiDependances => Cell::Float(self.dependances.surfaces.reelle_bati),
            C::SurfaceTerrainDependances => Cell::Float(self.dependances.surfaces.terrain),
            C::NombrePiecesPrincipales => Cell::Float(self.nombre_pieces_principales),
            C::NatureCulture => Cell::Text(Some(&self.nature_culture)),
            C::NatureCultureSpeciale => Cell::Text(Some(&self.nature_culture_speciale)),
            C::Longitude => Cell::Float(self.longitude),
            C::Latitude => Cell::Float(self.latitude),
        }
    }
}

/// Rank of a row in principal selection; higher wins.
fn rank_key(row: &PropertyRow) -> (u8, f64) {
    (row.kind().priority(), row.surface_reelle_bati)
}

/// Index of the principal property, `None` for an empty slice.
pub fn select_principal(rows: &[PropertyRow]) -> Option<usize> {
    let mut best: Option<(usize, (u8, f64))> = None;
    for (idx, row) in rows.iter().enumerate() {
        let key = rank_key(row);
        // strict comparison keeps the first of equal keys
        let better = match best {
            None => true,
            Some((_, (prio, surface))) => key.0 > prio || (key.0 == prio && key.1 > surface),
        };
        if better {
            best = Some((idx, key));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Count and surfaces over the rows of `kind`.
pub fn aggregate_kind(rows: &[PropertyRow], kind: PropertyKind) -> KindAggregate {
    rows.iter()
        .filter(|r| r.kind() == kind)
        .fold(KindAggregate::default(), |mut acc, r| {
            acc.count += 1;
            acc.surfaces.add(r);
            acc
        })
}

/// `YYYY-MM-DD` → `(year, month, day)`, without calendar checks.
fn split_date(date: Option<&str>) -> [Option<String>; 3] {
    let parts: Vec<&str> = date
        .map(|d| d.split(DATE_SEPARATOR).collect())
        .unwrap_or_default();
    std::array::from_fn(|i| parts.get(i).map(|p| p.to_string()))
}

/// Fuse one mutation into its output record.
pub fn fuse_group(group: &MutationGroup) -> Result<FusedRecord> {
    let rows = group.rows.as_slice();
    let principal = select_principal(rows)
        .map(|idx| &rows[idx])
        .ok_or_else(|| DvfError::MalformedGroup(group.id.clone()))?;

    let [annee, mois, jour] = split_date(principal.date_mutation.as_deref());

    let mut totals = SurfaceTotals::default();
    for row in rows {
        totals.add(row);
    }
    let [maisons, appartements, dependances] =
        PropertyKind::BUCKETS.map(|kind| aggregate_kind(rows, kind));

    Ok(FusedRecord {
        id_mutation: principal
            .id_mutation
            .clone()
            .unwrap_or_else(|| group.id.clone()),
        jour_mutation: jour,
        mois_mutation: mois,
        annee_mutation: annee,
        nature_mutation: principal.nature_mutation.clone(),
        valeur_fonciere: principal.valeur_fonciere,
        adresse_numero: principal.adresse_numero,
        adresse_suffixe: principal.adresse_suffixe.clone(),
        adresse_nom_voie: principal.adresse_nom_voie.clone(),
        adresse_code_voie: principal.adresse_code_voie.clone(),
        code_postal: principal.code_postal,
        nom_commune: principal.nom_commune.clone(),
        code_departement: principal.code_departement.clone(),
        id_parcelle: principal.id_parcelle.clone(),
        totals,
        nombre_lots: rows.iter().filter_map(|r| r.nombre_lots).sum(),
        maisons,
        appartements,
        dependances,
        nombre_pieces_principales: rows.iter().map(|r| r.nombre_pieces_principales).sum(),
        nature_culture: principal.nature_culture.clone(),
        nature_culture_speciale: principal.nature_culture_speciale.clone(),
        longitude: principal.longitude,
        latitude: principal.latitude,
    })
}
