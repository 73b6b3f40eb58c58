//! Persistence codec.
//!
//! The whole entity graph is written as one JSON document with four
//! top-level sections (tours, cities, museum visits, members). Each
//! record carries the entity's scalar fields plus its reference lists as
//! plain identifier arrays; the object graph is reconstructed on load by
//! replaying those references through the same association operations
//! live mutation uses, so a loaded store satisfies exactly the same
//! invariants as one built by hand.
//!
//! A companion JSON Schema (generated from the record types, see
//! [`schema`]) constrains the document shape. Both [`JsonCodec::save`]
//! and [`JsonCodec::load`] validate against it: a failure on load means
//! the file is corrupt, a failure on save means the codec itself is
//! buggy.

mod schema;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{
    City, Member, ModelError, MuseumVisit, Tour, DEFAULT_INCLUDED_VISITS,
};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine a data directory for this platform")]
    NoDataDir,

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("schema file is not a usable JSON Schema: {0}")]
    BadSchema(String),

    #[error("corrupt data file: {0}")]
    CorruptData(String),

    #[error("saved document does not conform to its own schema: {0}")]
    SchemaViolation(String),

    #[error("invalid record in document: {0}")]
    InvalidRecord(#[from] ModelError),

    #[error("conflicting records in document: {0}")]
    ConflictingRecords(#[from] StoreError),
}

// ============================================================
// Document records
// ============================================================

/// The persisted form of the whole store. Sections are ordered so that a
/// reader encounters entities before the records that reference them.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TourDocument {
    pub tours: Vec<TourRecord>,
    pub cities: Vec<CityRecord>,
    pub museum_visits: Vec<VisitRecord>,
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TourRecord {
    pub id: String,
    pub name: String,
    /// City ids on the itinerary. Authoritative for tour→city links.
    pub cities: Vec<String>,
    /// Member ids, mirroring each member's `tour` field.
    pub members: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CityRecord {
    pub id: String,
    pub name: String,
    /// Visit ids hosted here. Authoritative for city↔visit links.
    pub museum_visits: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VisitRecord {
    pub id: String,
    pub museum_name: String,
    pub visit_date: NaiveDate,
    /// Exact decimal, serialized as a string (e.g. `"12.50"`).
    #[schemars(with = "String")]
    pub cost: Decimal,
    /// Hosting city id, mirroring that city's visit list. `None` for an
    /// orphaned visit.
    pub city: Option<String>,
    /// Registered member ids. Authoritative for visit↔member links.
    pub registered_members: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MemberRecord {
    pub id: String,
    pub name: String,
    pub booking_number: String,
    /// Assigned tour id. Authoritative for tour↔member links.
    pub tour: Option<String>,
    /// Registered visit ids, mirroring each visit's roster.
    pub museum_visits: Vec<String>,
    #[serde(default = "default_included_visits")]
    pub included_visits: u32,
}

fn default_included_visits() -> u32 {
    DEFAULT_INCLUDED_VISITS
}

// ============================================================
// Codec
// ============================================================

/// Serializes the store to a schema-validated JSON file and back.
pub struct JsonCodec {
    data_path: PathBuf,
    schema_path: PathBuf,
}

impl JsonCodec {
    /// Create a codec for the given paths. Parent directories are
    /// created, and the schema file is generated if it does not exist.
    pub fn new(data_path: impl Into<PathBuf>, schema_path: impl Into<PathBuf>) -> Result<Self, CodecError> {
        let data_path = data_path.into();
        let schema_path = schema_path.into();
        ensure_parent_dir(&data_path)?;
        ensure_parent_dir(&schema_path)?;
        schema::ensure_schema_file(&schema_path)?;
        Ok(Self {
            data_path,
            schema_path,
        })
    }

    /// Codec using the platform's canonical data directory.
    pub fn with_default_paths() -> Result<Self, CodecError> {
        let dirs = directories::ProjectDirs::from("", "", "museum-tours")
            .ok_or(CodecError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        Self::new(data_dir.join("tours.json"), data_dir.join("tours.schema.json"))
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Serialize the full store, check the result against the schema and
    /// overwrite the data file.
    ///
    /// A schema failure here is a bug in this codec, not a user error:
    /// the save is aborted and nothing is written.
    pub fn save(&self, store: &Store) -> Result<(), CodecError> {
        let document = TourDocument::from_store(store);
        let value = serde_json::to_value(&document)?;

        let validator = schema::compile(&self.read_schema()?)?;
        if let Some(errors) = schema::violations(&validator, &value) {
            return Err(CodecError::SchemaViolation(errors));
        }

        let text = serde_json::to_string_pretty(&value)?;
        fs::write(&self.data_path, text).map_err(|source| CodecError::Io {
            path: self.data_path.clone(),
            source,
        })?;
        debug!(path = %self.data_path.display(), "saved tour document");
        Ok(())
    }

    /// Validate and load the data file, reconstructing the full graph.
    ///
    /// Returns `Ok(None)` when the file does not exist yet (first run);
    /// any other failure is fatal for the load: a caller must not fall
    /// back to an empty store when the file is present but corrupt.
    pub fn load(&self) -> Result<Option<Store>, CodecError> {
        if !self.data_path.exists() {
            debug!(path = %self.data_path.display(), "no data file, starting empty");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.data_path).map_err(|source| CodecError::Io {
            path: self.data_path.clone(),
            source,
        })?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;

        let validator = schema::compile(&self.read_schema()?)?;
        if let Some(errors) = schema::violations(&validator, &value) {
            return Err(CodecError::CorruptData(errors));
        }

        let document: TourDocument = serde_json::from_value(value)?;
        let store = document.into_store()?;
        info!(
            path = %self.data_path.display(),
            tours = store.tours().count(),
            cities = store.cities().count(),
            visits = store.visits().count(),
            members = store.members().count(),
            "loaded tour document"
        );
        Ok(Some(store))
    }

    fn read_schema(&self) -> Result<serde_json::Value, CodecError> {
        let raw = fs::read_to_string(&self.schema_path).map_err(|source| CodecError::Io {
            path: self.schema_path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), CodecError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CodecError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

// ============================================================
// Store <-> document conversion
// ============================================================

impl TourDocument {
    fn from_store(store: &Store) -> Self {
        Self {
            tours: store
                .tours()
                .map(|t| TourRecord {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    cities: t.cities().to_vec(),
                    members: t.members().to_vec(),
                })
                .collect(),
            cities: store
                .cities()
                .map(|c| CityRecord {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    museum_visits: c.visits().to_vec(),
                })
                .collect(),
            museum_visits: store
                .visits()
                .map(|v| VisitRecord {
                    id: v.id.clone(),
                    museum_name: v.museum_name.clone(),
                    visit_date: v.visit_date,
                    cost: v.cost,
                    city: v.city().map(String::from),
                    registered_members: v.registered_members().to_vec(),
                })
                .collect(),
            members: store
                .members()
                .map(|m| MemberRecord {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    booking_number: m.booking_number.clone(),
                    tour: m.tour().map(String::from),
                    museum_visits: m.registered_visits().to_vec(),
                    included_visits: m.included_visits,
                })
                .collect(),
        }
    }

    /// Rebuild a store from the document.
    ///
    /// Two phases: first every entity is constructed from its scalar
    /// fields alone, in dependency order; then the reference lists are
    /// replayed through the live association operations. A reference
    /// that dangles or would violate an invariant (e.g. a registration
    /// whose tour no longer includes the visit's city) is dropped with a
    /// warning instead of failing the load.
    fn into_store(self) -> Result<Store, CodecError> {
        let mut store = Store::new();

        for rec in &self.cities {
            store.add_city(City::new(&rec.id, &rec.name)?)?;
        }
        for rec in &self.tours {
            store.add_tour(Tour::new(&rec.id, &rec.name)?)?;
        }
        for rec in &self.museum_visits {
            store.add_visit(MuseumVisit::new(
                &rec.id,
                &rec.museum_name,
                rec.visit_date,
                rec.cost,
            )?)?;
        }
        for rec in &self.members {
            let mut member = Member::new(&rec.id, &rec.name, &rec.booking_number)?;
            member.included_visits = rec.included_visits;
            store.add_member(member)?;
        }

        // Relink. Tour→city first, then city↔visit, then tour↔member, so
        // that by the time registrations are replayed the tour/city
        // precondition can be checked exactly as live mutation would.
        for rec in &self.tours {
            for city_id in &rec.cities {
                match store.tour_and_city(&rec.id, city_id) {
                    (Some(tour), Some(city)) => {
                        tour.add_city(city);
                    }
                    _ => warn!(tour = %rec.id, city = %city_id, "dropping dangling city reference"),
                }
            }
        }
        for rec in &self.cities {
            for visit_id in &rec.museum_visits {
                match store.city_and_visit(&rec.id, visit_id) {
                    (Some(city), Some(visit)) => {
                        city.add_visit(visit);
                    }
                    _ => warn!(city = %rec.id, visit = %visit_id, "dropping dangling visit reference"),
                }
            }
        }
        for rec in &self.members {
            if let Some(tour_id) = &rec.tour {
                match store.tour_and_member(tour_id, &rec.id) {
                    (Some(tour), Some(member)) => {
                        tour.add_member(member);
                    }
                    _ => warn!(member = %rec.id, tour = %tour_id, "dropping dangling tour reference"),
                }
            }
        }
        for rec in &self.museum_visits {
            for member_id in &rec.registered_members {
                match store.registration_parties(&rec.id, member_id) {
                    (Some(visit), Some(member), tour) => {
                        if !visit.register_member(member, tour) {
                            warn!(
                                visit = %rec.id,
                                member = %member_id,
                                "dropping registration that violates the tour/city rule"
                            );
                        }
                    }
                    _ => warn!(visit = %rec.id, member = %member_id, "dropping dangling member reference"),
                }
            }
        }

        Ok(store)
    }
}
