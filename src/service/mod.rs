//! Application service.
//!
//! [`TourService`] is the single entry point the (external) user
//! interface talks to. Every mutating operation follows the same shape:
//! resolve the referenced entities through the store, apply the change
//! through the models' association operations (including any cascade
//! unlinking required before an entity may be removed) and finish with
//! a full persistence checkpoint. There is no batching and no partial
//! save: the document on disk always reflects the last completed call.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::codec::{CodecError, JsonCodec};
use crate::models::{City, Member, ModelError, MuseumVisit, Tour};
use crate::store::{EntityKind, Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{kind} with id '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Duplicate identifier or booking number.
    #[error(transparent)]
    Duplicate(#[from] StoreError),

    #[error("cannot remove city '{city}': member '{member}' has a museum visit scheduled there")]
    CityHasScheduledVisits { city: String, member: String },

    /// Malformed construction arguments (empty id/name, negative cost).
    #[error(transparent)]
    Validation(#[from] ModelError),

    /// Schema or I/O failure while loading or checkpointing. Fatal for
    /// the operation in progress.
    #[error(transparent)]
    Persistence(#[from] CodecError),
}

fn not_found(kind: EntityKind, id: &str) -> ServiceError {
    ServiceError::NotFound {
        kind,
        id: id.to_string(),
    }
}

pub struct TourService {
    store: Store,
    codec: JsonCodec,
}

impl TourService {
    pub fn new(store: Store, codec: JsonCodec) -> Self {
        Self { store, codec }
    }

    /// Load the persisted graph, or start empty when no document exists
    /// yet. A present-but-corrupt document is an error; the caller must
    /// not proceed as if the store were empty.
    pub fn open(codec: JsonCodec) -> Result<Self, ServiceError> {
        let store = codec.load()?.unwrap_or_default();
        Ok(Self { store, codec })
    }

    /// Read access to the whole graph, for reporting.
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn persist(&self) -> Result<(), CodecError> {
        self.codec.save(&self.store)
    }

    // ============================================================
    // Tours
    // ============================================================

    pub fn add_tour(&mut self, id: &str, name: &str) -> Result<Tour, ServiceError> {
        if self.store.tour(id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Tour,
                id: id.to_string(),
            }
            .into());
        }
        let tour = Tour::new(id, name)?;
        self.store.add_tour(tour.clone())?;
        self.persist()?;
        debug!(id, "added tour");
        Ok(tour)
    }

    /// Remove a tour, unassigning all of its members first. Cities and
    /// members themselves are kept. `Ok(false)` when the id is unknown.
    pub fn remove_tour(&mut self, id: &str) -> Result<bool, ServiceError> {
        let Some(member_ids) = self.store.tour(id).map(|t| t.members().to_vec()) else {
            return Ok(false);
        };
        for member_id in &member_ids {
            if let (Some(tour), Some(member)) = self.store.tour_and_member(id, member_id) {
                tour.remove_member(member);
            }
        }
        self.store.remove_tour(id);
        self.persist()?;
        debug!(id, "removed tour");
        Ok(true)
    }

    pub fn tour(&self, id: &str) -> Option<&Tour> {
        self.store.tour(id)
    }

    pub fn tours(&self) -> Vec<&Tour> {
        self.store.tours().collect()
    }

    // ============================================================
    // Cities
    // ============================================================

    pub fn add_city(&mut self, id: &str, name: &str) -> Result<City, ServiceError> {
        if self.store.city(id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::City,
                id: id.to_string(),
            }
            .into());
        }
        let city = City::new(id, name)?;
        self.store.add_city(city.clone())?;
        self.persist()?;
        debug!(id, "added city");
        Ok(city)
    }

    /// Remove a city outright: detach it from every tour that references
    /// it and orphan (never delete) the visits it hosts. `Ok(false)`
    /// when the id is unknown.
    pub fn remove_city(&mut self, id: &str) -> Result<bool, ServiceError> {
        let Some(city) = self.store.city(id).cloned() else {
            return Ok(false);
        };
        for tour in self.store.tours_mut() {
            tour.remove_city(&city);
        }
        for visit_id in city.visits() {
            if let (Some(city), Some(visit)) = self.store.city_and_visit(id, visit_id) {
                city.remove_visit(visit);
            }
        }
        self.store.remove_city(id);
        self.persist()?;
        debug!(id, "removed city");
        Ok(true)
    }

    pub fn city(&self, id: &str) -> Option<&City> {
        self.store.city(id)
    }

    pub fn cities(&self) -> Vec<&City> {
        self.store.cities().collect()
    }

    pub fn add_city_to_tour(&mut self, tour_id: &str, city_id: &str) -> Result<bool, ServiceError> {
        let result = match self.store.tour_and_city(tour_id, city_id) {
            (None, _) => return Err(not_found(EntityKind::Tour, tour_id)),
            (_, None) => return Err(not_found(EntityKind::City, city_id)),
            (Some(tour), Some(city)) => tour.add_city(city),
        };
        self.persist()?;
        Ok(result)
    }

    /// Drop a city from a tour's itinerary.
    ///
    /// Forbidden while any member of the tour holds a registration for a
    /// visit in that city, since detaching the city would leave the
    /// registration without its tour/city justification.
    pub fn remove_city_from_tour(
        &mut self,
        tour_id: &str,
        city_id: &str,
    ) -> Result<bool, ServiceError> {
        {
            let Some(tour) = self.store.tour(tour_id) else {
                return Err(not_found(EntityKind::Tour, tour_id));
            };
            let Some(city) = self.store.city(city_id) else {
                return Err(not_found(EntityKind::City, city_id));
            };
            for member_id in tour.members() {
                let Some(member) = self.store.member(member_id) else {
                    continue;
                };
                for visit_id in member.registered_visits() {
                    if self.store.visit(visit_id).and_then(|v| v.city()) == Some(city_id) {
                        return Err(ServiceError::CityHasScheduledVisits {
                            city: city.name.clone(),
                            member: member.name.clone(),
                        });
                    }
                }
            }
        }
        let result = match self.store.tour_and_city(tour_id, city_id) {
            (Some(tour), Some(city)) => tour.remove_city(city),
            _ => false,
        };
        self.persist()?;
        Ok(result)
    }

    // ============================================================
    // Museum visits
    // ============================================================

    pub fn add_museum_visit(
        &mut self,
        id: &str,
        city_id: &str,
        museum_name: &str,
        visit_date: NaiveDate,
        cost: Decimal,
    ) -> Result<MuseumVisit, ServiceError> {
        if self.store.visit(id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::MuseumVisit,
                id: id.to_string(),
            }
            .into());
        }
        let mut visit = MuseumVisit::new(id, museum_name, visit_date, cost)?;
        match self.store.city_mut(city_id) {
            Some(city) => {
                city.add_visit(&mut visit);
            }
            None => return Err(not_found(EntityKind::City, city_id)),
        }
        self.store.add_visit(visit.clone())?;
        self.persist()?;
        debug!(id, city = city_id, "added museum visit");
        Ok(visit)
    }

    /// Remove a visit, detaching it from its city and unregistering its
    /// whole roster first. `Ok(false)` when the id is unknown.
    pub fn remove_museum_visit(&mut self, id: &str) -> Result<bool, ServiceError> {
        let Some(visit) = self.store.visit(id).cloned() else {
            return Ok(false);
        };
        if let Some(city_id) = visit.city() {
            if let (Some(city), Some(visit)) = self.store.city_and_visit(city_id, id) {
                city.remove_visit(visit);
            }
        }
        for member_id in visit.registered_members() {
            if let (Some(visit), Some(member)) = self.store.visit_and_member(id, member_id) {
                visit.unregister_member(member);
            }
        }
        self.store.remove_visit(id);
        self.persist()?;
        debug!(id, "removed museum visit");
        Ok(true)
    }

    pub fn museum_visit(&self, id: &str) -> Option<&MuseumVisit> {
        self.store.visit(id)
    }

    pub fn museum_visits(&self) -> Vec<&MuseumVisit> {
        self.store.visits().collect()
    }

    // ============================================================
    // Members
    // ============================================================

    pub fn add_member(
        &mut self,
        id: &str,
        tour_id: &str,
        name: &str,
        booking_number: &str,
    ) -> Result<Member, ServiceError> {
        if let Some(existing) = self.store.member_by_booking_number(booking_number) {
            return Err(StoreError::DuplicateBookingNumber(existing.booking_number.clone()).into());
        }
        if self.store.member(id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Member,
                id: id.to_string(),
            }
            .into());
        }
        let mut member = Member::new(id, name, booking_number)?;
        match self.store.tour_mut(tour_id) {
            Some(tour) => {
                tour.add_member(&mut member);
            }
            None => return Err(not_found(EntityKind::Tour, tour_id)),
        }
        self.store.add_member(member.clone())?;
        self.persist()?;
        debug!(id, tour = tour_id, "added member");
        Ok(member)
    }

    /// Remove a member, unassigning them from their tour and from every
    /// visit they registered for. `Ok(false)` when the id is unknown.
    pub fn remove_member(&mut self, id: &str) -> Result<bool, ServiceError> {
        let Some(member) = self.store.member(id).cloned() else {
            return Ok(false);
        };
        if let Some(tour_id) = member.tour() {
            if let (Some(tour), Some(member)) = self.store.tour_and_member(tour_id, id) {
                tour.remove_member(member);
            }
        }
        for visit_id in member.registered_visits() {
            if let (Some(visit), Some(member)) = self.store.visit_and_member(visit_id, id) {
                visit.unregister_member(member);
            }
        }
        self.store.remove_member(id);
        self.persist()?;
        debug!(id, "removed member");
        Ok(true)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.store.member(id)
    }

    pub fn member_by_booking_number(&self, booking_number: &str) -> Option<&Member> {
        self.store.member_by_booking_number(booking_number)
    }

    pub fn members(&self) -> Vec<&Member> {
        self.store.members().collect()
    }

    pub fn add_member_to_museum_visit(
        &mut self,
        member_id: &str,
        visit_id: &str,
    ) -> Result<bool, ServiceError> {
        let result = match self.store.registration_parties(visit_id, member_id) {
            (_, None, _) => return Err(not_found(EntityKind::Member, member_id)),
            (None, _, _) => return Err(not_found(EntityKind::MuseumVisit, visit_id)),
            (Some(visit), Some(member), tour) => visit.register_member(member, tour),
        };
        self.persist()?;
        Ok(result)
    }

    pub fn remove_member_from_museum_visit(
        &mut self,
        member_id: &str,
        visit_id: &str,
    ) -> Result<bool, ServiceError> {
        let result = match self.store.visit_and_member(visit_id, member_id) {
            (_, None) => return Err(not_found(EntityKind::Member, member_id)),
            (None, _) => return Err(not_found(EntityKind::MuseumVisit, visit_id)),
            (Some(visit), Some(member)) => visit.unregister_member(member),
        };
        self.persist()?;
        Ok(result)
    }

    /// Cost this member owes beyond their included-visits quota.
    pub fn member_additional_cost(&self, member_id: &str) -> Result<Decimal, ServiceError> {
        let Some(member) = self.store.member(member_id) else {
            return Err(not_found(EntityKind::Member, member_id));
        };
        let costs = member
            .registered_visits()
            .iter()
            .filter_map(|visit_id| self.store.visit(visit_id))
            .map(|visit| visit.cost)
            .collect();
        Ok(member.additional_cost(costs))
    }
}
