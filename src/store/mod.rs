//! In-memory entity store.
//!
//! The [`Store`] owns the canonical collection of every entity, keyed by
//! identifier. It enforces uniqueness on insert and hands out lookups,
//! but it is deliberately mechanical: cascades and business rules live in
//! the service layer, which unlinks associations *before* asking the
//! store to remove anything.
//!
//! Because associations mutate two entities at once, the store also
//! exposes split-borrow pair accessors (e.g. [`Store::tour_and_member`])
//! that return mutable references into two different collections
//! simultaneously.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{City, Member, MuseumVisit, Tour};

/// The four entity kinds, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tour,
    City,
    MuseumVisit,
    Member,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tour => "tour",
            Self::City => "city",
            Self::MuseumVisit => "museum visit",
            Self::Member => "member",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a {kind} with id '{id}' already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("a member with booking number '{0}' already exists")]
    DuplicateBookingNumber(String),
}

/// The whole entity graph, indexed by id.
///
/// Plain owned data: the store is constructed once, threaded through the
/// service and codec by `&mut`, and never touched through statics or
/// locks. `BTreeMap` keeps iteration (and thus the persisted document)
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    tours: BTreeMap<String, Tour>,
    cities: BTreeMap<String, City>,
    visits: BTreeMap<String, MuseumVisit>,
    members: BTreeMap<String, Member>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================
    // Tours
    // ============================================================

    pub fn add_tour(&mut self, tour: Tour) -> Result<(), StoreError> {
        if self.tours.contains_key(&tour.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Tour,
                id: tour.id,
            });
        }
        self.tours.insert(tour.id.clone(), tour);
        Ok(())
    }

    /// Pure collection removal; the caller unlinks associations first.
    pub fn remove_tour(&mut self, id: &str) -> Option<Tour> {
        self.tours.remove(id)
    }

    pub fn tour(&self, id: &str) -> Option<&Tour> {
        self.tours.get(id)
    }

    pub fn tours(&self) -> impl Iterator<Item = &Tour> {
        self.tours.values()
    }

    pub fn tours_mut(&mut self) -> impl Iterator<Item = &mut Tour> {
        self.tours.values_mut()
    }

    /// For linking an entity that is not in the store yet (e.g. a freshly
    /// constructed member being assigned to its tour).
    pub(crate) fn tour_mut(&mut self, id: &str) -> Option<&mut Tour> {
        self.tours.get_mut(id)
    }

    // ============================================================
    // Cities
    // ============================================================

    pub fn add_city(&mut self, city: City) -> Result<(), StoreError> {
        if self.cities.contains_key(&city.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::City,
                id: city.id,
            });
        }
        self.cities.insert(city.id.clone(), city);
        Ok(())
    }

    pub fn remove_city(&mut self, id: &str) -> Option<City> {
        self.cities.remove(id)
    }

    pub fn city(&self, id: &str) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    pub(crate) fn city_mut(&mut self, id: &str) -> Option<&mut City> {
        self.cities.get_mut(id)
    }

    /// Whether the city hosts a visit to the named museum
    /// (case-insensitive). Visits hold museum names, cities hold visit
    /// ids, so the lookup needs the index and lives here.
    pub fn city_hosts_museum(&self, city_id: &str, museum_name: &str) -> bool {
        let Some(city) = self.cities.get(city_id) else {
            return false;
        };
        city.visits()
            .iter()
            .filter_map(|id| self.visits.get(id))
            .any(|v| v.museum_name.eq_ignore_ascii_case(museum_name))
    }

    // ============================================================
    // Museum visits
    // ============================================================

    pub fn add_visit(&mut self, visit: MuseumVisit) -> Result<(), StoreError> {
        if self.visits.contains_key(&visit.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::MuseumVisit,
                id: visit.id,
            });
        }
        self.visits.insert(visit.id.clone(), visit);
        Ok(())
    }

    pub fn remove_visit(&mut self, id: &str) -> Option<MuseumVisit> {
        self.visits.remove(id)
    }

    pub fn visit(&self, id: &str) -> Option<&MuseumVisit> {
        self.visits.get(id)
    }

    pub fn visits(&self) -> impl Iterator<Item = &MuseumVisit> {
        self.visits.values()
    }

    // ============================================================
    // Members
    // ============================================================

    pub fn add_member(&mut self, member: Member) -> Result<(), StoreError> {
        if self.members.contains_key(&member.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Member,
                id: member.id,
            });
        }
        if self
            .members
            .values()
            .any(|m| m.booking_number == member.booking_number)
        {
            return Err(StoreError::DuplicateBookingNumber(member.booking_number));
        }
        self.members.insert(member.id.clone(), member);
        Ok(())
    }

    pub fn remove_member(&mut self, id: &str) -> Option<Member> {
        self.members.remove(id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn member_by_booking_number(&self, booking_number: &str) -> Option<&Member> {
        self.members
            .values()
            .find(|m| m.booking_number == booking_number)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    // ============================================================
    // Split borrows for paired association updates
    // ============================================================

    pub fn tour_and_city(
        &mut self,
        tour_id: &str,
        city_id: &str,
    ) -> (Option<&mut Tour>, Option<&City>) {
        (self.tours.get_mut(tour_id), self.cities.get(city_id))
    }

    pub fn tour_and_member(
        &mut self,
        tour_id: &str,
        member_id: &str,
    ) -> (Option<&mut Tour>, Option<&mut Member>) {
        (self.tours.get_mut(tour_id), self.members.get_mut(member_id))
    }

    pub fn city_and_visit(
        &mut self,
        city_id: &str,
        visit_id: &str,
    ) -> (Option<&mut City>, Option<&mut MuseumVisit>) {
        (self.cities.get_mut(city_id), self.visits.get_mut(visit_id))
    }

    pub fn visit_and_member(
        &mut self,
        visit_id: &str,
        member_id: &str,
    ) -> (Option<&mut MuseumVisit>, Option<&mut Member>) {
        (self.visits.get_mut(visit_id), self.members.get_mut(member_id))
    }

    /// The three parties of a registration: the visit and member to link,
    /// plus read access to the member's tour for the city precondition.
    pub fn registration_parties(
        &mut self,
        visit_id: &str,
        member_id: &str,
    ) -> (Option<&mut MuseumVisit>, Option<&mut Member>, Option<&Tour>) {
        let tour_id = self
            .members
            .get(member_id)
            .and_then(|m| m.tour())
            .map(String::from);
        let visit = self.visits.get_mut(visit_id);
        let member = self.members.get_mut(member_id);
        let tour = tour_id.and_then(|id| self.tours.get(&id));
        (visit, member, tour)
    }
}
