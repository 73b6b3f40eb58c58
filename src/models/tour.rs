use super::{require_non_blank, City, Member, ModelError};

/// A named itinerary grouping cities and members.
///
/// The city list is one-sided: cities are shareable and carry no tour
/// back-reference. The member list is bidirectional and mirrored by
/// [`Member::tour`](super::Member::tour); a member is assigned to at most
/// one tour at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub id: String,
    pub name: String,
    cities: Vec<String>,
    members: Vec<String>,
}

impl Tour {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let name = name.into();
        require_non_blank(&id, ModelError::EmptyId { entity: "tour" })?;
        require_non_blank(&name, ModelError::EmptyName { entity: "tour" })?;
        Ok(Self {
            id,
            name,
            cities: Vec::new(),
            members: Vec::new(),
        })
    }

    /// Ids of the cities on this itinerary, in insertion order.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Ids of the members assigned to this tour, in insertion order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Add a city to the itinerary. Returns `false` on duplicate.
    pub fn add_city(&mut self, city: &City) -> bool {
        if self.contains_city(&city.id) {
            return false;
        }
        self.cities.push(city.id.clone());
        true
    }

    /// Drop a city from the itinerary. Returns `false` if absent.
    pub fn remove_city(&mut self, city: &City) -> bool {
        let Some(pos) = self.cities.iter().position(|id| *id == city.id) else {
            return false;
        };
        self.cities.remove(pos);
        true
    }

    /// Assign a member to this tour, setting their back-reference.
    ///
    /// Returns `false` without mutating either side if the member is
    /// already on this tour, or still assigned to a different one.
    pub fn add_member(&mut self, member: &mut Member) -> bool {
        if self.contains_member(&member.id) {
            return false;
        }
        match member.tour() {
            Some(tour_id) if tour_id != self.id => return false,
            _ => {}
        }
        self.members.push(member.id.clone());
        member.set_tour(Some(self.id.clone()));
        true
    }

    /// Unassign a member, clearing their back-reference if it points
    /// here. Returns `false` if the member was not on this tour.
    pub fn remove_member(&mut self, member: &mut Member) -> bool {
        let Some(pos) = self.members.iter().position(|id| *id == member.id) else {
            return false;
        };
        self.members.remove(pos);
        if member.tour() == Some(self.id.as_str()) {
            member.set_tour(None);
        }
        true
    }

    pub fn contains_city(&self, city_id: &str) -> bool {
        self.cities.iter().any(|id| id == city_id)
    }

    pub fn contains_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|id| id == member_id)
    }
}
