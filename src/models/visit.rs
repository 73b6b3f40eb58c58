use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{require_non_blank, Member, ModelError, Tour};

/// A scheduled, priced visit to a museum within one city.
///
/// A visit normally belongs to exactly one city; removing that city
/// orphans the visit (`city` becomes `None`) rather than deleting it.
/// The member roster is bidirectional and mirrored by each member's
/// registered-visit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuseumVisit {
    pub id: String,
    pub museum_name: String,
    pub visit_date: NaiveDate,
    pub cost: Decimal,
    city: Option<String>,
    members: Vec<String>,
}

impl MuseumVisit {
    pub fn new(
        id: impl Into<String>,
        museum_name: impl Into<String>,
        visit_date: NaiveDate,
        cost: Decimal,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let museum_name = museum_name.into();
        require_non_blank(&id, ModelError::EmptyId { entity: "museum visit" })?;
        require_non_blank(&museum_name, ModelError::EmptyName { entity: "museum visit" })?;
        if cost < Decimal::ZERO {
            return Err(ModelError::NegativeCost(cost));
        }
        Ok(Self {
            id,
            museum_name,
            visit_date,
            cost,
            city: None,
            members: Vec::new(),
        })
    }

    /// Id of the hosting city, or `None` when orphaned.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub(crate) fn set_city(&mut self, city: Option<String>) {
        self.city = city;
    }

    /// Ids of the registered members, in registration order.
    pub fn registered_members(&self) -> &[String] {
        &self.members
    }

    /// Register a member for this visit.
    ///
    /// `tour` must be the member's own tour, resolved by the caller.
    /// Members can only visit museums in cities their tour includes, so
    /// registration fails (`false`, no mutation on either side) unless
    /// the visit has a city, the member has a tour, and that tour's
    /// itinerary contains the city. Duplicate registration is a no-op.
    pub fn register_member(&mut self, member: &mut Member, tour: Option<&Tour>) -> bool {
        let Some(city_id) = self.city.as_deref() else {
            return false;
        };
        let Some(tour) = tour else {
            return false;
        };
        if member.tour() != Some(tour.id.as_str()) || !tour.contains_city(city_id) {
            return false;
        }
        if self.is_registered(&member.id) {
            return false;
        }
        self.members.push(member.id.clone());
        member.record_registration(self.id.clone());
        true
    }

    /// Remove a member from the roster and the visit from the member's
    /// registered list. Returns `false` if not registered.
    pub fn unregister_member(&mut self, member: &mut Member) -> bool {
        let Some(pos) = self.members.iter().position(|id| *id == member.id) else {
            return false;
        };
        self.members.remove(pos);
        member.forget_registration(&self.id);
        true
    }

    pub fn is_registered(&self, member_id: &str) -> bool {
        self.members.iter().any(|id| id == member_id)
    }

    /// Revenue from the full roster at the current price.
    pub fn total_revenue(&self) -> Decimal {
        self.cost * Decimal::from(self.members.len() as u64)
    }
}
