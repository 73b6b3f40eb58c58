use rust_decimal::Decimal;

use super::{require_non_blank, ModelError};

/// Number of a member's costliest visits covered by their booking.
pub const DEFAULT_INCLUDED_VISITS: u32 = 2;

/// A traveler assigned to a tour.
///
/// The booking number is unique across all members, not just within a
/// tour. `tour` mirrors the owning tour's member list; `visits` mirrors
/// the roster of every visit the member is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub booking_number: String,
    /// Quota of visits treated as pre-paid when billing additional cost.
    pub included_visits: u32,
    tour: Option<String>,
    visits: Vec<String>,
}

impl Member {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        booking_number: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let name = name.into();
        let booking_number = booking_number.into();
        require_non_blank(&id, ModelError::EmptyId { entity: "member" })?;
        require_non_blank(&name, ModelError::EmptyName { entity: "member" })?;
        require_non_blank(&booking_number, ModelError::EmptyBookingNumber)?;
        Ok(Self {
            id,
            name,
            booking_number,
            included_visits: DEFAULT_INCLUDED_VISITS,
            tour: None,
            visits: Vec::new(),
        })
    }

    /// Id of the tour this member is assigned to, if any.
    pub fn tour(&self) -> Option<&str> {
        self.tour.as_deref()
    }

    pub(crate) fn set_tour(&mut self, tour: Option<String>) {
        self.tour = tour;
    }

    /// Ids of the visits this member is registered for.
    pub fn registered_visits(&self) -> &[String] {
        &self.visits
    }

    pub fn is_registered_for(&self, visit_id: &str) -> bool {
        self.visits.iter().any(|id| id == visit_id)
    }

    pub(crate) fn record_registration(&mut self, visit_id: String) {
        if !self.is_registered_for(&visit_id) {
            self.visits.push(visit_id);
        }
    }

    pub(crate) fn forget_registration(&mut self, visit_id: &str) {
        self.visits.retain(|id| id != visit_id);
    }

    /// Additional cost owed beyond the included-visits quota.
    ///
    /// `costs` are the costs of this member's registered visits, in any
    /// order. The quota covers the `included_visits` *most expensive*
    /// visits; whatever remains is billed. With quota 2 and costs
    /// {10, 30, 20}, the 30 and 20 are free and the result is 10.
    pub fn additional_cost(&self, mut costs: Vec<Decimal>) -> Decimal {
        let quota = self.included_visits as usize;
        if costs.len() <= quota {
            return Decimal::ZERO;
        }
        costs.sort_by(|a, b| b.cmp(a));
        costs[quota..].iter().sum()
    }
}
