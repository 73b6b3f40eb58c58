//! Domain models for the museum tour system.
//!
//! # Core Concepts
//!
//! - [`Tour`]: a named itinerary grouping cities and the members assigned
//!   to it. A member belongs to exactly one tour at a time.
//! - [`City`]: a location hosting museum visits. Cities are shared: the
//!   same city may appear in any number of tours.
//! - [`MuseumVisit`]: a scheduled, priced visit to a museum in one city
//!   (or none, when orphaned), with a roster of registered members.
//! - [`Member`]: a traveler on a tour, registrable for museum visits in
//!   the cities their tour includes.
//!
//! # Associations
//!
//! Every link between entities is bidirectional and stored as identifier
//! lists on both sides; entities never hold pointers to each other. The
//! paired association methods (`City::add_visit`, `Tour::add_member`,
//! `MuseumVisit::register_member`, ...) are the only way to create or
//! break a link: they take the counterpart entity `&mut` and update both
//! sides together, so the lists can never disagree. Idempotent no-ops
//! (duplicate add, absent remove) return `false` rather than failing.

mod city;
mod member;
mod tour;
mod visit;

pub use city::*;
pub use member::*;
pub use tour::*;
pub use visit::*;

/// Construction-time validation failures.
///
/// These are raised by the entity constructors and never reach the store:
/// an entity that fails validation is simply never created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{entity} id cannot be empty")]
    EmptyId { entity: &'static str },

    #[error("{entity} name cannot be empty")]
    EmptyName { entity: &'static str },

    #[error("booking number cannot be empty")]
    EmptyBookingNumber,

    #[error("museum visit cost cannot be negative: {0}")]
    NegativeCost(rust_decimal::Decimal),
}

/// Reject blank construction arguments.
pub(crate) fn require_non_blank(value: &str, err: ModelError) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}
