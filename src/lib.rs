//! Museum tour planning library.
//!
//! An in-memory graph of tours, cities, museum visits and members, linked
//! by bidirectional associations and persisted as a schema-validated JSON
//! document. The [`service::TourService`] is the outward contract: a
//! console or other UI drives it and never touches the layers below
//! directly.
//!
//! Layering, bottom up:
//!
//! - [`models`]: the entities and the paired association operations that
//!   keep both sides of every link consistent.
//! - [`store`]: the canonical id-indexed collections, uniqueness
//!   enforcement, and split-borrow access for paired updates.
//! - [`codec`]: save/load of the whole graph, with schema validation on
//!   both directions and invariant-checked relinking on load.
//! - [`service`]: business operations, cascades, and the synchronous
//!   persistence checkpoint after every mutation.
//!
//! The library is single-threaded by design: one `TourService` owns the
//! whole graph for the lifetime of a session.

pub mod codec;
pub mod models;
pub mod service;
pub mod store;
