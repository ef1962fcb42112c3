//! The axum handlers for the REST surface.
//!
//! Add and update share one POST route per entity: a body without an id adds
//! (201), a body with an id updates or upserts (200).

pub mod accounts;
pub mod config_types;
pub mod expenses;
pub mod users;
