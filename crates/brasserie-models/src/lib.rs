//! Customer and reservation models for Brasserie.
//!
//! Implements row mapping, lookup, search, aggregation, and persistence for
//! the two core tables. Models are plain structs plus free functions over a
//! `rusqlite::Connection`; callers obtain connections from the
//! [`brasserie_db`] pool and thread them in explicitly — there is no global
//! database handle.
//!
//! Every value reaching SQL is a bound parameter. Statement text is static
//! (or assembled from static fragments); user input never lands in it.
//!
//! The model layer performs no field validation. Missing or malformed values
//! surface as storage constraint violations via [`StoreError::Query`], and
//! the web layer owns form parsing.

mod customer;
mod error;
mod reservation;

pub use customer::{
    get_customer, list_customers, save_customer, search_customers, top_customers, Customer,
    TieBreak, DEFAULT_TOP_LIMIT,
};
pub use error::StoreError;
pub use reservation::{reservations_for_customer, save_reservation, Reservation};
