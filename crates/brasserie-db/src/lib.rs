//! Database layer for Brasserie.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. The `customers` and `reservations` tables are
//! created through versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a reservation book for a single restaurant
//!   needs no external database process. WAL mode allows concurrent readers
//!   with a single writer, which matches the small read-heavy workload.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management. Pool acquisition failure is the "store unreachable"
//!   case; everything downstream of a live connection is a query failure.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the server and cannot drift
//!   from the code that depends on it.

mod migrations;
mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
