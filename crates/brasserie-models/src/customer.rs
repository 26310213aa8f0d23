//! Customer model: row mapping, lookup, search, aggregation, persistence.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::reservation::{self, Reservation};

/// Default truncation for the top-customers query.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// A customer of the restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Database ID. `None` until the first save; immutable once assigned.
    pub id: Option<i64>,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number, free-form.
    pub phone: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Number of reservations. Populated only by [`top_customers`]; never a
    /// persisted column.
    pub reservation_count: Option<i64>,
}

impl Customer {
    /// Constructs an unsaved customer from caller-supplied fields.
    pub fn new(
        first_name: String,
        last_name: String,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: None,
            first_name,
            last_name,
            phone,
            notes,
            reservation_count: None,
        }
    }

    /// First and last names joined by a single space. Derived on demand,
    /// never stored.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// All reservations belonging to this customer.
    ///
    /// An unsaved customer has no identifier and therefore no reservations.
    pub fn reservations(&self, conn: &Connection) -> Result<Vec<Reservation>, StoreError> {
        match self.id {
            Some(id) => reservation::reservations_for_customer(conn, id),
            None => Ok(Vec::new()),
        }
    }
}

/// Secondary sort key for [`top_customers`].
///
/// Reservation-count ties at the limit boundary are otherwise broken by the
/// store's unspecified ordering. `CustomerId` is the default so repeated
/// queries render the same page; `Arbitrary` preserves the store-decided
/// ordering for callers that do not care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Deterministic: ties ordered by ascending customer ID.
    #[default]
    CustomerId,
    /// Whatever ordering the store produces for equal counts.
    Arbitrary,
}

/// Lists every customer, ordered by last name then first name.
///
/// No pagination; the dataset is assumed small enough for a single page.
pub fn list_customers(conn: &Connection) -> Result<Vec<Customer>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, phone, notes
         FROM customers
         ORDER BY last_name, first_name",
    )?;

    let rows = stmt.query_map([], map_row_to_customer)?;
    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

/// Retrieves a customer by ID.
pub fn get_customer(conn: &Connection, id: i64) -> Result<Customer, StoreError> {
    conn.query_row(
        "SELECT id, first_name, last_name, phone, notes
         FROM customers
         WHERE id = ?1",
        [id],
        map_row_to_customer,
    )
    .optional()?
    .ok_or(StoreError::NotFound {
        entity: "customer",
        id,
    })
}

/// Case-insensitive substring search against the full display name.
///
/// The fragment is wrapped in `%` wildcards and passed as a bound parameter.
/// User-supplied `%`/`_` are not escaped, so they act as store-level
/// wildcards — inherited behavior, kept deliberately.
pub fn search_customers(conn: &Connection, fragment: &str) -> Result<Vec<Customer>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, phone, notes
         FROM customers
         WHERE lower(first_name || ' ' || last_name) LIKE lower(?1)
         ORDER BY last_name, first_name",
    )?;

    let pattern = format!("%{}%", fragment);
    let rows = stmt.query_map([pattern], map_row_to_customer)?;
    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

/// Customers with the most reservations, descending by count, truncated to
/// `limit`.
///
/// Each returned customer has `reservation_count` populated. Customers with
/// zero reservations never appear (inner join).
pub fn top_customers(
    conn: &Connection,
    limit: u32,
    tie_break: TieBreak,
) -> Result<Vec<Customer>, StoreError> {
    let sql = match tie_break {
        TieBreak::CustomerId => {
            "SELECT c.id, c.first_name, c.last_name, c.phone, c.notes, COUNT(*) AS reservation_count
             FROM reservations AS r
             JOIN customers AS c ON r.customer_id = c.id
             GROUP BY c.id
             ORDER BY COUNT(*) DESC, c.id ASC
             LIMIT ?1"
        }
        TieBreak::Arbitrary => {
            "SELECT c.id, c.first_name, c.last_name, c.phone, c.notes, COUNT(*) AS reservation_count
             FROM reservations AS r
             JOIN customers AS c ON r.customer_id = c.id
             GROUP BY c.id
             ORDER BY COUNT(*) DESC
             LIMIT ?1"
        }
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([limit], map_row_to_top_customer)?;
    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

/// Saves a customer: insert when it has no ID, update otherwise.
///
/// Inserting captures the store-assigned ID into `customer.id`. Updating
/// writes exactly the four mutable columns, keyed by ID, with no
/// concurrency check — last writer wins.
pub fn save_customer(conn: &Connection, customer: &mut Customer) -> Result<(), StoreError> {
    match customer.id {
        None => {
            let id: i64 = conn.query_row(
                "INSERT INTO customers (first_name, last_name, phone, notes)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
                params![
                    customer.first_name,
                    customer.last_name,
                    customer.phone,
                    customer.notes,
                ],
                |row| row.get(0),
            )?;
            customer.id = Some(id);
            tracing::debug!(id, "inserted customer");
            Ok(())
        }
        Some(id) => {
            let count = conn.execute(
                "UPDATE customers
                 SET first_name = ?1,
                     last_name = ?2,
                     phone = ?3,
                     notes = ?4
                 WHERE id = ?5",
                params![
                    customer.first_name,
                    customer.last_name,
                    customer.phone,
                    customer.notes,
                    id,
                ],
            )?;
            if count == 0 {
                return Err(StoreError::NotFound {
                    entity: "customer",
                    id,
                });
            }
            Ok(())
        }
    }
}

fn map_row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: Some(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        notes: row.get(4)?,
        reservation_count: None,
    })
}

fn map_row_to_top_customer(row: &Row) -> rusqlite::Result<Customer> {
    let mut customer = map_row_to_customer(row)?;
    customer.reservation_count = Some(row.get(5)?);
    Ok(customer)
}
