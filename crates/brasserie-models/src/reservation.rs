//! Reservation model: customer-scoped lookup and persistence.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

use crate::error::StoreError;

/// A reservation for a party at the restaurant.
///
/// Always belongs to exactly one customer; the foreign key is enforced by
/// the storage layer, not here. Party size and timestamp validation is the
/// web layer's job — the model persists whatever it is handed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Database ID. `None` until the first save; immutable once assigned.
    pub id: Option<i64>,
    /// Owning customer ID. Required, immutable.
    pub customer_id: i64,
    /// When the party arrives.
    pub start_at: NaiveDateTime,
    /// Party size.
    pub num_guests: i64,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Reservation {
    /// Constructs an unsaved reservation from caller-supplied fields.
    pub fn new(
        customer_id: i64,
        start_at: NaiveDateTime,
        num_guests: i64,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            start_at,
            num_guests,
            notes,
        }
    }
}

/// All reservations whose foreign key equals the given customer ID.
///
/// Ordered by primary key so repeated reads render identically. A customer
/// with no reservations yields an empty Vec, not an error.
pub fn reservations_for_customer(
    conn: &Connection,
    customer_id: i64,
) -> Result<Vec<Reservation>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, start_at, num_guests, notes
         FROM reservations
         WHERE customer_id = ?1
         ORDER BY id",
    )?;

    let rows = stmt.query_map([customer_id], map_row_to_reservation)?;
    let mut reservations = Vec::new();
    for row in rows {
        reservations.push(row?);
    }
    Ok(reservations)
}

/// Saves a reservation: insert when it has no ID, update otherwise.
///
/// Same upsert-by-identifier-presence rule as customers. A reference to a
/// missing customer fails as a foreign-key constraint violation from the
/// store ([`StoreError::Query`]).
pub fn save_reservation(conn: &Connection, reservation: &mut Reservation) -> Result<(), StoreError> {
    match reservation.id {
        None => {
            let id: i64 = conn.query_row(
                "INSERT INTO reservations (customer_id, start_at, num_guests, notes)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
                params![
                    reservation.customer_id,
                    reservation.start_at,
                    reservation.num_guests,
                    reservation.notes,
                ],
                |row| row.get(0),
            )?;
            reservation.id = Some(id);
            tracing::debug!(id, customer_id = reservation.customer_id, "inserted reservation");
            Ok(())
        }
        Some(id) => {
            let count = conn.execute(
                "UPDATE reservations
                 SET customer_id = ?1,
                     start_at = ?2,
                     num_guests = ?3,
                     notes = ?4
                 WHERE id = ?5",
                params![
                    reservation.customer_id,
                    reservation.start_at,
                    reservation.num_guests,
                    reservation.notes,
                    id,
                ],
            )?;
            if count == 0 {
                return Err(StoreError::NotFound {
                    entity: "reservation",
                    id,
                });
            }
            Ok(())
        }
    }
}

fn map_row_to_reservation(row: &Row) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: Some(row.get(0)?),
        customer_id: row.get(1)?,
        start_at: row.get(2)?,
        num_guests: row.get(3)?,
        notes: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{save_customer, Customer};
    use brasserie_db::run_migrations;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("failed to enable foreign keys");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    fn seed_customer(conn: &Connection) -> i64 {
        let mut customer = Customer::new("Ada".to_string(), "Lovelace".to_string(), None, None);
        save_customer(conn, &mut customer).expect("seed save failed");
        customer.id.expect("seed customer should have an id")
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn save_then_fetch_round_trips_all_fields() {
        let conn = setup_db();
        let customer_id = seed_customer(&conn);

        let mut reservation =
            Reservation::new(customer_id, at(19), 4, Some("birthday".to_string()));
        save_reservation(&conn, &mut reservation).expect("save failed");
        assert!(reservation.id.is_some(), "insert should assign an id");

        let fetched = reservations_for_customer(&conn, customer_id).expect("fetch failed");
        assert_eq!(fetched, vec![reservation]);
    }

    #[test]
    fn for_customer_returns_insertion_order() {
        let conn = setup_db();
        let customer_id = seed_customer(&conn);

        for hour in [21, 18, 20] {
            let mut reservation = Reservation::new(customer_id, at(hour), 2, None);
            save_reservation(&conn, &mut reservation).expect("save failed");
        }

        let fetched = reservations_for_customer(&conn, customer_id).expect("fetch failed");
        let hours: Vec<u32> = fetched
            .iter()
            .map(|r| chrono::Timelike::hour(&r.start_at.time()))
            .collect();
        assert_eq!(hours, vec![21, 18, 20], "primary-key order, not time order");
    }

    #[test]
    fn customer_with_no_reservations_yields_empty_vec() {
        let conn = setup_db();
        let customer_id = seed_customer(&conn);

        let fetched = reservations_for_customer(&conn, customer_id).expect("fetch failed");
        assert!(fetched.is_empty());
    }

    #[test]
    fn update_keeps_id_and_rewrites_columns() {
        let conn = setup_db();
        let customer_id = seed_customer(&conn);

        let mut reservation = Reservation::new(customer_id, at(19), 2, None);
        save_reservation(&conn, &mut reservation).expect("insert failed");
        let id = reservation.id;

        reservation.num_guests = 6;
        reservation.notes = Some("moved to the big table".to_string());
        save_reservation(&conn, &mut reservation).expect("update failed");
        assert_eq!(reservation.id, id, "update never changes the id");

        let fetched = reservations_for_customer(&conn, customer_id).expect("fetch failed");
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].num_guests, 6);
        assert_eq!(fetched[0].notes, Some("moved to the big table".to_string()));
    }

    #[test]
    fn orphan_reservation_fails_as_query_error() {
        let conn = setup_db();

        let mut reservation = Reservation::new(999, at(19), 2, None);
        let err = save_reservation(&conn, &mut reservation).unwrap_err();
        match err {
            StoreError::Query(rusqlite::Error::SqliteFailure(code, _)) => {
                assert_eq!(code.code, rusqlite::ffi::ErrorCode::ConstraintViolation)
            }
            other => panic!("expected constraint violation, got {other:?}"),
        }
        assert!(reservation.id.is_none(), "failed insert assigns no id");
    }

    #[test]
    fn model_accepts_nonpositive_party_size() {
        // Validation is deliberately not the model's job; the storage schema
        // has no CHECK constraint and the web layer owns form validation.
        let conn = setup_db();
        let customer_id = seed_customer(&conn);

        let mut reservation = Reservation::new(customer_id, at(19), 0, None);
        save_reservation(&conn, &mut reservation).expect("save should not validate");
    }
}
