//! Error types for the model layer.

/// Errors that can occur during customer and reservation operations.
///
/// Connector failures are surfaced verbatim rather than translated into
/// domain errors, so callers must be prepared for [`StoreError::Connection`]
/// and [`StoreError::Query`] on any operation. Only lookups by identifier
/// have a domain-level contract ([`StoreError::NotFound`]).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested identifier has no corresponding row.
    #[error("no such {entity}: {id}")]
    NotFound {
        /// The kind of record looked up (e.g. "customer").
        entity: &'static str,
        /// The identifier that had no row.
        id: i64,
    },

    /// The store is unreachable (pool acquisition failed).
    #[error("database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    /// A statement failed: malformed SQL or a constraint violation.
    #[error("database query error: {0}")]
    Query(#[from] rusqlite::Error),
}

impl StoreError {
    /// The HTTP-equivalent status code for this error kind.
    ///
    /// Callers branch on the enum variant for behavior; the status is for
    /// the presentation boundary. Anything that is not a missing row is an
    /// internal error.
    pub fn status(&self) -> u16 {
        match self {
            StoreError::NotFound { .. } => 404,
            StoreError::Connection(_) | StoreError::Query(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_entity_and_id() {
        let err = StoreError::NotFound {
            entity: "customer",
            id: 42,
        };
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "no such customer: 42");
    }

    #[test]
    fn query_errors_are_internal() {
        let err = StoreError::Query(rusqlite::Error::InvalidQuery);
        assert_eq!(err.status(), 500);
    }
}
