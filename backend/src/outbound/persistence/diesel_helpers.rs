//! Shared Diesel error mapping for the repository adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Collapse a pool error into its message for a connection-error constructor.
pub(super) fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Whether the error is a unique-constraint violation.
///
/// Uniqueness of the membership and RSVP pairs is owned by the database, so
/// adapters translate this variant into the port's duplicate error rather
/// than a generic query failure.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Summarise a Diesel error for a port error message, logging diagnostics.
pub(super) fn map_diesel_error_message(error: &DieselError, context: &str) -> String {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), context, "diesel operation failed");
            format!("{context}: database error")
        }
        DieselError::NotFound => {
            debug!(context, "diesel operation found no record");
            format!("{context}: record not found")
        }
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(other),
                context,
                "diesel operation failed"
            );
            format!("{context}: database error")
        }
    }
}

/// Whether the error indicates a broken connection rather than a bad query.
pub(super) fn is_connection_error(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
    )
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_collapse_to_their_message() {
        let message = map_pool_error_message(PoolError::checkout("refused"));
        assert_eq!(message, "refused");
    }

    #[rstest]
    fn not_found_is_reported_in_context() {
        let message = map_diesel_error_message(&DieselError::NotFound, "rsvp lookup");
        assert!(message.contains("rsvp lookup"));
        assert!(message.contains("record not found"));
    }

    #[rstest]
    fn not_found_is_not_a_unique_violation() {
        assert!(!is_unique_violation(&DieselError::NotFound));
        assert!(!is_connection_error(&DieselError::NotFound));
    }
}
