//! Translation of pool and Diesel failures into [`LendingStoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::LendingStoreError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> LendingStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LendingStoreError::connection(message)
        }
    }
}

/// Connection loss maps to `Connection`, constraint violations to `Conflict`,
/// everything else to `Query`.
pub(crate) fn map_diesel_error(error: DieselError) -> LendingStoreError {
    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error_message, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            LendingStoreError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::ForeignKeyViolation,
            info,
        ) => LendingStoreError::conflict(info.message().to_owned()),
        DieselError::DatabaseError(_, info) => LendingStoreError::query(info.message().to_owned()),
        DieselError::NotFound => LendingStoreError::query("record not found"),
        _ => LendingStoreError::query(error_message),
    }
}
