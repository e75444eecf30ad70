//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::carts::{models::ItemId, reconcile::ReconcileError},
    gateways::GatewayError,
};

/// Every way a cart operation can fail.
///
/// Each value owns its message; nothing is shared between occurrences.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("request data is incorrect: {0}")]
    IncorrectData(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("non existing item {0} can not be deleted")]
    UnknownItemDeletion(ItemId),

    #[error("subscription not found for item {0}")]
    SubscriptionNotFound(ItemId),

    #[error("product availability changed for item {item}: requested {requested}, available {available}")]
    QuantityNotAvailable {
        item: ItemId,
        requested: u32,
        available: u32,
    },

    #[error("{0}")]
    CouponInvalid(String),

    #[error("cart not found")]
    NotFound,

    #[error("database error")]
    Database(#[source] Error),

    #[error("{0}")]
    Internal(String),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => {
                Self::IncorrectData(error.to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Database(error),
        }
    }
}

impl From<ReconcileError> for CartsServiceError {
    fn from(error: ReconcileError) -> Self {
        match error {
            ReconcileError::UnknownItemDeletion(item) => Self::UnknownItemDeletion(item),
            ReconcileError::MissingQuantity(item) => {
                Self::IncorrectData(format!("quantity is required for item {item}"))
            }
            ReconcileError::QuantityOutOfRange(item) => {
                Self::IncorrectData(format!("quantity for item {item} is out of range"))
            }
            ReconcileError::SubscriptionNotFound(item) => Self::SubscriptionNotFound(item),
            ReconcileError::QuantityNotAvailable {
                item,
                requested,
                available,
            } => Self::QuantityNotAvailable {
                item,
                requested,
                available,
            },
        }
    }
}

impl CartsServiceError {
    /// Map a pricing service failure. Declared failures keep the service's message.
    pub(crate) fn from_pricing(error: GatewayError) -> Self {
        Self::Internal(error.to_string())
    }

    /// Map a promotion service failure. A rejection is the coupon engine refusing the cart.
    pub(crate) fn from_promotions(error: GatewayError) -> Self {
        match error {
            GatewayError::Rejected(message) => Self::CouponInvalid(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        assert!(matches!(
            CartsServiceError::from(Error::RowNotFound),
            CartsServiceError::NotFound
        ));
    }

    #[test]
    fn pool_failures_are_database_errors() {
        assert!(matches!(
            CartsServiceError::from(Error::PoolTimedOut),
            CartsServiceError::Database(_)
        ));
    }

    #[test]
    fn promotion_rejections_become_coupon_errors() {
        let error =
            CartsServiceError::from_promotions(GatewayError::Rejected("coupon expired".into()));

        assert!(matches!(&error, CartsServiceError::CouponInvalid(message) if message == "coupon expired"));
        assert_eq!(error.to_string(), "coupon expired");
    }

    #[test]
    fn pricing_rejections_are_internal_and_keep_the_message() {
        let error = CartsServiceError::from_pricing(GatewayError::Rejected("catalog down".into()));

        assert!(matches!(&error, CartsServiceError::Internal(message) if message.contains("catalog down")));
    }
}
