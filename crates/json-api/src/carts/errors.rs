//! Errors

use salvo::{http::StatusCode, prelude::Response};
use tracing::{error, warn};

use orderly_app::domain::carts::CartsServiceError;

use crate::envelope::{ErrorBody, render_failure};

/// Stable envelope code for each failure kind.
pub(crate) fn error_code(error: &CartsServiceError) -> u16 {
    match error {
        CartsServiceError::IncorrectData(_) => 1001,
        CartsServiceError::EmptyCart => 1002,
        CartsServiceError::UnknownItemDeletion(_) => 1003,
        CartsServiceError::SubscriptionNotFound(_) => 1004,
        CartsServiceError::QuantityNotAvailable { .. } => 1005,
        CartsServiceError::CouponInvalid(_) => 1006,
        CartsServiceError::NotFound => 1007,
        CartsServiceError::Database(_) => 1008,
        CartsServiceError::Internal(_) => 1009,
    }
}

pub(crate) fn status_code(error: &CartsServiceError) -> StatusCode {
    match error {
        CartsServiceError::IncorrectData(_) => StatusCode::BAD_REQUEST,
        CartsServiceError::EmptyCart
        | CartsServiceError::UnknownItemDeletion(_)
        | CartsServiceError::SubscriptionNotFound(_)
        | CartsServiceError::CouponInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CartsServiceError::QuantityNotAvailable { .. } => StatusCode::CONFLICT,
        CartsServiceError::NotFound => StatusCode::NOT_FOUND,
        CartsServiceError::Database(_) | CartsServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Render a service failure as a failure envelope.
pub(crate) fn render_error(res: &mut Response, error: &CartsServiceError) {
    let status = status_code(error);

    if status.is_server_error() {
        error!(code = error_code(error), "cart request failed: {error}");
    } else {
        warn!(code = error_code(error), "cart request rejected: {error}");
    }

    render_failure(
        res,
        status,
        ErrorBody {
            code: error_code(error),
            message: error.to_string(),
        },
    );
}
