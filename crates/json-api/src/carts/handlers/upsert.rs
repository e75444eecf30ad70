//! Upsert Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use orderly_app::domain::carts::{CartsServiceError, data::CartRequest};

use crate::{
    carts::{errors::render_error, payloads::CartPayload, responses::CartResponse},
    envelope::render_success,
    extensions::*,
    state::State,
};

/// Create the caller's cart, or reconcile and re-price the open one.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payload = match req.parse_json::<CartPayload>().await {
        Ok(payload) => payload,
        Err(error) => {
            render_error(res, &CartsServiceError::IncorrectData(error.to_string()));

            return Ok(());
        }
    };

    match state.app.carts.upsert_cart(CartRequest::from(payload)).await {
        Ok(snapshot) => render_success(res, CartResponse::from(snapshot)),
        Err(error) => render_error(res, &error),
    }

    Ok(())
}
