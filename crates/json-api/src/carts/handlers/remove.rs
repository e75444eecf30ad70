//! Remove Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use orderly_app::domain::carts::{CartsServiceError, models::CartUuid};

use crate::{
    carts::{errors::render_error, responses::CartRemovedResponse},
    envelope::render_success,
    extensions::*,
    state::State,
};

/// Delete a cart with its items and shipment details.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let cart = match req
        .param::<String>("cart")
        .unwrap_or_default()
        .parse::<CartUuid>()
    {
        Ok(cart) => cart,
        Err(error) => {
            render_error(
                res,
                &CartsServiceError::IncorrectData(format!("invalid cart reference: {error}")),
            );

            return Ok(());
        }
    };

    match state.app.carts.remove_cart(cart).await {
        Ok(()) => render_success(
            res,
            CartRemovedResponse {
                cart_reference: cart,
            },
        ),
        Err(error) => render_error(res, &error),
    }

    Ok(())
}
