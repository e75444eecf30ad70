//! Add Cart Items Handler

use std::sync::Arc;

use salvo::prelude::*;

use orderly_app::domain::carts::{CartsServiceError, data::AddItemsRequest};

use crate::{
    carts::{errors::render_error, payloads::AddItemsPayload, responses::CartSummaryResponse},
    envelope::render_success,
    extensions::*,
    state::State,
};

/// Add items without re-pricing the cart.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payload = match req.parse_json::<AddItemsPayload>().await {
        Ok(payload) => payload,
        Err(error) => {
            render_error(res, &CartsServiceError::IncorrectData(error.to_string()));

            return Ok(());
        }
    };

    match state.app.carts.add_items(AddItemsRequest::from(payload)).await {
        Ok(summary) => render_success(res, CartSummaryResponse::from(summary)),
        Err(error) => render_error(res, &error),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use orderly_app::domain::carts::{
        MockCartsService,
        models::{CartSummary, ItemId},
    };

    use crate::test_helpers::{TEST_CART_UUID, carts_service};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("carts/items").post(handler))
    }

    #[tokio::test]
    async fn test_add_items_success() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_items()
            .once()
            .withf(|request| {
                request.items.len() == 2
                    && request.items.iter().all(|delta| delta.item_id != ItemId(0))
                    && request.items.first().and_then(|delta| delta.quantity).is_none()
            })
            .return_once(|_| {
                Ok(CartSummary {
                    cart: TEST_CART_UUID,
                    items_count: 3,
                })
            });

        carts.expect_upsert_cart().never();
        carts.expect_remove_cart().never();

        let mut res = TestClient::post("http://example.com/carts/items")
            .json(&json!({
                "region_id": 11,
                "user_id": "user-1",
                "order_source": "ANDROID_APP",
                "items": [{ "item_id": 7 }, { "item_id": 8, "quantity": 2 }],
            }))
            .send(&make_service(carts))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "status": true,
                "data": {
                    "cart_reference": TEST_CART_UUID.to_string(),
                    "cart_items_count": 3,
                },
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_add_items_unknown_deletion_is_422() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_items()
            .once()
            .return_once(|_| Err(CartsServiceError::UnknownItemDeletion(ItemId(9))));

        let mut res = TestClient::post("http://example.com/carts/items")
            .json(&json!({
                "region_id": 11,
                "user_id": "user-1",
                "order_source": "WEB",
                "items": [{ "item_id": 9, "quantity": 0 }],
            }))
            .send(&make_service(carts))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(body["error"]["code"], json!(1003));

        Ok(())
    }
}
