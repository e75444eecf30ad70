//! App Router

use salvo::Router;

use crate::{carts, healthcheck};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::with_path("carts")
                .post(carts::handlers::upsert::handler)
                .push(Router::with_path("items").post(carts::handlers::add_items::handler))
                .push(Router::with_path("{cart}").delete(carts::handlers::remove::handler)),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::{Value, json};
    use testresult::TestResult;

    use orderly_app::domain::carts::{MockCartsService, models::CartSummary};

    use crate::test_helpers::{TEST_CART_UUID, state_with_carts};

    use super::*;

    #[tokio::test]
    async fn test_items_route_is_not_taken_for_a_cart_reference() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_items().once().return_once(|_| {
            Ok(CartSummary {
                cart: TEST_CART_UUID,
                items_count: 1,
            })
        });

        carts.expect_remove_cart().never();

        let service = Service::new(
            Router::new()
                .hoop(inject(state_with_carts(carts)))
                .push(app_router()),
        );

        let mut res = TestClient::post("http://example.com/carts/items")
            .json(&json!({
                "region_id": 11,
                "user_id": "user-1",
                "order_source": "WEB",
                "items": [{ "item_id": 7 }],
            }))
            .send(&service)
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["data"]["cart_items_count"], json!(1));

        Ok(())
    }
}
