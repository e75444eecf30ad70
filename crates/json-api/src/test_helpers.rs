//! Test helpers.

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use orderly_app::{
    context::AppContext,
    domain::carts::{
        MockCartsService,
        models::{CartItem, CartSnapshot, CartUuid, DeliveryClass, ItemId},
        totals::Totals,
    },
};

use crate::state::State;

pub(crate) const TEST_CART_UUID: CartUuid = CartUuid::from_uuid(Uuid::nil());

pub(crate) fn state_with_carts(carts: MockCartsService) -> Arc<State> {
    State::from_app_context(AppContext {
        carts: Arc::new(carts),
    })
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_carts(carts)))
            .push(route),
    )
}

/// One line of item 7 at 100 offer, 105.5 display, 10 off, same-day.
pub(crate) fn make_snapshot() -> CartSnapshot {
    CartSnapshot {
        cart: TEST_CART_UUID,
        items: vec![CartItem {
            item_id: ItemId(7),
            quantity: 2,
            display_price: Some(Decimal::new(1055, 1)),
            offer_price: Some(Decimal::from(100)),
            transfer_price: Some(Decimal::from(90)),
            discount: Some(Decimal::from(10)),
            delivery_class: Some(DeliveryClass::SameDay),
            title: Some("Basmati Rice 1kg".to_string()),
            promo_codes: Vec::new(),
        }],
        totals: Totals {
            display_price: Decimal::from(211),
            offer_price: Decimal::from(200),
            discount: Decimal::from(10),
            shipping: Decimal::from(30),
        },
        benefits: None,
        shipping_address: None,
    }
}
