//! Test Helpers

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{
        addresses::models::Address,
        carts::{
            data::{AddItemsRequest, CartKey, CartRequest, ItemDelta},
            models::{Cart, CartItem, CartUuid, DeliveryClass, ItemId, OrderSource, OrderType},
            totals::Totals,
        },
    },
    gateways::{
        pricing::{MockPricingGateway, PriceQuote},
        promotions::{MockPromotionGateway, PromotionOutcome},
    },
};

pub(crate) fn key() -> CartKey {
    CartKey {
        region_id: 11,
        user_id: "user-1".to_string(),
    }
}

pub(crate) fn cart_request(items: Vec<ItemDelta>) -> CartRequest {
    CartRequest {
        key: key(),
        order_source: OrderSource::Web,
        order_type: None,
        items,
        promo_codes: Vec::new(),
        payment_mode: None,
        shipping_address: None,
        selected_freebie: None,
    }
}

pub(crate) fn add_request(items: Vec<ItemDelta>) -> AddItemsRequest {
    AddItemsRequest {
        key: key(),
        order_source: OrderSource::Android,
        order_type: None,
        items,
    }
}

pub(crate) fn bump(id: u64) -> ItemDelta {
    ItemDelta {
        item_id: ItemId(id),
        quantity: None,
        promo_codes: Vec::new(),
    }
}

pub(crate) fn quote(id: u64, base_price: i64, offer_price: i64, max_quantity: Option<u32>) -> PriceQuote {
    PriceQuote {
        id: ItemId(id),
        base_price: Decimal::from(base_price),
        offer_price: Decimal::from(offer_price),
        max_quantity,
        delivery_days: Some(1),
        title: Some(format!("Item {id}")),
        transfer_price: None,
    }
}

/// Pricing that answers from a fixed catalogue; unknown ids are left out.
pub(crate) fn catalogue(quotes: Vec<PriceQuote>) -> MockPricingGateway {
    let mut pricing = MockPricingGateway::new();

    pricing.expect_quote().returning(move |request| {
        Ok(quotes
            .iter()
            .filter(|quote| request.item_ids.contains(&quote.id))
            .cloned()
            .collect())
    });

    pricing
}

pub(crate) fn no_pricing() -> MockPricingGateway {
    let mut pricing = MockPricingGateway::new();
    pricing.expect_quote().never();
    pricing
}

pub(crate) fn no_discounts() -> MockPromotionGateway {
    let mut promotions = MockPromotionGateway::new();

    promotions
        .expect_evaluate()
        .returning(|_| Ok(PromotionOutcome::default()));

    promotions
}

pub(crate) fn no_promotions() -> MockPromotionGateway {
    let mut promotions = MockPromotionGateway::new();
    promotions.expect_evaluate().never();
    promotions
}

pub(crate) fn priced_item(id: u64, quantity: u32, offer_price: i64) -> CartItem {
    CartItem {
        item_id: ItemId(id),
        quantity,
        display_price: Some(Decimal::from(offer_price + 2)),
        offer_price: Some(Decimal::from(offer_price)),
        transfer_price: Some(Decimal::from(offer_price)),
        discount: Some(Decimal::ZERO),
        delivery_class: Some(DeliveryClass::NextDay),
        title: Some(format!("Item {id}")),
        promo_codes: Vec::new(),
    }
}

/// A stored cart holding `items`, with totals as they were last computed.
pub(crate) fn stored_cart(items: Vec<CartItem>) -> Cart {
    let now = Timestamp::now();

    let offer_price = items
        .iter()
        .map(|item| item.offer_price.unwrap_or_default() * Decimal::from(item.quantity))
        .sum();
    let display_price = items
        .iter()
        .map(|item| item.display_price.unwrap_or_default() * Decimal::from(item.quantity))
        .sum();

    Cart {
        uuid: CartUuid::new(),
        region_id: key().region_id,
        user_id: key().user_id,
        order_type: OrderType::Grocery,
        order_source: OrderSource::Web,
        payment_mode: None,
        promo_codes: vec!["WELCOME".to_string()],
        shipping_address: None,
        selected_freebie: None,
        totals: Totals {
            display_price,
            offer_price,
            discount: Decimal::ZERO,
            shipping: Decimal::from(30),
        },
        items,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn address() -> Address {
    Address {
        name: "Asha Rao".to_string(),
        mobile: "+91 98450 12345".to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        pincode: "560001".to_string(),
        state: "Karnataka".to_string(),
        email: Some("ASHA@example.com".to_string()),
        landmark: None,
    }
}
