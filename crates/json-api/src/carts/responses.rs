//! Response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderly_app::domain::{
    addresses::models::Address,
    carts::models::{CartItem, CartSnapshot, CartSummary, CartUuid, DeliveryClass, ItemId},
};

/// A priced cart line.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartItemResponse {
    pub item_id: ItemId,
    pub quantity: u32,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub display_price: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub offer_price: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float")]
    pub item_discount: Decimal,

    pub title: Option<String>,
    pub delivery_class: Option<DeliveryClass>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            item_id: item.item_id,
            quantity: item.quantity,
            display_price: item.display_price,
            offer_price: item.offer_price,
            item_discount: item.discount.unwrap_or_default(),
            title: item.title,
            delivery_class: item.delivery_class,
        }
    }
}

/// Priced cart returned by create and update.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartResponse {
    pub cart_reference: CartUuid,
    pub items: Vec<CartItemResponse>,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_display_price: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_offer_price: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_shipping_charges: Decimal,

    pub benefits: Option<serde_json::Value>,
    pub cart_items_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
}

impl From<CartSnapshot> for CartResponse {
    fn from(snapshot: CartSnapshot) -> Self {
        let cart_items_count = snapshot.items_count();

        Self {
            cart_reference: snapshot.cart,
            items: snapshot.items.into_iter().map(CartItemResponse::from).collect(),
            total_display_price: snapshot.totals.display_price,
            total_offer_price: snapshot.totals.offer_price,
            total_discount: snapshot.totals.discount,
            total_shipping_charges: snapshot.totals.shipping,
            benefits: snapshot.benefits,
            cart_items_count,
            shipping_address: snapshot.shipping_address,
        }
    }
}

/// Acknowledgement of a fast-add.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartSummaryResponse {
    pub cart_reference: CartUuid,
    pub cart_items_count: usize,
}

impl From<CartSummary> for CartSummaryResponse {
    fn from(summary: CartSummary) -> Self {
        Self {
            cart_reference: summary.cart,
            cart_items_count: summary.items_count,
        }
    }
}

/// Acknowledgement of a cart removal.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartRemovedResponse {
    pub cart_reference: CartUuid,
}
