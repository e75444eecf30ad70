//! Request payloads

use serde::Deserialize;

use orderly_app::domain::{
    addresses::models::Address,
    carts::{
        data::{AddItemsRequest, CartKey, CartRequest, ItemDelta},
        models::{ItemId, OrderSource, OrderType, PaymentMode},
    },
};

/// One line of a cart payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemPayload {
    pub item_id: u64,

    #[serde(default)]
    pub quantity: Option<u32>,

    #[serde(default)]
    pub promo_codes: Vec<String>,
}

impl From<ItemPayload> for ItemDelta {
    fn from(payload: ItemPayload) -> Self {
        ItemDelta {
            item_id: ItemId(payload.item_id),
            quantity: payload.quantity,
            promo_codes: payload.promo_codes,
        }
    }
}

/// Body of a priced create or update.
#[derive(Debug, Deserialize)]
pub(crate) struct CartPayload {
    pub region_id: i64,
    pub user_id: String,
    pub order_source: OrderSource,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    pub items: Vec<ItemPayload>,

    #[serde(default)]
    pub promo_codes: Vec<String>,

    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,

    #[serde(default)]
    pub shipping_address: Option<Address>,

    #[serde(default)]
    pub selected_freebie: Option<String>,
}

impl From<CartPayload> for CartRequest {
    fn from(payload: CartPayload) -> Self {
        CartRequest {
            key: CartKey {
                region_id: payload.region_id,
                user_id: payload.user_id,
            },
            order_source: payload.order_source,
            order_type: payload.order_type,
            items: payload.items.into_iter().map(ItemDelta::from).collect(),
            promo_codes: payload.promo_codes,
            payment_mode: payload.payment_mode,
            shipping_address: payload.shipping_address,
            selected_freebie: payload.selected_freebie,
        }
    }
}

/// Body of a fast-add.
#[derive(Debug, Deserialize)]
pub(crate) struct AddItemsPayload {
    pub region_id: i64,
    pub user_id: String,
    pub order_source: OrderSource,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    pub items: Vec<ItemPayload>,
}

impl From<AddItemsPayload> for AddItemsRequest {
    fn from(payload: AddItemsPayload) -> Self {
        AddItemsRequest {
            key: CartKey {
                region_id: payload.region_id,
                user_id: payload.user_id,
            },
            order_source: payload.order_source,
            order_type: payload.order_type,
            items: payload.items.into_iter().map(ItemDelta::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn optional_fields_default() -> TestResult {
        let payload: CartPayload = serde_json::from_value(json!({
            "region_id": 11,
            "user_id": "user-1",
            "order_source": "WEB",
            "items": [{ "item_id": 7, "quantity": 2 }],
        }))?;

        let request = CartRequest::from(payload);

        assert_eq!(request.order_type, None);
        assert_eq!(request.items, vec![ItemDelta::new(7, 2)]);
        assert!(request.promo_codes.is_empty());
        assert!(request.shipping_address.is_none());

        Ok(())
    }

    #[test]
    fn wire_names_select_the_enums() -> TestResult {
        let payload: CartPayload = serde_json::from_value(json!({
            "region_id": 11,
            "user_id": "user-1",
            "order_source": "ANDROID_APP",
            "order_type": "NDD",
            "payment_mode": "COD",
        }))?;

        assert_eq!(payload.order_source, OrderSource::Android);
        assert_eq!(payload.order_type, Some(OrderType::NextDay));
        assert_eq!(payload.payment_mode, Some(PaymentMode::CashOnDelivery));

        Ok(())
    }

    #[test]
    fn fast_add_lines_may_omit_the_quantity() -> TestResult {
        let payload: AddItemsPayload = serde_json::from_value(json!({
            "region_id": 11,
            "user_id": "user-1",
            "order_source": "IOS_APP",
            "items": [{ "item_id": 7 }],
        }))?;

        let request = AddItemsRequest::from(payload);

        assert_eq!(request.items.first().and_then(|delta| delta.quantity), None);

        Ok(())
    }

    #[test]
    fn unknown_order_source_is_rejected() {
        let result = serde_json::from_value::<CartPayload>(json!({
            "region_id": 11,
            "user_id": "user-1",
            "order_source": "FAX",
        }));

        assert!(result.is_err());
    }
}
