//! Cart Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        addresses::models::{Address, AddressHash},
        carts::{data::CartKey, totals::Totals},
    },
    uuids::TypedUuid,
};

/// Cart reference UUID
pub type CartUuid = TypedUuid<Cart>;

/// Catalogue item identifier, as understood by the pricing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Raised when a stored enum column holds an unknown value.
#[derive(Debug, Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Fulfilment flavour of an order; selects the pricing catalogue.
    #[derive(Default)]
    OrderType, "order type" {
        #[default]
        Grocery => "GROCERY",
        NextDay => "NDD",
        Pharma => "PHARMA",
    }
);

string_enum!(
    /// Channel the order was placed from.
    OrderSource, "order source" {
        Android => "ANDROID_APP",
        Ios => "IOS_APP",
        Web => "WEB",
    }
);

string_enum!(
    /// Payment mode chosen for the cart.
    PaymentMode, "payment mode" {
        CashOnDelivery => "COD",
        Prepaid => "PREPAID",
    }
);

string_enum!(
    /// Same-day or next-day fulfilment, derived from supplier lead time.
    DeliveryClass, "delivery class" {
        SameDay => "SDD",
        NextDay => "NDD",
    }
);

impl DeliveryClass {
    /// Items the supplier can ship with zero lead days go out the same day.
    #[must_use]
    pub fn from_delivery_days(days: Option<u32>) -> Self {
        if days == Some(0) {
            Self::SameDay
        } else {
            Self::NextDay
        }
    }
}

/// Cart Model
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub uuid: CartUuid,
    pub region_id: i64,
    pub user_id: String,
    pub order_type: OrderType,
    pub order_source: OrderSource,
    pub payment_mode: Option<PaymentMode>,
    pub promo_codes: Vec<String>,
    pub shipping_address: Option<AddressHash>,
    pub selected_freebie: Option<String>,
    pub totals: Totals,
    pub items: Vec<CartItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// A new, empty cart for `key`.
    #[must_use]
    pub fn open(key: CartKey, order_source: OrderSource, order_type: OrderType) -> Self {
        let now = Timestamp::now();

        Self {
            uuid: CartUuid::new(),
            region_id: key.region_id,
            user_id: key.user_id,
            order_type,
            order_source,
            payment_mode: None,
            promo_codes: Vec::new(),
            shipping_address: None,
            selected_freebie: None,
            totals: Totals::ZERO,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn key(&self) -> CartKey {
        CartKey {
            region_id: self.region_id,
            user_id: self.user_id.clone(),
        }
    }

    /// Reset every monetary aggregate and drop coupons; an empty cart holds neither.
    pub fn empty_out(&mut self) {
        self.totals = Totals::ZERO;
        self.promo_codes.clear();
    }
}

/// CartItem Model
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub item_id: ItemId,
    pub quantity: u32,
    pub display_price: Option<Decimal>,
    pub offer_price: Option<Decimal>,
    pub transfer_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub delivery_class: Option<DeliveryClass>,
    pub title: Option<String>,
    pub promo_codes: Vec<String>,
}

impl CartItem {
    /// A freshly requested item, not yet priced.
    #[must_use]
    pub fn requested(item_id: ItemId, quantity: u32) -> Self {
        Self {
            item_id,
            quantity,
            display_price: None,
            offer_price: None,
            transfer_price: None,
            discount: None,
            delivery_class: None,
            title: None,
            promo_codes: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.display_price.is_some() && self.offer_price.is_some()
    }
}

/// Priced cart state returned by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub cart: CartUuid,
    pub items: Vec<CartItem>,
    pub totals: Totals,
    pub benefits: Option<serde_json::Value>,
    pub shipping_address: Option<Address>,
}

impl CartSnapshot {
    #[must_use]
    pub fn items_count(&self) -> usize {
        self.items.len()
    }
}

/// Short acknowledgement returned by the fast-add path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub cart: CartUuid,
    pub items_count: usize,
}
