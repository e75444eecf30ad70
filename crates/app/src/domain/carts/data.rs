//! Cart Data

use crate::domain::{
    addresses::models::Address,
    carts::{
        errors::CartsServiceError,
        models::{ItemId, OrderSource, OrderType, PaymentMode},
    },
};

/// At most one open cart exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub region_id: i64,
    pub user_id: String,
}

/// One requested change to a cart line.
///
/// A quantity of zero deletes the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDelta {
    pub item_id: ItemId,
    pub quantity: Option<u32>,
    pub promo_codes: Vec<String>,
}

impl ItemDelta {
    #[must_use]
    pub fn new(item_id: u64, quantity: u32) -> Self {
        Self {
            item_id: ItemId(item_id),
            quantity: Some(quantity),
            promo_codes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_promo_codes(mut self, promo_codes: Vec<String>) -> Self {
        self.promo_codes = promo_codes;
        self
    }
}

/// Priced create or update of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRequest {
    pub key: CartKey,
    pub order_source: OrderSource,
    pub order_type: Option<OrderType>,
    pub items: Vec<ItemDelta>,
    pub promo_codes: Vec<String>,
    pub payment_mode: Option<PaymentMode>,
    pub shipping_address: Option<Address>,
    pub selected_freebie: Option<String>,
}

impl CartRequest {
    /// Boundary checks shared by create and update.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::IncorrectData`] for a blank user id, a line without a
    /// quantity or a quantity the store can not hold.
    pub fn validate(&self) -> Result<(), CartsServiceError> {
        validate_key(&self.key)?;

        if let Some(delta) = self.items.iter().find(|delta| delta.quantity.is_none()) {
            return Err(CartsServiceError::IncorrectData(format!(
                "quantity is required for item {}",
                delta.item_id
            )));
        }

        validate_quantities(&self.items)
    }

    /// A new cart needs at least one line and no deletions.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::EmptyCart`] without lines and
    /// [`CartsServiceError::IncorrectData`] for a zero quantity.
    pub fn validate_for_create(&self) -> Result<(), CartsServiceError> {
        validate_new_lines(&self.items)
    }
}

/// Fast-add of items without pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct AddItemsRequest {
    pub key: CartKey,
    pub order_source: OrderSource,
    pub order_type: Option<OrderType>,
    pub items: Vec<ItemDelta>,
}

impl AddItemsRequest {
    /// # Errors
    ///
    /// Returns [`CartsServiceError::IncorrectData`] for a blank user id or an oversized
    /// quantity, and [`CartsServiceError::EmptyCart`] when there are no lines.
    pub fn validate(&self) -> Result<(), CartsServiceError> {
        validate_key(&self.key)?;

        if self.items.is_empty() {
            return Err(CartsServiceError::EmptyCart);
        }

        validate_quantities(&self.items)
    }

    /// # Errors
    ///
    /// Returns [`CartsServiceError::EmptyCart`] without lines and
    /// [`CartsServiceError::IncorrectData`] when a line deletes from a cart that does not
    /// exist yet.
    pub fn validate_for_create(&self) -> Result<(), CartsServiceError> {
        validate_new_lines(&self.items)
    }
}

fn validate_key(key: &CartKey) -> Result<(), CartsServiceError> {
    if key.user_id.trim().is_empty() {
        return Err(CartsServiceError::IncorrectData(
            "user id must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Largest quantity a cart line can hold; the store keeps quantities as `INTEGER`.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

fn validate_quantities(items: &[ItemDelta]) -> Result<(), CartsServiceError> {
    if let Some(delta) = items
        .iter()
        .find(|delta| delta.quantity.is_some_and(|quantity| quantity > MAX_LINE_QUANTITY))
    {
        return Err(CartsServiceError::IncorrectData(format!(
            "quantity for item {} exceeds {MAX_LINE_QUANTITY}",
            delta.item_id
        )));
    }

    Ok(())
}

fn validate_new_lines(items: &[ItemDelta]) -> Result<(), CartsServiceError> {
    if items.is_empty() {
        return Err(CartsServiceError::EmptyCart);
    }

    if let Some(delta) = items.iter().find(|delta| delta.quantity == Some(0)) {
        return Err(CartsServiceError::IncorrectData(format!(
            "item {} has zero quantity",
            delta.item_id
        )));
    }

    Ok(())
}
