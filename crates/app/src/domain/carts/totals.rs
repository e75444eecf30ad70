//! Cart totals

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{
    carts::models::{CartItem, ItemId},
    shipping::ShippingPolicy,
};

/// Monetary aggregates held on a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub display_price: Decimal,
    pub offer_price: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
}

/// Why the aggregates could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("item {0} has no price")]
    Unpriced(ItemId),

    #[error("totals overflow at item {0}")]
    Overflow(ItemId),
}

/// Where the cart discount comes from.
///
/// The promotion service either attributes its discount to individual items or reports a
/// single cart-level amount. Exactly one of the two feeds the cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountBasis {
    /// Sum of the per-item discounts.
    #[default]
    ItemLevel,

    /// A single discount reported for the whole cart.
    CartLevel(Decimal),
}

impl Totals {
    pub const ZERO: Self = Self {
        display_price: Decimal::ZERO,
        offer_price: Decimal::ZERO,
        discount: Decimal::ZERO,
        shipping: Decimal::ZERO,
    };

    /// Recompute the aggregates over the final item set, then the shipping charge.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Unpriced`] for the first item without a display or offer price
    /// and [`TotalsError::Overflow`] when a sum leaves the representable range.
    pub fn compute<'a, I>(
        items: I,
        basis: DiscountBasis,
        shipping: &dyn ShippingPolicy,
    ) -> Result<Self, TotalsError>
    where
        I: IntoIterator<Item = &'a CartItem>,
    {
        let mut totals = Self::ZERO;

        for item in items {
            let (Some(display_price), Some(offer_price)) = (item.display_price, item.offer_price)
            else {
                return Err(TotalsError::Unpriced(item.item_id));
            };

            let quantity = Decimal::from(item.quantity);
            let overflow = TotalsError::Overflow(item.item_id);

            totals.display_price = display_price
                .checked_mul(quantity)
                .and_then(|line| totals.display_price.checked_add(line))
                .ok_or(overflow)?;
            totals.offer_price = offer_price
                .checked_mul(quantity)
                .and_then(|line| totals.offer_price.checked_add(line))
                .ok_or(overflow)?;
            totals.discount = totals
                .discount
                .checked_add(item.discount.unwrap_or(Decimal::ZERO))
                .ok_or(overflow)?;
        }

        if let DiscountBasis::CartLevel(discount) = basis {
            totals.discount = discount;
        }

        totals.shipping = shipping.charge(totals.offer_price, totals.discount);

        Ok(totals)
    }
}
