//! Cart reconciliation
//!
//! Merges an ordered batch of [`ItemDelta`]s into the lines already on a cart, then folds
//! authoritative prices and discounts back into the merged set.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{
    domain::carts::{
        data::{ItemDelta, MAX_LINE_QUANTITY},
        models::{CartItem, DeliveryClass, ItemId},
        totals::DiscountBasis,
    },
    gateways::{pricing::PriceQuote, promotions::PromotionOutcome},
};

/// Lines keyed by item id.
pub type ItemSet = BTreeMap<ItemId, CartItem>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("item {0} is not in the cart")]
    UnknownItemDeletion(ItemId),

    #[error("item {0} has no quantity")]
    MissingQuantity(ItemId),

    #[error("no pricing record for item {0}")]
    SubscriptionNotFound(ItemId),

    #[error("quantity for item {0} is out of range")]
    QuantityOutOfRange(ItemId),

    #[error("item {item}: requested {requested}, at most {available} available")]
    QuantityNotAvailable {
        item: ItemId,
        requested: u32,
        available: u32,
    },
}

/// How a positive quantity combines with an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The delta's quantity and promo codes overwrite the line. Every delta needs a quantity.
    Replace,

    /// The quantity is added to the line; a missing quantity counts as one.
    Accumulate,
}

/// Outcome of merging deltas into the existing lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    pub merged: ItemSet,
    pub deleted: ItemSet,

    /// A deletion removed the last line. Deltas after it were not applied.
    pub emptied: bool,
}

/// Apply `deltas` in order on top of `existing`.
///
/// # Errors
///
/// Returns [`ReconcileError::UnknownItemDeletion`] when a delta deletes an item that is
/// neither on the cart nor added anywhere in the batch, or that is not present at the point
/// the deletion is applied. Returns [`ReconcileError::MissingQuantity`] for a quantity-less
/// delta in [`MergeMode::Replace`].
pub fn reconcile(
    existing: Vec<CartItem>,
    deltas: &[ItemDelta],
    mode: MergeMode,
) -> Result<Reconciliation, ReconcileError> {
    let mut merged: ItemSet = existing
        .into_iter()
        .map(|item| (item.item_id, item))
        .collect();

    check_deletions(&merged, deltas)?;

    let mut deleted = ItemSet::new();

    for delta in deltas {
        let quantity = match (delta.quantity, mode) {
            (Some(quantity), _) => quantity,
            (None, MergeMode::Accumulate) => 1,
            (None, MergeMode::Replace) => return Err(ReconcileError::MissingQuantity(delta.item_id)),
        };

        if quantity == 0 {
            let removed = merged
                .remove(&delta.item_id)
                .ok_or(ReconcileError::UnknownItemDeletion(delta.item_id))?;

            deleted.insert(delta.item_id, removed);

            if merged.is_empty() {
                return Ok(Reconciliation {
                    merged,
                    deleted,
                    emptied: true,
                });
            }

            continue;
        }

        deleted.remove(&delta.item_id);

        match merged.get_mut(&delta.item_id) {
            Some(line) => {
                match mode {
                    MergeMode::Replace => {
                        line.quantity = quantity;
                        line.promo_codes.clone_from(&delta.promo_codes);
                    }
                    MergeMode::Accumulate => {
                        line.quantity = line
                            .quantity
                            .checked_add(quantity)
                            .filter(|total| *total <= MAX_LINE_QUANTITY)
                            .ok_or(ReconcileError::QuantityOutOfRange(delta.item_id))?;

                        if !delta.promo_codes.is_empty() {
                            line.promo_codes.clone_from(&delta.promo_codes);
                        }
                    }
                }
            }
            None => {
                let mut line = CartItem::requested(delta.item_id, quantity);
                line.discount = Some(Decimal::ZERO);
                line.promo_codes.clone_from(&delta.promo_codes);

                merged.insert(delta.item_id, line);
            }
        }
    }

    Ok(Reconciliation {
        merged,
        deleted,
        emptied: false,
    })
}

/// Deletions of ids that nothing in the batch could have put on the cart.
fn check_deletions(existing: &ItemSet, deltas: &[ItemDelta]) -> Result<(), ReconcileError> {
    let added: FxHashSet<ItemId> = deltas
        .iter()
        .filter(|delta| delta.quantity != Some(0))
        .map(|delta| delta.item_id)
        .collect();

    deltas
        .iter()
        .filter(|delta| delta.quantity == Some(0))
        .find(|delta| !existing.contains_key(&delta.item_id) && !added.contains(&delta.item_id))
        .map_or(Ok(()), |delta| {
            Err(ReconcileError::UnknownItemDeletion(delta.item_id))
        })
}

/// Snapshot pricing onto every line.
///
/// When `transfer_fallback` is set, a quote without a transfer price uses its offer price.
///
/// # Errors
///
/// Returns [`ReconcileError::SubscriptionNotFound`] for a line without a quote, or
/// [`ReconcileError::QuantityNotAvailable`] when a line asks for more than the quote allows.
pub fn apply_quotes(
    items: &mut ItemSet,
    quotes: Vec<PriceQuote>,
    transfer_fallback: bool,
) -> Result<(), ReconcileError> {
    let mut quotes: FxHashMap<ItemId, PriceQuote> =
        quotes.into_iter().map(|quote| (quote.id, quote)).collect();

    for (id, line) in items.iter_mut() {
        let quote = quotes
            .remove(id)
            .ok_or(ReconcileError::SubscriptionNotFound(*id))?;

        if let Some(available) = quote.max_quantity
            && line.quantity > available
        {
            return Err(ReconcileError::QuantityNotAvailable {
                item: *id,
                requested: line.quantity,
                available,
            });
        }

        line.display_price = Some(quote.base_price);
        line.offer_price = Some(quote.offer_price);
        line.transfer_price = quote
            .transfer_price
            .or(transfer_fallback.then_some(quote.offer_price));
        line.delivery_class = Some(DeliveryClass::from_delivery_days(quote.delivery_days));

        if quote.title.is_some() {
            line.title = quote.title;
        }
    }

    Ok(())
}

/// Store per-item discounts and pick the basis for the cart total.
///
/// Lines the promotion service does not mention get a zero discount.
pub fn apply_discounts(items: &mut ItemSet, outcome: &PromotionOutcome) -> DiscountBasis {
    for (id, line) in items.iter_mut() {
        line.discount = Some(
            outcome
                .item_discounts
                .get(id)
                .copied()
                .unwrap_or(Decimal::ZERO),
        );
    }

    match outcome.total_discount {
        Some(total) if outcome.item_discounts.is_empty() => DiscountBasis::CartLevel(total),
        _ => DiscountBasis::ItemLevel,
    }
}
