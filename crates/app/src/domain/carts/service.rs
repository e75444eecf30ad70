//! Carts service.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    mem,
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        addresses::models::Address,
        carts::{
            data::{AddItemsRequest, CartRequest},
            errors::CartsServiceError,
            models::{Cart, CartItem, CartSnapshot, CartSummary, CartUuid, ItemId},
            reconcile::{
                ItemSet, MergeMode, Reconciliation, apply_discounts, apply_quotes, reconcile,
            },
            store::{CartStore, CartTransaction, PgCartStore},
            totals::{DiscountBasis, Totals},
        },
        shipping::ShippingPolicy,
    },
    gateways::{
        PricingGateway, PromotionGateway,
        pricing::PriceRequest,
        promotions::{PromotionProduct, PromotionRequest},
    },
};

/// Carts service backed by `PostgreSQL`.
pub type PgCartsService = CartsOrchestrator<PgCartStore>;

impl PgCartsService {
    #[must_use]
    pub fn from_db(
        db: Db,
        pricing: Arc<dyn PricingGateway>,
        promotions: Arc<dyn PromotionGateway>,
        shipping: Arc<dyn ShippingPolicy>,
    ) -> Self {
        Self::new(PgCartStore::new(db), pricing, promotions, shipping)
    }
}

/// Sequences reconciliation, pricing, coupons, addresses, totals and persistence as one
/// unit of work per request.
pub struct CartsOrchestrator<S> {
    store: S,
    pricing: Arc<dyn PricingGateway>,
    promotions: Arc<dyn PromotionGateway>,
    shipping: Arc<dyn ShippingPolicy>,
}

impl<S> CartsOrchestrator<S>
where
    S: CartStore,
{
    #[must_use]
    pub fn new(
        store: S,
        pricing: Arc<dyn PricingGateway>,
        promotions: Arc<dyn PromotionGateway>,
        shipping: Arc<dyn ShippingPolicy>,
    ) -> Self {
        Self {
            store,
            pricing,
            promotions,
            shipping,
        }
    }

    /// Commit or roll back the unit of work. The only place either happens.
    async fn settle<T>(
        tx: S::Tx,
        result: Result<Settled<T>, CartsServiceError>,
    ) -> Result<T, CartsServiceError> {
        match result {
            Ok(settled) => {
                tx.commit().await?;

                match settled {
                    Settled::Done(value) => Ok(value),
                    Settled::Emptied => Err(CartsServiceError::EmptyCart),
                }
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }

                Err(error)
            }
        }
    }

    async fn upsert_in(
        &self,
        tx: &mut S::Tx,
        request: CartRequest,
    ) -> Result<Settled<CartSnapshot>, CartsServiceError> {
        let existing = tx.find_cart(&request.key).await?;
        let created = existing.is_none();

        let mut cart = match existing {
            Some(cart) => cart,
            None => {
                request.validate_for_create()?;

                Cart::open(
                    request.key.clone(),
                    request.order_source,
                    request.order_type.unwrap_or_default(),
                )
            }
        };

        let stage = Stage::ItemReconciliation;
        let previous = mem::take(&mut cart.items);
        let Reconciliation {
            mut merged,
            deleted,
            emptied,
        } = trace_stage(
            stage,
            cart.uuid,
            reconcile(previous, &request.items, MergeMode::Replace).map_err(Into::into),
        )?;

        cart.order_source = request.order_source;
        cart.order_type = request.order_type.unwrap_or(cart.order_type);

        if !request.promo_codes.is_empty() {
            cart.promo_codes = request.promo_codes;
        }

        if !merged.is_empty() {
            trace_stage(stage, cart.uuid, self.price(&cart, &mut merged, created).await)?;
        }

        if let Some(payment_mode) = request.payment_mode {
            cart.payment_mode = Some(payment_mode);
        }

        let (basis, benefits) = if emptied || merged.is_empty() {
            (DiscountBasis::ItemLevel, None)
        } else {
            trace_stage(
                Stage::CouponApplication,
                cart.uuid,
                self.apply_coupons(&cart, &mut merged).await,
            )?
        };

        let shipping_address = trace_stage(
            Stage::AddressResolution,
            cart.uuid,
            resolve_address(tx, &mut cart, request.shipping_address).await,
        )?;

        if emptied {
            cart.empty_out();
        } else {
            cart.totals = trace_stage(
                Stage::TotalsRecomputation,
                cart.uuid,
                Totals::compute(merged.values(), basis, self.shipping.as_ref())
                    .map_err(|error| CartsServiceError::Internal(error.to_string())),
            )?;
        }

        if let Some(freebie) = request.selected_freebie {
            cart.selected_freebie = Some(freebie);
        }

        let items: Vec<CartItem> = merged.into_values().collect();

        trace_stage(
            Stage::Persistence,
            cart.uuid,
            persist(tx, &cart, &items, &deleted).await,
        )?;

        if emptied {
            info!(cart = %cart.uuid, "cart emptied");

            return Ok(Settled::Emptied);
        }

        Ok(Settled::Done(CartSnapshot {
            cart: cart.uuid,
            items,
            totals: cart.totals,
            benefits,
            shipping_address,
        }))
    }

    async fn add_in(
        &self,
        tx: &mut S::Tx,
        request: AddItemsRequest,
    ) -> Result<Settled<CartSummary>, CartsServiceError> {
        let mut cart = match tx.find_cart(&request.key).await? {
            Some(cart) => cart,
            None => {
                request.validate_for_create()?;

                Cart::open(
                    request.key.clone(),
                    request.order_source,
                    request.order_type.unwrap_or_default(),
                )
            }
        };

        let previous = mem::take(&mut cart.items);
        let Reconciliation {
            merged,
            deleted,
            emptied,
        } = trace_stage(
            Stage::ItemReconciliation,
            cart.uuid,
            reconcile(previous, &request.items, MergeMode::Accumulate).map_err(Into::into),
        )?;

        cart.order_type = request.order_type.unwrap_or(cart.order_type);

        if emptied {
            cart.empty_out();
        }

        let items: Vec<CartItem> = merged.into_values().collect();

        trace_stage(
            Stage::Persistence,
            cart.uuid,
            persist(tx, &cart, &items, &deleted).await,
        )?;

        if emptied {
            return Ok(Settled::Emptied);
        }

        Ok(Settled::Done(CartSummary {
            cart: cart.uuid,
            items_count: items.len(),
        }))
    }

    /// Refresh price, availability and delivery class on every line.
    async fn price(
        &self,
        cart: &Cart,
        merged: &mut ItemSet,
        created: bool,
    ) -> Result<(), CartsServiceError> {
        let quotes = self
            .pricing
            .quote(PriceRequest {
                item_ids: merged.keys().copied().collect(),
                order_type: cart.order_type,
            })
            .await
            .map_err(CartsServiceError::from_pricing)?;

        apply_quotes(merged, quotes, created)?;

        Ok(())
    }

    async fn apply_coupons(
        &self,
        cart: &Cart,
        merged: &mut ItemSet,
    ) -> Result<(DiscountBasis, Option<Value>), CartsServiceError> {
        let outcome = self
            .promotions
            .evaluate(PromotionRequest {
                region_id: cart.region_id,
                customer_id: cart.user_id.clone(),
                channel: cart.order_source,
                products: merged
                    .values()
                    .map(|item| PromotionProduct {
                        item_id: item.item_id,
                        quantity: item.quantity,
                        coupon_codes: item.promo_codes.clone(),
                    })
                    .collect(),
                coupon_codes: cart.promo_codes.clone(),
                payment_mode: cart.payment_mode,
            })
            .await
            .map_err(CartsServiceError::from_promotions)?;

        let basis = apply_discounts(merged, &outcome);

        Ok((basis, outcome.benefits))
    }
}

#[async_trait]
impl<S> CartsService for CartsOrchestrator<S>
where
    S: CartStore,
{
    #[tracing::instrument(
        name = "carts.service.upsert_cart",
        skip(self, request),
        fields(region_id = request.key.region_id, user_id = %request.key.user_id),
        err
    )]
    async fn upsert_cart(&self, request: CartRequest) -> Result<CartSnapshot, CartsServiceError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let result = self.upsert_in(&mut tx, request).await;

        Self::settle(tx, result).await
    }

    #[tracing::instrument(
        name = "carts.service.add_items",
        skip(self, request),
        fields(region_id = request.key.region_id, user_id = %request.key.user_id),
        err
    )]
    async fn add_items(&self, request: AddItemsRequest) -> Result<CartSummary, CartsServiceError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let result = self.add_in(&mut tx, request).await;

        Self::settle(tx, result).await
    }

    #[tracing::instrument(name = "carts.service.remove_cart", skip(self), err)]
    async fn remove_cart(&self, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.store.begin().await?;

        let result = match tx.delete_cart(cart).await {
            Ok(0) => Err(CartsServiceError::NotFound),
            Ok(_) => Ok(Settled::Done(())),
            Err(error) => Err(error.into()),
        };

        Self::settle(tx, result).await
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Create the cart for the request's key, or update the open one, fully priced.
    async fn upsert_cart(&self, request: CartRequest) -> Result<CartSnapshot, CartsServiceError>;

    /// Add items without re-pricing. Quantities accumulate onto existing lines.
    async fn add_items(&self, request: AddItemsRequest) -> Result<CartSummary, CartsServiceError>;

    /// Delete a cart with its items and shipment details.
    async fn remove_cart(&self, cart: CartUuid) -> Result<(), CartsServiceError>;
}

/// How a unit of work ends when it commits.
enum Settled<T> {
    Done(T),

    /// The last line was deleted. The emptied cart is committed, then reported.
    Emptied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ItemReconciliation,
    CouponApplication,
    AddressResolution,
    TotalsRecomputation,
    Persistence,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::ItemReconciliation => "item_reconciliation",
            Self::CouponApplication => "coupon_application",
            Self::AddressResolution => "address_resolution",
            Self::TotalsRecomputation => "totals_recomputation",
            Self::Persistence => "persistence",
        })
    }
}

fn trace_stage<T>(
    stage: Stage,
    cart: CartUuid,
    result: Result<T, CartsServiceError>,
) -> Result<T, CartsServiceError> {
    result.inspect_err(|error| match error {
        CartsServiceError::Database(_) | CartsServiceError::Internal(_) => {
            tracing::error!(%cart, %stage, %error, "cart pipeline aborted");
        }
        _ => warn!(%cart, %stage, %error, "cart pipeline aborted"),
    })
}

/// Point the cart at a newly supplied address, or read back the one it already has.
async fn resolve_address<T>(
    tx: &mut T,
    cart: &mut Cart,
    supplied: Option<Address>,
) -> Result<Option<Address>, CartsServiceError>
where
    T: CartTransaction,
{
    if let Some(address) = supplied {
        let normalized = address.normalize();

        cart.shipping_address = Some(tx.resolve_address(&normalized).await?);

        return Ok(Some(normalized.into_address()));
    }

    match &cart.shipping_address {
        Some(hash) => Ok(tx.find_address(hash).await?),
        None => Ok(None),
    }
}

async fn persist<T>(
    tx: &mut T,
    cart: &Cart,
    items: &[CartItem],
    deleted: &ItemSet,
) -> Result<(), CartsServiceError>
where
    T: CartTransaction,
{
    let deletes: Vec<ItemId> = deleted.keys().copied().collect();

    tx.save_cart(cart, items, &deletes).await?;

    Ok(())
}
