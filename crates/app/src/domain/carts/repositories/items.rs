//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::carts::models::{CartItem, CartUuid, DeliveryClass, ItemId};

use super::carts::{column_decode, try_get_parsed_opt};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        query_as::<Postgres, CartItem>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: &CartItem,
    ) -> Result<(), sqlx::Error> {
        let quantity = i32::try_from(item.quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        query(UPSERT_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(encode_item_id(item.item_id)?)
            .bind(quantity)
            .bind(item.display_price)
            .bind(item.offer_price)
            .bind(item.transfer_price)
            .bind(item.discount)
            .bind(item.delivery_class.map(DeliveryClass::as_str))
            .bind(item.title.as_deref())
            .bind(&item.promo_codes)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        items: &[ItemId],
    ) -> Result<u64, sqlx::Error> {
        let ids = items
            .iter()
            .map(|id| encode_item_id(*id))
            .collect::<Result<Vec<_>, _>>()?;

        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .bind(ids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn encode_item_id(id: ItemId) -> Result<i64, sqlx::Error> {
    i64::try_from(id.0).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let item_id: i64 = row.try_get("item_id")?;
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            item_id: ItemId(u64::try_from(item_id).map_err(|e| column_decode("item_id", e))?),
            quantity: u32::try_from(quantity).map_err(|e| column_decode("quantity", e))?,
            display_price: row.try_get("display_price")?,
            offer_price: row.try_get("offer_price")?,
            transfer_price: row.try_get("transfer_price")?,
            discount: row.try_get("item_discount")?,
            delivery_class: try_get_parsed_opt(row, "delivery_class")?,
            title: row.try_get("title")?,
            promo_codes: row.try_get("promo_codes")?,
        })
    }
}
