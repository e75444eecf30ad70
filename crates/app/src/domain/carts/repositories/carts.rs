//! Carts Repository

use std::{error::Error as StdError, str::FromStr};

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    addresses::models::AddressHash,
    carts::{
        data::CartKey,
        models::{Cart, CartUuid, PaymentMode},
        totals::Totals,
    },
};

const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const SAVE_CART_SQL: &str = include_str!("../sql/save_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Find the open cart for `key`, locking its row for the rest of the transaction.
    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: &CartKey,
    ) -> Result<Option<Cart>, sqlx::Error> {
        query_as::<Postgres, Cart>(FIND_CART_SQL)
            .bind(key.region_id)
            .bind(&key.user_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &Cart,
    ) -> Result<(), sqlx::Error> {
        query(SAVE_CART_SQL)
            .bind(cart.uuid.into_uuid())
            .bind(cart.region_id)
            .bind(&cart.user_id)
            .bind(cart.order_type.as_str())
            .bind(cart.order_source.as_str())
            .bind(cart.payment_mode.map(PaymentMode::as_str))
            .bind(&cart.promo_codes)
            .bind(cart.shipping_address.as_ref().map(AddressHash::as_str))
            .bind(cart.selected_freebie.as_deref())
            .bind(cart.totals.display_price)
            .bind(cart.totals.offer_price)
            .bind(cart.totals.discount)
            .bind(cart.totals.shipping)
            .bind(SqlxTimestamp::from(cart.created_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Delete a cart. Items and shipment details go with it.
    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            region_id: row.try_get("region_id")?,
            user_id: row.try_get("user_id")?,
            order_type: try_get_parsed(row, "order_type")?,
            order_source: try_get_parsed(row, "order_source")?,
            payment_mode: try_get_parsed_opt(row, "payment_mode")?,
            promo_codes: row.try_get("promo_codes")?,
            shipping_address: row
                .try_get::<Option<String>, _>("shipping_address_hash")?
                .map(AddressHash::from_stored),
            selected_freebie: row.try_get("selected_freebie")?,
            totals: Totals {
                display_price: row.try_get::<Decimal, _>("total_display_price")?,
                offer_price: row.try_get::<Decimal, _>("total_offer_price")?,
                discount: row.try_get::<Decimal, _>("total_discount")?,
                shipping: row.try_get::<Decimal, _>("total_shipping_charges")?,
            },
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

pub(super) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| column_decode(col, e))
}

pub(super) fn try_get_parsed_opt<T>(row: &PgRow, col: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    row.try_get::<Option<String>, _>(col)?
        .map(|value| value.parse().map_err(|e| column_decode(col, e)))
        .transpose()
}

pub(super) fn column_decode(
    col: &str,
    source: impl StdError + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(source),
    }
}
