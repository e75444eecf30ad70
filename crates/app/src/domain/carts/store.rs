//! Transactional access to carts, items and addresses.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        addresses::{
            models::{Address, AddressHash, NormalizedAddress},
            repository::PgAddressesRepository,
        },
        carts::{
            data::CartKey,
            models::{Cart, CartItem, CartUuid, ItemId},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
    },
};

/// Opens units of work against cart storage.
#[async_trait]
pub trait CartStore: Send + Sync {
    type Tx: CartTransaction;

    /// Begin a unit of work. Nothing it stages is visible until [`CartTransaction::commit`].
    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;
}

/// A single unit of work. Dropping it without committing discards every staged write.
#[async_trait]
pub trait CartTransaction: Send {
    /// The open cart for `key` with its items, if any.
    async fn find_cart(&mut self, key: &CartKey) -> Result<Option<Cart>, sqlx::Error>;

    /// Stage the cart row, every upserted item and every deleted item.
    async fn save_cart(
        &mut self,
        cart: &Cart,
        upserts: &[CartItem],
        deletes: &[ItemId],
    ) -> Result<(), sqlx::Error>;

    /// Stage removal of a cart with its items and shipment details. Returns rows removed.
    async fn delete_cart(&mut self, cart: CartUuid) -> Result<u64, sqlx::Error>;

    /// Insert the address unless it is already stored; returns its hash.
    async fn resolve_address(
        &mut self,
        address: &NormalizedAddress,
    ) -> Result<AddressHash, sqlx::Error>;

    async fn find_address(&mut self, hash: &AddressHash) -> Result<Option<Address>, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
}

impl PgCartStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    type Tx = PgCartTransaction;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error> {
        Ok(PgCartTransaction {
            tx: self.db.begin().await?,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            addresses: PgAddressesRepository::new(),
        })
    }
}

pub struct PgCartTransaction {
    tx: Transaction<'static, Postgres>,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    addresses: PgAddressesRepository,
}

impl Debug for PgCartTransaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgCartTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl CartTransaction for PgCartTransaction {
    async fn find_cart(&mut self, key: &CartKey) -> Result<Option<Cart>, sqlx::Error> {
        let Some(mut cart) = self.carts.find_cart(&mut self.tx, key).await? else {
            return Ok(None);
        };

        cart.items = self.items.get_cart_items(&mut self.tx, cart.uuid).await?;

        Ok(Some(cart))
    }

    async fn save_cart(
        &mut self,
        cart: &Cart,
        upserts: &[CartItem],
        deletes: &[ItemId],
    ) -> Result<(), sqlx::Error> {
        self.carts.save_cart(&mut self.tx, cart).await?;

        if !deletes.is_empty() {
            self.items
                .delete_cart_items(&mut self.tx, cart.uuid, deletes)
                .await?;
        }

        for item in upserts {
            self.items
                .upsert_cart_item(&mut self.tx, cart.uuid, item)
                .await?;
        }

        Ok(())
    }

    async fn delete_cart(&mut self, cart: CartUuid) -> Result<u64, sqlx::Error> {
        self.carts.delete_cart(&mut self.tx, cart).await
    }

    async fn resolve_address(
        &mut self,
        address: &NormalizedAddress,
    ) -> Result<AddressHash, sqlx::Error> {
        self.addresses.resolve_address(&mut self.tx, address).await
    }

    async fn find_address(&mut self, hash: &AddressHash) -> Result<Option<Address>, sqlx::Error> {
        self.addresses.find_address(&mut self.tx, hash).await
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::carts::{errors::CartsServiceError, models::PaymentMode, totals::Totals},
        test::{TestDb, address, key, priced_item, stored_cart},
    };

    use super::*;

    async fn save(store: &PgCartStore, cart: &Cart) -> TestResult {
        let mut tx = store.begin().await?;
        tx.save_cart(cart, &cart.items, &[]).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn reload(store: &PgCartStore) -> Result<Option<Cart>, sqlx::Error> {
        let mut tx = store.begin().await?;
        let cart = tx.find_cart(&key()).await?;
        tx.rollback().await?;

        Ok(cart)
    }

    async fn count(db: &TestDb, table: &str, cart: CartUuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!("SELECT count(*) FROM {table} WHERE cart_uuid = $1"))
            .bind(cart.into_uuid())
            .fetch_one(db.pool())
            .await
    }

    #[tokio::test]
    async fn saved_carts_read_back_with_their_items() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let mut cart = stored_cart(vec![priced_item(2, 1, 50), priced_item(1, 3, 10)]);
        cart.payment_mode = Some(PaymentMode::Prepaid);
        cart.selected_freebie = Some("FREE-TOTE".to_string());
        cart.items[0].promo_codes = vec!["RICE10".to_string()];
        cart.totals.discount = Decimal::new(125, 1);

        save(&store, &cart).await?;

        let found = reload(&store).await?.ok_or("cart should be found")?;

        assert_eq!(found.uuid, cart.uuid);
        assert_eq!(found.key(), key());
        assert_eq!(found.order_type, cart.order_type);
        assert_eq!(found.order_source, cart.order_source);
        assert_eq!(found.payment_mode, Some(PaymentMode::Prepaid));
        assert_eq!(found.promo_codes, cart.promo_codes);
        assert_eq!(found.selected_freebie.as_deref(), Some("FREE-TOTE"));
        assert_eq!(found.totals, cart.totals);

        let mut expected = cart.items.clone();
        expected.sort_by_key(|item| item.item_id);
        assert_eq!(found.items, expected);

        Ok(())
    }

    #[tokio::test]
    async fn missing_carts_are_none() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        assert_eq!(reload(&store).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn saving_applies_upserts_and_deletes() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let cart = stored_cart(vec![priced_item(1, 1, 10), priced_item(2, 1, 20)]);
        save(&store, &cart).await?;

        let mut tx = store.begin().await?;
        tx.save_cart(&cart, &[priced_item(1, 5, 10), priced_item(3, 2, 30)], &[ItemId(2)])
            .await?;
        tx.commit().await?;

        let found = reload(&store).await?.ok_or("cart should be found")?;

        assert_eq!(found.items, vec![priced_item(1, 5, 10), priced_item(3, 2, 30)]);

        Ok(())
    }

    #[tokio::test]
    async fn rolled_back_writes_leave_rows_unchanged() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let cart = stored_cart(vec![priced_item(1, 1, 10), priced_item(2, 1, 20)]);
        save(&store, &cart).await?;

        let mut changed = cart.clone();
        changed.totals = Totals::ZERO;
        changed.promo_codes.clear();

        let mut tx = store.begin().await?;
        tx.save_cart(&changed, &[priced_item(1, 9, 10)], &[ItemId(2)]).await?;
        tx.rollback().await?;

        let found = reload(&store).await?.ok_or("cart should survive")?;

        assert_eq!(found.totals, cart.totals);
        assert_eq!(found.promo_codes, cart.promo_codes);
        assert_eq!(found.items, cart.items);

        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_cart_cascades_to_items_and_shipments() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let cart = stored_cart(vec![priced_item(1, 1, 10), priced_item(2, 1, 20)]);
        save(&store, &cart).await?;

        sqlx::query("INSERT INTO order_shipment_details (uuid, cart_uuid) VALUES ($1, $2)")
            .bind(uuid::Uuid::now_v7())
            .bind(cart.uuid.into_uuid())
            .execute(db.pool())
            .await?;

        let mut tx = store.begin().await?;
        assert_eq!(tx.delete_cart(cart.uuid).await?, 1);
        tx.commit().await?;

        assert_eq!(reload(&store).await?, None);
        assert_eq!(count(&db, "cart_items", cart.uuid).await?, 0);
        assert_eq!(count(&db, "order_shipment_details", cart.uuid).await?, 0);

        let mut tx = store.begin().await?;
        assert_eq!(tx.delete_cart(cart.uuid).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn resolving_an_address_twice_stores_it_once() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let normalized = address().normalize();

        let mut tx = store.begin().await?;
        let first = tx.resolve_address(&normalized).await?;
        let second = tx.resolve_address(&address().normalize()).await?;
        tx.commit().await?;

        assert_eq!(first, second);
        assert_eq!(first, normalized.hash());

        let stored: i64 = sqlx::query_scalar("SELECT count(*) FROM addresses")
            .fetch_one(db.pool())
            .await?;
        assert_eq!(stored, 1);

        let mut tx = store.begin().await?;
        let found = tx.find_address(&first).await?;

        assert_eq!(found.as_ref(), Some(normalized.as_address()));

        Ok(())
    }

    #[tokio::test]
    async fn carts_reference_their_shipping_address() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let mut cart = stored_cart(vec![priced_item(1, 1, 10)]);

        let mut tx = store.begin().await?;
        cart.shipping_address = Some(tx.resolve_address(&address().normalize()).await?);
        tx.save_cart(&cart, &cart.items, &[]).await?;
        tx.commit().await?;

        let found = reload(&store).await?.ok_or("cart should be found")?;

        assert_eq!(found.shipping_address, cart.shipping_address);

        Ok(())
    }

    #[tokio::test]
    async fn a_second_cart_for_the_same_key_is_a_database_error() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        save(&store, &stored_cart(vec![priced_item(1, 1, 10)])).await?;

        let rival = stored_cart(vec![priced_item(2, 1, 10)]);

        let mut tx = store.begin().await?;
        let error = tx
            .save_cart(&rival, &rival.items, &[])
            .await
            .expect_err("unique key should reject the rival cart");

        assert!(matches!(
            CartsServiceError::from(error),
            CartsServiceError::Database(_)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn non_positive_quantities_are_rejected_by_the_store() -> TestResult {
        let db = TestDb::new().await;
        let store = PgCartStore::new(db.db());

        let mut cart = stored_cart(vec![priced_item(1, 1, 10)]);
        cart.items[0].quantity = 0;

        let mut tx = store.begin().await?;
        let error = tx
            .save_cart(&cart, &cart.items, &[])
            .await
            .expect_err("check constraint should reject a zero quantity");

        assert!(matches!(
            CartsServiceError::from(error),
            CartsServiceError::IncorrectData(_)
        ));

        Ok(())
    }
}
