//! Addresses Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::addresses::models::{Address, AddressHash, NormalizedAddress};

const RESOLVE_ADDRESS_SQL: &str = include_str!("sql/resolve_address.sql");
const FIND_ADDRESS_SQL: &str = include_str!("sql/find_address.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAddressesRepository;

impl PgAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the address unless an identical one is already stored.
    pub(crate) async fn resolve_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: &NormalizedAddress,
    ) -> Result<AddressHash, sqlx::Error> {
        let hash = address.hash();
        let fields = address.as_address();

        query(RESOLVE_ADDRESS_SQL)
            .bind(hash.as_str())
            .bind(&fields.name)
            .bind(&fields.mobile)
            .bind(&fields.street)
            .bind(&fields.city)
            .bind(&fields.pincode)
            .bind(&fields.state)
            .bind(fields.email.as_deref())
            .bind(fields.landmark.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(hash)
    }

    pub(crate) async fn find_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hash: &AddressHash,
    ) -> Result<Option<Address>, sqlx::Error> {
        query_as::<Postgres, Address>(FIND_ADDRESS_SQL)
            .bind(hash.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Address {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            mobile: row.try_get("mobile")?,
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            pincode: row.try_get("pincode")?,
            state: row.try_get("state")?,
            email: row.try_get("email")?,
            landmark: row.try_get("landmark")?,
        })
    }
}
