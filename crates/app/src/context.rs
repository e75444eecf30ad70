//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db, PoolOptions},
    domain::{
        carts::{CartsService, PgCartsService},
        shipping::ThresholdShipping,
    },
    gateways::{
        GatewayError, HttpPricingGateway, HttpPromotionGateway, PricingConfig, PromotionsConfig,
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to build gateway client")]
    Gateway(#[source] GatewayError),
}

/// Everything needed to wire the application.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub pool: PoolOptions,
    pub run_migrations: bool,
    pub pricing: PricingConfig,
    pub promotions: PromotionsConfig,
    pub shipping: ThresholdShipping,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
}

impl AppContext {
    /// Build application context from settings.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection, applying migrations or
    /// building a gateway client fails.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database_url, settings.pool)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        if settings.run_migrations {
            db.migrate().await.map_err(AppInitError::Migrations)?;
        }

        let pricing = HttpPricingGateway::new(settings.pricing).map_err(AppInitError::Gateway)?;
        let promotions =
            HttpPromotionGateway::new(settings.promotions).map_err(AppInitError::Gateway)?;

        Ok(Self {
            carts: Arc::new(PgCartsService::from_db(
                db,
                Arc::new(pricing),
                Arc::new(promotions),
                Arc::new(settings.shipping),
            )),
        })
    }
}
