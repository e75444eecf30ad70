//! Server configuration module

use std::time::Duration;

use clap::Parser;

use orderly_app::{
    context::AppSettings,
    database::PoolOptions,
    domain::shipping::ThresholdShipping,
    gateways::{PricingConfig, PromotionsConfig},
};

use crate::config::{
    db::DatabaseConfig, gateways::GatewaysConfig, logging::LoggingConfig,
    server::ServerRuntimeConfig, shipping::ShippingConfig,
};

pub(crate) mod db;
pub(crate) mod gateways;
pub(crate) mod logging;
pub(crate) mod server;
pub(crate) mod shipping;

pub(crate) use logging::LogFormat;

/// Orderly JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "orderly-json", about = "Orderly JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Pricing and promotion service settings.
    #[command(flatten)]
    pub gateways: GatewaysConfig,

    /// Shipping charge settings.
    #[command(flatten)]
    pub shipping: ShippingConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings used to wire the application context.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        let timeout = Duration::from_secs(self.gateways.gateway_timeout_seconds);

        AppSettings {
            database_url: self.database.database_url.clone(),
            pool: PoolOptions {
                max_connections: self.database.database_max_connections,
                acquire_timeout: Duration::from_secs(
                    self.database.database_acquire_timeout_seconds,
                ),
            },
            run_migrations: self.database.run_migrations,
            pricing: PricingConfig {
                url: self.gateways.pricing_url.clone(),
                select_fields: self.gateways.pricing_select_fields.clone(),
                timeout,
            },
            promotions: PromotionsConfig {
                url: self.gateways.promotions_url.clone(),
                api_user: self.gateways.promotions_api_user.clone(),
                api_token: self.gateways.promotions_api_token.clone(),
                timeout,
            },
            shipping: ThresholdShipping {
                free_above: self.shipping.shipping_free_threshold,
                flat_charge: self.shipping.shipping_flat_charge,
            },
        }
    }
}
