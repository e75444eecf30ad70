//! Clients for the pricing and promotion services.

mod errors;
pub mod pricing;
pub mod promotions;

pub use errors::GatewayError;
pub use pricing::{HttpPricingGateway, PricingConfig, PricingGateway};
pub use promotions::{HttpPromotionGateway, PromotionGateway, PromotionsConfig};

use std::time::Duration;

use reqwest::Client;

fn http_client(timeout: Duration) -> Result<Client, GatewayError> {
    Ok(Client::builder().timeout(timeout).build()?)
}
