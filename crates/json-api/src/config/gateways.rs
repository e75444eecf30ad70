//! Gateway Config

use clap::Args;

use orderly_app::gateways::pricing::DEFAULT_SELECT_FIELDS;

/// Pricing and promotion service settings.
#[derive(Debug, Args)]
pub struct GatewaysConfig {
    /// Calculate-price endpoint URL
    #[arg(long, env = "PRICING_URL")]
    pub pricing_url: String,

    /// Catalogue fields requested from the pricing service
    #[arg(
        long,
        env = "PRICING_SELECT_FIELDS",
        value_delimiter = ',',
        default_values_t = DEFAULT_SELECT_FIELDS.map(String::from)
    )]
    pub pricing_select_fields: Vec<String>,

    /// Coupon check endpoint URL
    #[arg(long, env = "PROMOTIONS_URL")]
    pub promotions_url: String,

    /// Coupon service API user
    #[arg(long, env = "PROMOTIONS_API_USER", default_value = "")]
    pub promotions_api_user: String,

    /// Coupon service API token
    #[arg(long, env = "PROMOTIONS_API_TOKEN", default_value = "", hide_env_values = true)]
    pub promotions_api_token: String,

    /// Timeout for each upstream call, in seconds
    #[arg(long, env = "GATEWAY_TIMEOUT_SECONDS", default_value_t = 10)]
    pub gateway_timeout_seconds: u64,
}
