//! Shipping Config

use clap::Args;
use rust_decimal::Decimal;

/// Shipping charge settings.
#[derive(Debug, Args)]
pub struct ShippingConfig {
    /// Payable amount from which shipping is free
    #[arg(long, env = "SHIPPING_FREE_THRESHOLD", default_value = "500")]
    pub shipping_free_threshold: Decimal,

    /// Charge applied below the free threshold
    #[arg(long, env = "SHIPPING_FLAT_CHARGE", default_value = "30")]
    pub shipping_flat_charge: Decimal,
}
