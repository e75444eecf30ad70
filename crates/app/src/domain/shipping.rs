//! Shipping charge policies.

use rust_decimal::Decimal;

/// Computes the shipping charge for a cart from its offer subtotal and discount.
///
/// Implementations must be pure: the same inputs always produce the same charge.
pub trait ShippingPolicy: Send + Sync {
    fn charge(&self, subtotal: Decimal, discount: Decimal) -> Decimal;
}

impl<F> ShippingPolicy for F
where
    F: Fn(Decimal, Decimal) -> Decimal + Send + Sync,
{
    fn charge(&self, subtotal: Decimal, discount: Decimal) -> Decimal {
        self(subtotal, discount)
    }
}

/// Flat fee below a free-shipping threshold on the payable amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdShipping {
    pub free_above: Decimal,
    pub flat_charge: Decimal,
}

impl Default for ThresholdShipping {
    fn default() -> Self {
        Self {
            free_above: Decimal::from(500),
            flat_charge: Decimal::from(30),
        }
    }
}

impl ShippingPolicy for ThresholdShipping {
    fn charge(&self, subtotal: Decimal, discount: Decimal) -> Decimal {
        if subtotal.is_zero() {
            return Decimal::ZERO;
        }

        // Only a negative discount can push the payable amount past the range, upwards.
        let payable_clears_threshold = subtotal
            .checked_sub(discount)
            .map_or(discount.is_sign_negative(), |payable| payable >= self.free_above);

        if payable_clears_threshold {
            Decimal::ZERO
        } else {
            self.flat_charge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_orders_pay_the_flat_charge() {
        let policy = ThresholdShipping::default();

        assert_eq!(policy.charge(Decimal::from(120), Decimal::ZERO), Decimal::from(30));
    }

    #[test]
    fn discount_counts_against_the_threshold() {
        let policy = ThresholdShipping::default();

        assert_eq!(policy.charge(Decimal::from(520), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(policy.charge(Decimal::from(520), Decimal::from(40)), Decimal::from(30));
    }

    #[test]
    fn out_of_range_payable_amounts_do_not_panic() {
        let policy = ThresholdShipping::default();

        assert_eq!(policy.charge(Decimal::MAX, Decimal::MIN), Decimal::ZERO);
        assert_eq!(policy.charge(Decimal::MIN, Decimal::MAX), Decimal::from(30));
    }

    #[test]
    fn nothing_to_ship_costs_nothing() {
        let policy = ThresholdShipping::default();

        assert_eq!(policy.charge(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn closures_are_policies() {
        let policy = |subtotal: Decimal, _discount: Decimal| subtotal / Decimal::from(10);

        assert_eq!(policy.charge(Decimal::from(70), Decimal::ZERO), Decimal::from(7));
    }
}
