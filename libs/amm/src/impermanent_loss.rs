//! Impermanent loss estimate for a 50/50 constant product position
//!
//! With `r = current_price / initial_price`, the pooled position is worth
//! `2 * sqrt(r) / (1 + r)` of the held position. The loss is the remainder.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{to_decimal, FixedPointMath, BPS, ONE};
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct ImpermanentLossEstimator;

impl ImpermanentLossEstimator {
    /// Loss fraction `1 - 2*sqrt(r)/(1+r)` in fixed point
    pub fn quote_impermanent_loss(initial_price: U256, current_price: U256) -> MathResult<U256> {
        if initial_price.is_zero() {
            return Err(MathError::domain(
                "quote_impermanent_loss",
                "initial price is zero",
            ));
        }

        let ratio = FixedPointMath::mul_div(current_price, ONE, initial_price)?;
        let sqrt_ratio = FixedPointMath::sqrt_fixed(ratio)?;

        let numerator = FixedPointMath::checked_mul(sqrt_ratio, U256::from(2u64), "quote_impermanent_loss")?;
        let denominator = FixedPointMath::checked_add(ONE, ratio, "quote_impermanent_loss")?;
        let value_retained = FixedPointMath::mul_div(numerator, ONE, denominator)?;

        // AM-GM keeps value_retained <= 1; truncation only lowers it further
        Ok(ONE.saturating_sub(value_retained))
    }

    /// Loss in basis points
    pub fn quote_impermanent_loss_bps(initial_price: U256, current_price: U256) -> MathResult<U256> {
        let loss = Self::quote_impermanent_loss(initial_price, current_price)?;
        FixedPointMath::mul_div(loss, BPS, ONE)
    }

    /// Loss as a percentage for display
    pub fn quote_impermanent_loss_pct(
        initial_price: U256,
        current_price: U256,
    ) -> MathResult<Decimal> {
        let loss = Self::quote_impermanent_loss(initial_price, current_price)?;
        // loss <= 1.0, always within Decimal range
        Ok(to_decimal(loss).unwrap_or(Decimal::ONE) * dec!(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::from_whole;

    #[test]
    fn test_no_loss_without_divergence() {
        for price in [U256::one(), from_whole(1), from_whole(1850), U256::from(7u64)] {
            assert_eq!(
                ImpermanentLossEstimator::quote_impermanent_loss(price, price).unwrap(),
                U256::zero()
            );
        }
    }

    #[test]
    fn test_price_doubling() {
        // 1 - 2*sqrt(2)/3 = 0.057190958...
        let loss =
            ImpermanentLossEstimator::quote_impermanent_loss(from_whole(100), from_whole(200))
                .unwrap();
        let expected = U256::from(57_190_958_417_936_634u64);
        let diff = if loss > expected { loss - expected } else { expected - loss };
        assert!(diff <= U256::from(10u64), "loss {}", loss);

        assert_eq!(
            ImpermanentLossEstimator::quote_impermanent_loss_bps(from_whole(100), from_whole(200))
                .unwrap(),
            U256::from(571u64)
        );
    }

    #[test]
    fn test_symmetric_in_direction() {
        // Price halving loses the same fraction as doubling
        let up = ImpermanentLossEstimator::quote_impermanent_loss_bps(from_whole(10), from_whole(20))
            .unwrap();
        let down = ImpermanentLossEstimator::quote_impermanent_loss_bps(from_whole(20), from_whole(10))
            .unwrap();
        assert_eq!(up, down);
    }

    #[test]
    fn test_total_collapse() {
        let loss =
            ImpermanentLossEstimator::quote_impermanent_loss(from_whole(5), U256::zero()).unwrap();
        assert_eq!(loss, ONE);
    }

    #[test]
    fn test_zero_initial_price() {
        assert!(matches!(
            ImpermanentLossEstimator::quote_impermanent_loss(U256::zero(), from_whole(1)),
            Err(MathError::DomainError { .. })
        ));
    }

    #[test]
    fn test_percentage_display() {
        let pct =
            ImpermanentLossEstimator::quote_impermanent_loss_pct(from_whole(1), from_whole(4))
                .unwrap();
        // r = 4: 1 - 4/5 = 20%
        assert_eq!(pct, dec!(20));
    }
}
