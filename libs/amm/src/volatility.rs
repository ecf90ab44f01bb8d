//! Realized volatility from a price series
//!
//! Produces the `price_volatility_bps` input of the fee model: the sample
//! standard deviation of log returns, scaled by `sqrt(periods)`.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{FixedPointMath, BPS, ONE};
use primitive_types::U256;

pub struct VolatilityEstimator;

impl VolatilityEstimator {
    /// Realized volatility in basis points
    ///
    /// `periods` annualizes (365 for daily prices); pass 1 for the raw
    /// per-observation figure. Needs at least three prices so the sample
    /// variance has two returns.
    pub fn realized_volatility_bps(prices: &[U256], periods: u64) -> MathResult<U256> {
        if prices.len() < 3 {
            return Err(MathError::domain(
                "realized_volatility_bps",
                "at least three prices are required",
            ));
        }
        if periods == 0 {
            return Err(MathError::domain(
                "realized_volatility_bps",
                "annualization periods must be positive",
            ));
        }

        let returns = Self::log_returns(prices)?;
        let count = returns.len() as i128;

        let mut total: i128 = 0;
        for value in &returns {
            total = total
                .checked_add(*value)
                .ok_or(MathError::overflow("realized_volatility_bps"))?;
        }
        let mean = total / count;

        // Squared deviations carry a 10^36 scale, so the root lands on 10^18
        let mut squared_sum = U256::zero();
        for value in &returns {
            let deviation = U256::from(value.abs_diff(mean));
            let squared = FixedPointMath::checked_mul(deviation, deviation, "realized_volatility_bps")?;
            squared_sum =
                FixedPointMath::checked_add(squared_sum, squared, "realized_volatility_bps")?;
        }

        let variance = FixedPointMath::mul_div(
            squared_sum,
            U256::from(periods),
            U256::from(returns.len() - 1),
        )?;
        let deviation = FixedPointMath::sqrt(variance);
        FixedPointMath::mul_div(deviation, BPS, ONE)
    }

    /// `ln(p[i] / p[i-1])` for each consecutive pair, as signed fixed point
    fn log_returns(prices: &[U256]) -> MathResult<Vec<i128>> {
        prices
            .windows(2)
            .map(|pair| {
                if pair[0].is_zero() || pair[1].is_zero() {
                    return Err(MathError::domain(
                        "realized_volatility_bps",
                        "prices must be positive",
                    ));
                }
                let ratio = FixedPointMath::mul_div(pair[1], ONE, pair[0])?;
                FixedPointMath::ln(ratio)?.to_i128()
            })
            .collect()
    }
}
