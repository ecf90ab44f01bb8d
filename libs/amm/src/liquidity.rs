//! LP share accounting for deposits and withdrawals

use crate::error::{MathError, MathResult};
use crate::fixed_point::FixedPointMath;
use primitive_types::U256;
use tidepool_config::protocol::MINIMUM_LIQUIDITY;
use tracing::debug;

/// Share units locked forever by the first deposit
pub const MINIMUM_LIQUIDITY_SHARES: U256 = U256([MINIMUM_LIQUIDITY, 0, 0, 0]);

/// Share mint and burn quoting
pub struct LiquidityAccountant;

impl LiquidityAccountant {
    /// Shares for the first deposit into an empty pool
    ///
    /// The geometric mean `sqrt(amount_a * amount_b)` sets the initial share
    /// price. The returned amount excludes `MINIMUM_LIQUIDITY_SHARES`, which
    /// the caller must retire.
    pub fn quote_mint_first_deposit(amount_a: U256, amount_b: U256) -> MathResult<U256> {
        let product = FixedPointMath::checked_mul(amount_a, amount_b, "quote_mint_first_deposit")?;
        let geometric_mean = FixedPointMath::sqrt(product);
        if geometric_mean <= MINIMUM_LIQUIDITY_SHARES {
            return Err(MathError::InsufficientInitialLiquidity {
                geometric_mean,
                minimum: MINIMUM_LIQUIDITY_SHARES,
            });
        }
        Ok(geometric_mean - MINIMUM_LIQUIDITY_SHARES)
    }

    /// Shares for a deposit into a funded pool
    ///
    /// Takes the smaller of the two proportional claims, so an unbalanced
    /// deposit is credited only for the scarcer side.
    pub fn quote_mint_subsequent(
        amount_a: U256,
        amount_b: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<U256> {
        if reserve_a.is_zero() || reserve_b.is_zero() || total_shares.is_zero() {
            return Err(MathError::liquidity(
                "empty pool must be funded through the first-deposit path",
            ));
        }

        let shares_a = FixedPointMath::mul_div(amount_a, total_shares, reserve_a)?;
        let shares_b = FixedPointMath::mul_div(amount_b, total_shares, reserve_b)?;
        let shares = shares_a.min(shares_b);
        if shares.is_zero() {
            return Err(MathError::liquidity("deposit too small to mint any shares"));
        }

        if shares_a != shares_b {
            debug!(%shares_a, %shares_b, "unbalanced deposit credited for the scarcer side");
        }
        Ok(shares)
    }

    /// Assets returned for burning `shares`, strictly proportional
    pub fn quote_burn(
        shares: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<(U256, U256)> {
        if shares.is_zero() || shares > total_shares {
            return Err(MathError::InsufficientShares {
                requested: shares,
                outstanding: total_shares,
            });
        }

        let amount_a = FixedPointMath::mul_div(shares, reserve_a, total_shares)?;
        let amount_b = FixedPointMath::mul_div(shares, reserve_b, total_shares)?;
        Ok((amount_a, amount_b))
    }

    /// Amount of B that matches `amount_a` at the current reserve ratio
    pub fn quote_matching_amount(
        amount_a: U256,
        reserve_a: U256,
        reserve_b: U256,
    ) -> MathResult<U256> {
        if amount_a.is_zero() {
            return Err(MathError::liquidity("deposit amount is zero"));
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(MathError::liquidity("pool reserves must be positive"));
        }
        FixedPointMath::mul_div(amount_a, reserve_b, reserve_a)
    }
}
