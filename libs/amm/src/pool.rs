//! Constant product (x*y=k) swap math
//!
//! Fees are taken from the input before the curve is applied, so the
//! invariant `reserve_in * reserve_out` never decreases across a swap.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{bps_to_percent, FixedPointMath, BPS};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tidepool_config::protocol::{BPS_DENOMINATOR, DEFAULT_SWAP_FEE_BPS};
use tracing::trace;

/// Complete result of a swap computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_out: U256,
    pub effective_fee_bps: U256,
    /// Shortfall against the zero-slippage quote `amount_in * reserve_out / reserve_in`
    pub price_impact_bps: U256,
}

impl SwapQuote {
    /// Price impact as a percentage for display
    pub fn price_impact_pct(&self) -> Decimal {
        bps_to_percent(self.price_impact_bps).unwrap_or(Decimal::ONE_HUNDRED)
    }
}

/// Largest input within a price impact budget, and what it buys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_amount: U256,
    pub expected_output: U256,
    pub price_impact_bps: U256,
}

/// Constant product swap quoting
pub struct ConstantProductPool;

impl ConstantProductPool {
    /// Quote an exact-input swap
    ///
    /// `amount_in_net = amount_in * (10000 - fee_bps) / 10000`
    /// `amount_out = amount_in_net * reserve_out / (reserve_in + amount_in_net)`
    pub fn quote_swap(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: U256,
    ) -> MathResult<SwapQuote> {
        if amount_in.is_zero() {
            return Err(MathError::liquidity("swap input amount is zero"));
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(MathError::liquidity("pool reserves must be positive"));
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps, "quote_swap")?;

        let amount_in_net = FixedPointMath::mul_div(amount_in, fee_multiplier, BPS)?;
        let denominator = FixedPointMath::checked_add(reserve_in, amount_in_net, "quote_swap")?;
        let amount_out = FixedPointMath::mul_div(amount_in_net, reserve_out, denominator)?;

        let price_impact_bps =
            Self::price_impact_bps(amount_in, amount_out, reserve_in, reserve_out);

        debug_assert!(Self::invariant_holds(
            amount_in,
            amount_out,
            reserve_in,
            reserve_out
        ));
        trace!(%amount_in, %amount_out, %fee_bps, %price_impact_bps, "swap quoted");

        Ok(SwapQuote {
            amount_out,
            effective_fee_bps: fee_bps,
            price_impact_bps,
        })
    }

    /// Smallest input that receives at least `amount_out`
    pub fn quote_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: U256,
    ) -> MathResult<U256> {
        if amount_out.is_zero() {
            return Err(MathError::liquidity("requested output is zero"));
        }
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(MathError::liquidity("output exceeds reserves"));
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps, "quote_amount_in")?;
        if fee_multiplier.is_zero() {
            return Err(MathError::domain(
                "quote_amount_in",
                "a 100% fee leaves no input to trade",
            ));
        }

        // Net input needed after fees, then gross it up; both steps round up
        let net_required = FixedPointMath::mul_div(reserve_in, amount_out, reserve_out - amount_out)?;
        let net_required = FixedPointMath::checked_add(net_required, U256::one(), "quote_amount_in")?;
        FixedPointMath::mul_div_up(net_required, BPS, fee_multiplier)
    }

    /// Slippage in bps against `expected_out` at the default 0.3% fee
    pub fn quote_slippage(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        expected_out: U256,
    ) -> MathResult<U256> {
        Self::quote_slippage_with_fee(
            amount_in,
            reserve_in,
            reserve_out,
            expected_out,
            U256::from(DEFAULT_SWAP_FEE_BPS),
        )
    }

    /// Slippage in bps against `expected_out`; zero when the swap meets or beats it
    pub fn quote_slippage_with_fee(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        expected_out: U256,
        fee_bps: U256,
    ) -> MathResult<U256> {
        let actual_out = Self::quote_swap(amount_in, reserve_in, reserve_out, fee_bps)?.amount_out;
        if actual_out >= expected_out {
            return Ok(U256::zero());
        }
        FixedPointMath::mul_div(expected_out - actual_out, BPS, expected_out)
    }

    /// Largest input up to `total_amount` whose price impact stays within `max_impact_bps`
    ///
    /// Solving `impact(a) = t` on the curve gives
    /// `a = reserve_in * (t - fee) * 10000 / ((10000 - fee) * (10000 - t))`.
    pub fn optimize_swap_amount(
        total_amount: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: U256,
        max_impact_bps: U256,
    ) -> MathResult<OptimizationResult> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(MathError::liquidity("pool reserves must be positive"));
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps, "optimize_swap_amount")?;
        if max_impact_bps >= BPS {
            return Err(MathError::domain(
                "optimize_swap_amount",
                "impact budget must be below 10000 bps",
            ));
        }

        let bound = if max_impact_bps > fee_bps {
            let numerator = FixedPointMath::checked_mul(
                max_impact_bps - fee_bps,
                BPS,
                "optimize_swap_amount",
            )?;
            // Both factors are at most 10000
            let denominator = fee_multiplier * (BPS - max_impact_bps);
            FixedPointMath::mul_div(reserve_in, numerator, denominator)?
        } else {
            U256::zero()
        };

        let optimal_amount = bound.min(total_amount);
        if optimal_amount.is_zero() {
            return Ok(OptimizationResult {
                optimal_amount,
                expected_output: U256::zero(),
                price_impact_bps: U256::zero(),
            });
        }

        let quote = Self::quote_swap(optimal_amount, reserve_in, reserve_out, fee_bps)?;
        Ok(OptimizationResult {
            optimal_amount,
            expected_output: quote.amount_out,
            price_impact_bps: quote.price_impact_bps,
        })
    }

    /// `(reserve_in + amount_in) * (reserve_out - amount_out) >= reserve_in * reserve_out`
    pub fn invariant_holds(
        amount_in: U256,
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> bool {
        if amount_out > reserve_out {
            return false;
        }
        let new_reserve_in = U512::from(reserve_in) + U512::from(amount_in);
        match new_reserve_in.checked_mul(U512::from(reserve_out - amount_out)) {
            Some(after) => after >= reserve_in.full_mul(reserve_out),
            // Past 512 bits the product already exceeds any 256x256 invariant
            None => true,
        }
    }

    /// Shortfall of `amount_out` against the spot-price output, in bps
    ///
    /// Compares `amount_out * reserve_in` with `amount_in * reserve_out` in
    /// 512 bits, so the result is defined for every pool `quote_swap` accepts.
    fn price_impact_bps(
        amount_in: U256,
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> U256 {
        let ideal = amount_in.full_mul(reserve_out);
        let actual = amount_out.full_mul(reserve_in);
        if ideal <= actual {
            return U256::zero();
        }

        // Keep 16 bits of headroom for the bps multiplication
        let shift = ideal.bits().saturating_sub(496);
        let shortfall = (ideal - actual) >> shift;
        let ideal = ideal >> shift;
        // shortfall <= ideal, so the quotient is at most 10000
        let impact = shortfall * U512::from(BPS_DENOMINATOR) / ideal;
        U256::from(impact.low_u64())
    }

    /// `10000 - fee_bps`, rejecting fees above 100%
    fn fee_multiplier(fee_bps: U256, function: &'static str) -> MathResult<U256> {
        if fee_bps > BPS {
            return Err(MathError::domain(function, "fee exceeds 10000 bps"));
        }
        Ok(BPS - fee_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::from_whole;
    use rust_decimal_macros::dec;

    fn bps(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_swap_output_calculation() {
        // 100 in, 1000:2000 reserves, 0.3% fee -> ~181.32 out
        let quote =
            ConstantProductPool::quote_swap(from_whole(100), from_whole(1000), from_whole(2000), bps(30))
                .unwrap();

        let lower = U256::from(181_310_000_000_000_000_000u128);
        let upper = U256::from(181_330_000_000_000_000_000u128);
        assert!(quote.amount_out > lower && quote.amount_out < upper);
        assert_eq!(quote.effective_fee_bps, bps(30));
    }

    #[test]
    fn test_swap_below_fee_free_quote() {
        let amount_in = from_whole(1000);
        let reserve = from_whole(100_000);

        let with_fee = ConstantProductPool::quote_swap(amount_in, reserve, reserve, bps(30)).unwrap();
        let fee_free = ConstantProductPool::quote_swap(amount_in, reserve, reserve, bps(0)).unwrap();

        assert!(with_fee.amount_out > U256::zero());
        assert!(with_fee.amount_out < fee_free.amount_out);
        assert!(with_fee.amount_out < from_whole(997));
    }

    #[test]
    fn test_swap_rejects_empty_inputs() {
        let reserve = from_whole(10);
        for (amount, r_in, r_out) in [
            (U256::zero(), reserve, reserve),
            (reserve, U256::zero(), reserve),
            (reserve, reserve, U256::zero()),
        ] {
            assert!(matches!(
                ConstantProductPool::quote_swap(amount, r_in, r_out, bps(30)),
                Err(MathError::InsufficientLiquidity { .. })
            ));
        }
    }

    #[test]
    fn test_swap_rejects_fee_above_100_percent() {
        let reserve = from_whole(10);
        assert!(matches!(
            ConstantProductPool::quote_swap(reserve, reserve, reserve, bps(10_001)),
            Err(MathError::DomainError { .. })
        ));
    }

    #[test]
    fn test_swap_overflow_is_reported() {
        let result = ConstantProductPool::quote_swap(U256::MAX, U256::MAX, U256::MAX, bps(0));
        assert!(matches!(result, Err(MathError::Overflow { .. })));
    }

    #[test]
    fn test_lopsided_pool_quotes_without_overflow() {
        // amount_in * reserve_out exceeds 256 bits; only the output has to fit
        let (amount_in, r_in, r_out) =
            (U256::from(10_000u64), U256::from(1_000u64), U256::MAX / 2);
        let quote = ConstantProductPool::quote_swap(amount_in, r_in, r_out, bps(30)).unwrap();

        let expected =
            FixedPointMath::mul_div(U256::from(9_970u64), r_out, U256::from(10_970u64)).unwrap();
        assert_eq!(quote.amount_out, expected);
        assert!(quote.amount_out < r_out);
        // 1 - 9970 / (10 * 10970) = 90.91%
        assert_eq!(quote.price_impact_bps, bps(9_091));
    }

    #[test]
    fn test_zero_fee_invariant_is_tight() {
        let (amount_in, r_in, r_out) = (
            U256::from(10u64).pow(U256::from(21u64)),
            U256::from(10u64).pow(U256::from(24u64)),
            U256::from(10u64).pow(U256::from(24u64)),
        );
        let quote = ConstantProductPool::quote_swap(amount_in, r_in, r_out, bps(0)).unwrap();
        let before = r_in.full_mul(r_out);
        let after = (r_in + amount_in).full_mul(r_out - quote.amount_out);
        assert!(after >= before);
        assert!(after - before <= U512::from(r_in + amount_in));
    }

    #[test]
    fn test_invariant_holds_after_swap() {
        let (r_in, r_out) = (from_whole(5_000), from_whole(12_345));
        for fee in [0u64, 1, 30, 100, 500] {
            let amount_in = from_whole(321);
            let quote = ConstantProductPool::quote_swap(amount_in, r_in, r_out, bps(fee)).unwrap();
            assert!(ConstantProductPool::invariant_holds(
                amount_in,
                quote.amount_out,
                r_in,
                r_out
            ));
        }
    }

    #[test]
    fn test_price_impact_grows_with_size() {
        let reserve = from_whole(1_000_000);
        let small = ConstantProductPool::quote_swap(from_whole(10), reserve, reserve, bps(30)).unwrap();
        let large =
            ConstantProductPool::quote_swap(from_whole(100_000), reserve, reserve, bps(30)).unwrap();

        // A tiny trade pays roughly the fee only
        assert_eq!(small.price_impact_bps, bps(30));
        assert!(large.price_impact_bps > small.price_impact_bps);
        assert!(large.price_impact_pct() > dec!(0.30));
    }

    #[test]
    fn test_amount_in_covers_requested_output() {
        let (r_in, r_out) = (from_whole(1000), from_whole(2000));
        let wanted = from_whole(150);
        let amount_in = ConstantProductPool::quote_amount_in(wanted, r_in, r_out, bps(30)).unwrap();
        let quote = ConstantProductPool::quote_swap(amount_in, r_in, r_out, bps(30)).unwrap();
        assert!(quote.amount_out >= wanted);

        assert!(matches!(
            ConstantProductPool::quote_amount_in(r_out, r_in, r_out, bps(30)),
            Err(MathError::InsufficientLiquidity { .. })
        ));
        assert!(matches!(
            ConstantProductPool::quote_amount_in(wanted, r_in, r_out, bps(10_000)),
            Err(MathError::DomainError { .. })
        ));
    }

    #[test]
    fn test_slippage() {
        let (amount_in, reserve) = (from_whole(100), from_whole(10_000));
        let actual = ConstantProductPool::quote_swap(amount_in, reserve, reserve, bps(30))
            .unwrap()
            .amount_out;

        // Expectation met exactly or undershot: no slippage
        assert_eq!(
            ConstantProductPool::quote_slippage(amount_in, reserve, reserve, actual).unwrap(),
            U256::zero()
        );
        assert_eq!(
            ConstantProductPool::quote_slippage(amount_in, reserve, reserve, U256::zero()).unwrap(),
            U256::zero()
        );

        // Expecting the full 1:1 amount shows the fee plus curve shortfall (~1.3%)
        let slippage =
            ConstantProductPool::quote_slippage(amount_in, reserve, reserve, amount_in).unwrap();
        assert_eq!(slippage, bps(128));
    }

    #[test]
    fn test_optimize_swap_amount_respects_budget() {
        let reserve = from_whole(1_000_000);
        let result = ConstantProductPool::optimize_swap_amount(
            from_whole(500_000),
            reserve,
            reserve,
            bps(30),
            bps(100),
        )
        .unwrap();

        assert!(result.optimal_amount > U256::zero());
        assert!(result.optimal_amount < from_whole(500_000));
        assert!(result.price_impact_bps <= bps(100));

        // One whole unit more than the optimum breaks the budget
        let over = ConstantProductPool::quote_swap(
            result.optimal_amount + from_whole(1),
            reserve,
            reserve,
            bps(30),
        )
        .unwrap();
        assert!(over.price_impact_bps >= bps(100));
    }

    #[test]
    fn test_optimize_swap_amount_edges() {
        let reserve = from_whole(1_000);

        // Budget below the fee: nothing can be traded
        let none =
            ConstantProductPool::optimize_swap_amount(from_whole(10), reserve, reserve, bps(30), bps(20))
                .unwrap();
        assert_eq!(none.optimal_amount, U256::zero());
        assert_eq!(none.expected_output, U256::zero());

        // Generous budget: capped at the caller's total
        let all =
            ConstantProductPool::optimize_swap_amount(from_whole(1), reserve, reserve, bps(30), bps(5_000))
                .unwrap();
        assert_eq!(all.optimal_amount, from_whole(1));

        assert!(matches!(
            ConstantProductPool::optimize_swap_amount(from_whole(1), reserve, reserve, bps(30), bps(10_000)),
            Err(MathError::DomainError { .. })
        ));
    }
}
