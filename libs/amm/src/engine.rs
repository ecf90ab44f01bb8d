//! Unified quoting interface consumed by the ledger layer

use crate::error::MathResult;
use crate::fee::{FeeModel, FeeParameters};
use crate::impermanent_loss::ImpermanentLossEstimator;
use crate::liquidity::LiquidityAccountant;
use crate::pool::{ConstantProductPool, SwapQuote};
use crate::route::{AssetId, RouteHop, RouteLeg, RouteOptimizer, RoutePath, RouteSelection};
use primitive_types::U256;
use tidepool_config::EngineConfig;

/// Capability set of a two-asset pricing engine
///
/// Every method is a pure function of its arguments and the engine's
/// immutable configuration.
pub trait QuoteEngine {
    fn quote_swap(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: U256,
    ) -> MathResult<SwapQuote>;

    fn quote_mint_first_deposit(&self, amount_a: U256, amount_b: U256) -> MathResult<U256>;

    fn quote_mint_subsequent(
        &self,
        amount_a: U256,
        amount_b: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<U256>;

    fn quote_burn(
        &self,
        shares: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<(U256, U256)>;

    fn quote_dynamic_fee(&self, params: &FeeParameters) -> MathResult<U256>;

    fn quote_impermanent_loss(&self, initial_price: U256, current_price: U256)
        -> MathResult<U256>;

    fn find_best_route(&self, amount_in: U256, hops: &[RouteHop]) -> MathResult<RouteSelection>;
}

/// Constant product engine configured from `EngineConfig`
#[derive(Debug, Clone, Default)]
pub struct ConstantProductEngine {
    fee_model: FeeModel,
    router: RouteOptimizer,
}

impl ConstantProductEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            fee_model: FeeModel::new(config.fee),
            router: RouteOptimizer::new(config.route),
        }
    }

    /// Price the fee from market conditions, then quote the swap with it
    pub fn quote_swap_with_dynamic_fee(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        params: &FeeParameters,
    ) -> MathResult<SwapQuote> {
        let fee_bps = self.fee_model.quote_dynamic_fee(params)?;
        ConstantProductPool::quote_swap(amount_in, reserve_in, reserve_out, fee_bps)
    }

    /// Multi-hop search bounded by the configured depth
    pub fn find_best_path(
        &self,
        amount_in: U256,
        from: AssetId,
        to: AssetId,
        legs: &[RouteLeg],
    ) -> MathResult<RoutePath> {
        self.router.find_best_path(amount_in, from, to, legs)
    }
}

impl QuoteEngine for ConstantProductEngine {
    fn quote_swap(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: U256,
    ) -> MathResult<SwapQuote> {
        ConstantProductPool::quote_swap(amount_in, reserve_in, reserve_out, fee_bps)
    }

    fn quote_mint_first_deposit(&self, amount_a: U256, amount_b: U256) -> MathResult<U256> {
        LiquidityAccountant::quote_mint_first_deposit(amount_a, amount_b)
    }

    fn quote_mint_subsequent(
        &self,
        amount_a: U256,
        amount_b: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<U256> {
        LiquidityAccountant::quote_mint_subsequent(
            amount_a,
            amount_b,
            reserve_a,
            reserve_b,
            total_shares,
        )
    }

    fn quote_burn(
        &self,
        shares: U256,
        reserve_a: U256,
        reserve_b: U256,
        total_shares: U256,
    ) -> MathResult<(U256, U256)> {
        LiquidityAccountant::quote_burn(shares, reserve_a, reserve_b, total_shares)
    }

    fn quote_dynamic_fee(&self, params: &FeeParameters) -> MathResult<U256> {
        self.fee_model.quote_dynamic_fee(params)
    }

    fn quote_impermanent_loss(
        &self,
        initial_price: U256,
        current_price: U256,
    ) -> MathResult<U256> {
        ImpermanentLossEstimator::quote_impermanent_loss(initial_price, current_price)
    }

    fn find_best_route(&self, amount_in: U256, hops: &[RouteHop]) -> MathResult<RouteSelection> {
        RouteOptimizer::find_best_route(amount_in, hops)
    }
}
