//! Dynamic trading fee from volume, depth, and volatility
//!
//! `fee = min(base + volatility_component + volume_component, max_fee)`.
//! Each component is non-decreasing in its input. A component that would
//! exceed the cap saturates at the cap, which leaves the final fee exact.

use crate::error::{MathError, MathResult};
use crate::fixed_point::{FixedPointMath, BPS, MAX_EXP_INPUT, ONE};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tidepool_config::{FeeConfig, VolatilityCurve};
use tracing::debug;

/// Market conditions the fee responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeParameters {
    /// Volume traded over the observation window
    pub volume_window: U256,
    /// Pool depth the volume is measured against
    pub liquidity_depth: U256,
    /// Recent price volatility in basis points
    pub price_volatility_bps: U256,
}

/// Fee quoting under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct FeeModel {
    config: FeeConfig,
}

impl FeeModel {
    /// Settings are checked on every quote; `EngineConfig::validate` rejects
    /// the same combinations at load time
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Fee cap in basis points
    pub fn max_fee_bps(&self) -> U256 {
        U256::from(self.config.max_fee_bps)
    }

    /// Dynamic fee in basis points, never above `max_fee_bps`
    pub fn quote_dynamic_fee(&self, params: &FeeParameters) -> MathResult<U256> {
        let cap = self.max_fee_bps();
        let base = U256::from(self.config.base_fee_bps);
        if cap > BPS {
            return Err(MathError::domain(
                "quote_dynamic_fee",
                "fee cap exceeds 10000 bps",
            ));
        }
        if base > cap {
            return Err(MathError::domain(
                "quote_dynamic_fee",
                "base fee exceeds the fee cap",
            ));
        }

        let volatility = self.volatility_component(params.price_volatility_bps, cap)?;
        let volume = self.volume_component(params.volume_window, params.liquidity_depth, cap)?;

        let uncapped = base.saturating_add(volatility).saturating_add(volume);
        let fee = uncapped.min(cap);
        if uncapped > cap {
            debug!(%volatility, %volume, %cap, "dynamic fee clamped to cap");
        }
        Ok(fee)
    }

    fn volatility_component(&self, volatility_bps: U256, cap: U256) -> MathResult<U256> {
        match self.config.volatility_curve {
            VolatilityCurve::Linear => volatility_bps
                .checked_div(U256::from(self.config.volatility_divisor))
                .ok_or(MathError::domain(
                    "quote_dynamic_fee",
                    "volatility divisor is zero",
                )),
            VolatilityCurve::Exponential => {
                // exp(volatility as a fraction) - 1, scaled to bps
                let exponent = match FixedPointMath::mul_div(volatility_bps, ONE, BPS) {
                    Ok(exponent) if exponent <= MAX_EXP_INPUT => exponent,
                    Ok(_) | Err(MathError::Overflow { .. }) => return Ok(cap),
                    Err(err) => return Err(err),
                };
                let growth = FixedPointMath::exp(exponent)? - ONE;
                let scale = U256::from(self.config.exponential_scale_bps);
                Ok(FixedPointMath::mul_div(growth, scale, ONE)?.min(cap))
            }
        }
    }

    fn volume_component(&self, volume: U256, depth: U256, cap: U256) -> MathResult<U256> {
        if depth.is_zero() {
            return Ok(U256::zero());
        }
        let multiplier = U256::from(self.config.volume_multiplier);
        match FixedPointMath::mul_div(volume, multiplier, depth) {
            Ok(component) => Ok(component),
            Err(MathError::Overflow { .. }) => Ok(cap),
            Err(err) => Err(err),
        }
    }
}
