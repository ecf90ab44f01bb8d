//! Fixed protocol constants
//!
//! These values are part of the pool's economic rules and are deliberately
//! not exposed through the configuration loader.

/// Fixed-point scale: "1.0" is represented as 10^18
pub const SCALE_DECIMALS: u32 = 18;

/// 10^18 as a raw integer
pub const SCALE: u64 = 1_000_000_000_000_000_000;

/// Basis point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Share units permanently retired on the first deposit
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Swap fee applied when a caller does not supply one (0.3%)
pub const DEFAULT_SWAP_FEE_BPS: u64 = 30;

/// Hard ceiling for multi-hop route search depth
pub const MAX_ROUTE_HOPS: usize = 4;

/// Iteration bounds for the fixed-point approximations
pub mod iterations {
    /// Newton-Raphson square root; the bit-length seed converges well inside this
    pub const MAX_SQRT_ITERATIONS: u32 = 16;

    /// Taylor terms for exp on the reduced range [0, ln 2)
    pub const MAX_EXP_TERMS: u32 = 32;

    /// atanh series terms for ln on the reduced range [1, 2)
    pub const MAX_LN_TERMS: u32 = 48;
}
