//! # Tidepool AMM Library - Deterministic Pool Mathematics Engine
//!
//! ## Purpose
//!
//! Pricing and liquidity mathematics for two-asset constant product pools.
//! Computes swap outputs, slippage, LP share mints and burns, a dynamic
//! trading fee, impermanent loss, and route selection across pools, all in
//! 256-bit fixed-point integer arithmetic scaled by 10^18.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve and share-supply snapshots from the ledger layer
//! - **Output Destinations**: Ledger layer transfer logic, routers, risk monitors
//! - **Boundary**: The engine never holds pool state or moves assets; it returns
//!   numbers or a [`MathError`]
//! - **Precision**: Integer arithmetic only, truncating division, 512-bit
//!   intermediates for `a * b / c`
//! - **Validation**: Every product that can exceed 256 bits is checked and
//!   reported as [`MathError::Overflow`]
//!
//! ## Architecture Role
//!
//! [`FixedPointMath`] is the leaf. [`ConstantProductPool`] and
//! [`LiquidityAccountant`] build on it; [`FeeModel`] uses its exp primitive;
//! [`RouteOptimizer`] calls the pool quote once per candidate hop.
//! [`ConstantProductEngine`] bundles them behind the [`QuoteEngine`] trait.
//!
//! See [`architecture_diagram()`] for visual representation of the data flow.
//!
//! ## Concurrency
//!
//! Every operation is a pure function over caller-supplied values with
//! bounded iteration counts. There is no shared mutable state, so calls are
//! safe from any number of threads without locks.

pub mod engine;
pub mod error;
pub mod fee;
pub mod fixed_point;
pub mod impermanent_loss;
pub mod liquidity;
pub mod pool;
pub mod route;
pub mod volatility;

pub use engine::{ConstantProductEngine, QuoteEngine};
pub use error::{MathError, MathResult};
pub use fee::{FeeModel, FeeParameters};
pub use fixed_point::{FixedPointMath, SignedFixed};
pub use impermanent_loss::ImpermanentLossEstimator;
pub use liquidity::{LiquidityAccountant, MINIMUM_LIQUIDITY_SHARES};
pub use pool::{ConstantProductPool, OptimizationResult, SwapQuote};
pub use route::{AssetId, RouteHop, RouteLeg, RouteOptimizer, RoutePath, RouteSelection};
pub use volatility::VolatilityEstimator;

/// Common types for AMM calculations
pub use primitive_types::U256;
pub use rust_decimal::Decimal;
pub use tidepool_config::EngineConfig;

/// Architecture diagram showing AMM library data flow and component relationships
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Input["📊 Ledger Snapshot"]
///         RV[Reserves]
///         SS[Share Supply]
///         FP[Fee Parameters]
///         RH[Route Hops]
///     end
///
///     subgraph Leaf["🧮 FixedPointMath"]
///         SQ[sqrt]
///         EX[exp]
///         LN[ln]
///         MD[mul_div]
///     end
///
///     subgraph Core["📐 Quoting"]
///         CP[ConstantProductPool]
///         LA[LiquidityAccountant]
///         FM[FeeModel]
///         IL[ImpermanentLossEstimator]
///         RO[RouteOptimizer]
///     end
///
///     subgraph Output["🎯 Results"]
///         SQT[SwapQuote]
///         SH[Share Amounts]
///         FEE[Fee bps]
///         RS[Route Selection]
///     end
///
///     RV --> CP
///     RV --> LA
///     SS --> LA
///     FP --> FM
///     RH --> RO
///
///     SQ --> LA
///     SQ --> IL
///     EX --> FM
///     LN --> FM
///     MD --> CP
///     CP --> RO
///
///     CP --> SQT
///     LA --> SH
///     FM --> FEE
///     RO --> RS
///
///     style Input fill:#e1f5fe
///     style Leaf fill:#fff3e0
///     style Core fill:#f3e5f5
///     style Output fill:#e8f5e9
/// ```
pub fn architecture_diagram() {
    // This function exists solely for documentation purposes
    // The diagram is rendered by aquamarine in rustdoc
}
