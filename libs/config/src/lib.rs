//! # Tidepool Centralized Configuration
//!
//! This crate provides the tunable parameters and fixed protocol constants
//! shared by the Tidepool AMM engine, so callers and the math core agree on
//! one source of truth.
//!
//! ## Features
//!
//! - **Protocol Constants**: Fixed-point scale, basis-point denominator, locked minimum liquidity
//! - **Fee Configuration**: Base fee, fee cap, volatility curve shape
//! - **Route Configuration**: Multi-hop search depth
//!
//! ## Usage
//!
//! ```rust
//! use tidepool_config::{protocol, EngineConfig};
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.fee.base_fee_bps, 30);
//! assert_eq!(protocol::MINIMUM_LIQUIDITY, 1_000);
//! ```

pub mod engine_config;
pub mod protocol;

// Re-export commonly used types
pub use engine_config::{load_config, EngineConfig, FeeConfig, RouteConfig, VolatilityCurve};
pub use protocol::*;
