//! Engine Configuration Module
//!
//! Provides configuration loading and validation for the AMM engine.
//! Supports loading from TOML files with environment-specific overrides.

use crate::protocol::{BPS_DENOMINATOR, MAX_ROUTE_HOPS};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/tidepool.toml";

/// Prefix for environment variable overrides (`TIDEPOOL__FEE__MAX_FEE_BPS=80`)
pub const ENV_PREFIX: &str = "TIDEPOOL";

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Dynamic fee model settings
    pub fee: FeeConfig,

    /// Route search settings
    pub route: RouteConfig,
}

/// Shape of the volatility response in the dynamic fee
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityCurve {
    /// `volatility_bps / volatility_divisor`
    #[default]
    Linear,
    /// `(exp(volatility_bps / 10000) - 1) * exponential_scale_bps`
    Exponential,
}

/// Dynamic fee settings, all in basis points unless noted
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FeeConfig {
    pub base_fee_bps: u64,
    pub max_fee_bps: u64,
    pub volatility_curve: VolatilityCurve,
    /// Divisor for the linear curve (1000 bps of volatility adds 1 bp)
    pub volatility_divisor: u64,
    /// Multiplier applied to volume / depth
    pub volume_multiplier: u64,
    /// Fee added per unit of `exp(v) - 1` on the exponential curve
    pub exponential_scale_bps: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            base_fee_bps: 30,
            max_fee_bps: 100,
            volatility_curve: VolatilityCurve::Linear,
            volatility_divisor: 1_000,
            volume_multiplier: 10,
            exponential_scale_bps: 20,
        }
    }
}

/// Multi-hop route search settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouteConfig {
    pub max_hops: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self { max_hops: 3 }
    }
}

impl EngineConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (TIDEPOOL__ prefix)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: EngineConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Parse an inline TOML document; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).context("Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the math core cannot honor
    pub fn validate(&self) -> Result<()> {
        let fee = &self.fee;
        if fee.max_fee_bps > BPS_DENOMINATOR {
            bail!(
                "max_fee_bps {} exceeds {} (100%)",
                fee.max_fee_bps,
                BPS_DENOMINATOR
            );
        }
        if fee.base_fee_bps > fee.max_fee_bps {
            bail!(
                "base_fee_bps {} exceeds max_fee_bps {}",
                fee.base_fee_bps,
                fee.max_fee_bps
            );
        }
        if fee.volatility_divisor == 0 {
            bail!("volatility_divisor must be non-zero");
        }
        if self.route.max_hops == 0 || self.route.max_hops > MAX_ROUTE_HOPS {
            bail!(
                "route.max_hops {} outside 1..={}",
                self.route.max_hops,
                MAX_ROUTE_HOPS
            );
        }
        Ok(())
    }
}

/// Convenience function to load configuration, falling back to defaults
/// when no base file exists
pub fn load_config(environment: Option<&str>) -> Result<EngineConfig> {
    let base = PathBuf::from(DEFAULT_CONFIG_PATH);
    if !base.exists() {
        info!("No config at {:?}, using built-in defaults", base);
        return Ok(EngineConfig::default());
    }
    EngineConfig::load(Some(&base), environment)
}
