//! Node configuration
//!
//! Loaded from an optional TOML file, then overridden by `CINDER__*`
//! environment variables (`CINDER__WAVES__DAILY_POOL_A=500`).

use crate::error::{NodeError, NodeResult};
use cinder_core::types::{Address, PoolId};
use cinder_farming::LevelConfig;
use cinder_ritual::RitualConfig;
use cinder_waves::WaveConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CINDER";

/// Complete node configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinderConfig {
    /// Wave accounting
    #[serde(default)]
    pub waves: WaveConfig,

    /// Staking, leveling and farming
    #[serde(default)]
    pub farming: FarmingConfig,

    /// Ritual resolution
    #[serde(default)]
    pub ritual: RitualConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingConfig {
    /// Hex address holding staked assets
    #[serde(default = "default_custody")]
    pub custody: String,

    /// Pools whose harvested tokens count as wave contributions
    #[serde(default = "default_wave_eligible_pools")]
    pub wave_eligible_pools: Vec<PoolId>,

    #[serde(default)]
    pub leveling: LevelConfig,
}

fn default_custody() -> String {
    Address::from_low_u64(0xC057_0D1A).to_string()
}

fn default_wave_eligible_pools() -> Vec<PoolId> {
    vec![1]
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            custody: default_custody(),
            wave_eligible_pools: default_wave_eligible_pools(),
            leveling: LevelConfig::default(),
        }
    }
}

impl FarmingConfig {
    pub fn custody_address(&self) -> NodeResult<Address> {
        let address = Address::from_hex(&self.custody)
            .map_err(|e| NodeError::InvalidConfig(format!("farming.custody: {e}")))?;
        if address.is_zero() {
            return Err(NodeError::InvalidConfig("farming.custody is the zero address".into()));
        }
        Ok(address)
    }
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CinderConfig {
    /// Load from `path` (if given) layered under the environment
    pub fn load(path: Option<&Path>) -> NodeResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml(content: &str) -> NodeResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> NodeResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> NodeResult<()> {
        self.farming.custody_address()?;
        if self.waves.retention_waves < 2 {
            return Err(NodeError::InvalidConfig(
                "waves.retention_waves must be at least 2".into(),
            ));
        }
        if self.ritual.max_batch == 0 {
            return Err(NodeError::InvalidConfig("ritual.max_batch must be nonzero".into()));
        }
        if self.ritual.request_timeout_secs <= 0 {
            return Err(NodeError::InvalidConfig(
                "ritual.request_timeout_secs must be positive".into(),
            ));
        }
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(NodeError::InvalidConfig(format!(
                "logging.format must be text or json, got {other}"
            ))),
        }
    }
}
