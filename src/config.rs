//! Configuration loader and validator
//!
//! Loads bridge configuration from TOML files in the configs/ directory.
//! Every key is optional and falls back to a built-in default, so the
//! binary runs without any config file at all.

use crate::gamepad::constants::{
    PRODUCT_ID_F710_WIRED, PRODUCT_ID_F710_WIRELESS, VENDOR_ID_LOGITECH,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which device to bridge
    #[serde(default)]
    pub device: DeviceSettings,

    /// Acquisition loop timing and recovery
    #[serde(default)]
    pub acquisition: AcquisitionSettings,

    /// Data-layer node addressing
    #[serde(default)]
    pub datalayer: DatalayerSettings,
}

/// Device identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// USB vendor id
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    /// Product ids tried in order (wireless receiver first, wired fallback)
    #[serde(default = "default_product_ids")]
    pub product_ids: Vec<u16>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_ids: default_product_ids(),
        }
    }
}

/// Acquisition loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionSettings {
    /// Bounded read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// First backoff delay after a read failure, milliseconds
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    /// Backoff delay cap, milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Consecutive reopen failures before the loop gives up
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// Data-layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatalayerSettings {
    /// Root path all nodes are registered under
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for DatalayerSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_vendor_id() -> u16 {
    VENDOR_ID_LOGITECH
}
fn default_product_ids() -> Vec<u16> {
    vec![PRODUCT_ID_F710_WIRELESS, PRODUCT_ID_F710_WIRED]
}
fn default_read_timeout_ms() -> u64 {
    500
}
fn default_backoff_initial_ms() -> u64 {
    500
}
fn default_backoff_max_ms() -> u64 {
    5000
}
fn default_max_consecutive_failures() -> u32 {
    10
}
fn default_root() -> String {
    "gamepad".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("loading configuration from {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config: Config = toml::from_str(&content)?;

        debug!(
            "  device 0x{:04X}, product ids {:?}",
            config.device.vendor_id, config.device.product_ids
        );
        debug!("  node root '{}'", config.datalayer.root);

        config.validate()?;
        Ok(config)
    }

    /// Load configs/default.toml when present, built-in defaults otherwise
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new("configs/default.toml");
        if path.exists() {
            Self::load(path)
        } else {
            info!("no configs/default.toml, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.product_ids.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one product id is required".into(),
            ));
        }

        if self.acquisition.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "read_timeout_ms must be greater than zero".into(),
            ));
        }

        if self.acquisition.backoff_initial_ms == 0 {
            return Err(ConfigError::Invalid(
                "backoff_initial_ms must be greater than zero".into(),
            ));
        }

        if self.acquisition.backoff_max_ms < self.acquisition.backoff_initial_ms {
            return Err(ConfigError::Invalid(
                "backoff_max_ms must not be below backoff_initial_ms".into(),
            ));
        }

        if self.acquisition.max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid(
                "max_consecutive_failures must be greater than zero".into(),
            ));
        }

        let root = &self.datalayer.root;
        if root.is_empty() || root.starts_with('/') || root.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "node root '{root}' must be non-empty without leading/trailing '/'"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device.vendor_id, 0x046D);
        assert_eq!(config.device.product_ids, vec![0xC21F, 0xC219]);
        assert_eq!(config.acquisition.read_timeout_ms, 500);
        assert_eq!(config.acquisition.max_consecutive_failures, 10);
        assert_eq!(config.datalayer.root, "gamepad");
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.datalayer.root, "gamepad");
        assert_eq!(config.acquisition.backoff_max_ms, 5000);
    }

    #[test]
    fn partial_toml_overrides_only_the_given_keys() {
        let config: Config = toml::from_str(
            r#"
            [acquisition]
            read_timeout_ms = 250

            [datalayer]
            root = "plant/pad"
            "#,
        )
        .unwrap();

        assert_eq!(config.acquisition.read_timeout_ms, 250);
        assert_eq!(config.acquisition.backoff_initial_ms, 500);
        assert_eq!(config.datalayer.root, "plant/pad");
        assert_eq!(config.device.vendor_id, 0x046D);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn hex_device_ids_parse() {
        let config: Config = toml::from_str(
            r#"
            [device]
            vendor_id = 0x046D
            product_ids = [0xC21F]
            "#,
        )
        .unwrap();
        assert_eq!(config.device.product_ids, vec![0xC21F]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut config = Config::default();
        config.device.product_ids.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.acquisition.read_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.acquisition.backoff_max_ms = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.datalayer.root = "gamepad/".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.datalayer.root = String::new();
        assert!(config.validate().is_err());
    }
}
