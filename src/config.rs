//! Server configuration
//!
//! 从 config.toml 加载服务配置，命令行参数优先

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ADDRESS: &str = ":9000";
pub const DEFAULT_CONTROLLER_ADDRESS: &str = ":9001";
pub const DEFAULT_RPC_ADDRESS: &str = ":9002";
pub const DEFAULT_RATE_LIMIT: usize = 16;

/// Settings handed to the storage server, gateway and controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub controller_address: String,
    pub rpc_address: String,
    pub anonymous: bool,
    pub tls: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    /// Maximum concurrent requests
    pub rate_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            controller_address: DEFAULT_CONTROLLER_ADDRESS.to_string(),
            rpc_address: DEFAULT_RPC_ADDRESS.to_string(),
            anonymous: false,
            tls: false,
            cert_file: None,
            key_file: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Derive TLS from the certificate pair and check invariants
    pub fn finalize(mut self) -> Result<Self> {
        self.tls = self.cert_file.is_some() && self.key_file.is_some();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 {
            anyhow::bail!("rate limit must be greater than zero");
        }
        if self.cert_file.is_some() != self.key_file.is_some() {
            anyhow::bail!("both a certificate and a key file are required to enable TLS");
        }
        for (name, value) in [
            ("address", &self.address),
            ("controller address", &self.controller_address),
            ("rpc address", &self.rpc_address),
        ] {
            if !value.contains(':') {
                anyhow::bail!("{} '{}' must be in HOST:PORT or :PORT form", name, value);
            }
        }
        Ok(())
    }
}

/// `<config dir>/strata/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strata").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.address, ":9000");
        assert_eq!(config.rate_limit, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "address = \"127.0.0.1:9100\"\nanonymous = true\n");

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.address, "127.0.0.1:9100");
        assert!(config.anonymous);
        assert_eq!(config.rpc_address, DEFAULT_RPC_ADDRESS);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = ServerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "rate_limit = \"many\"\n");
        let err = ServerConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_finalize_derives_tls() {
        let config = ServerConfig {
            cert_file: Some(PathBuf::from("public.crt")),
            key_file: Some(PathBuf::from("private.key")),
            ..ServerConfig::default()
        }
        .finalize()
        .unwrap();
        assert!(config.tls);
    }

    #[test]
    fn test_validate_rejects_half_tls_and_zero_rate() {
        let half = ServerConfig {
            cert_file: Some(PathBuf::from("public.crt")),
            ..ServerConfig::default()
        };
        assert!(half.finalize().is_err());

        let zero = ServerConfig {
            rate_limit: 0,
            ..ServerConfig::default()
        };
        assert!(zero.validate().is_err());

        let bad_address = ServerConfig {
            address: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad_address.validate().is_err());
    }
}
