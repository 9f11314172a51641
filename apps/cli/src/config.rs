//! CLI configuration.
//!
//! Optional JSON file at `$XDG_CONFIG_HOME/ethfs/config.json` (falling
//! back to `~/.config/ethfs/config.json`). Command-line flags override
//! the file, which overrides the built-in defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ethfs_protocol::DEFAULT_CHAIN_ID;
use ethfs_protocol::constants::{default_provider_url, default_thread_pool_size};
use ethfs_uploader::RetryPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Chain used when neither a flag nor an address prefix names one.
    pub default_chain_id: Option<u64>,
    /// Provider URL per chain id, replacing the built-in endpoints.
    pub rpc_overrides: HashMap<u64, String>,
    pub thread_pool_size: Option<usize>,
    /// Delay before retrying a failed contract read.
    pub retry_delay_ms: Option<u64>,
}

impl CliConfig {
    /// Loads the config file, or defaults if there is none.
    pub fn load() -> anyhow::Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "failed to read config, using defaults: {e}"
                );
                return Ok(Self::default());
            }
        };
        match serde_json::from_str::<CliConfig>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "failed to parse config, using defaults: {e}"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn default_chain_id(&self) -> u64 {
        self.default_chain_id.unwrap_or(DEFAULT_CHAIN_ID)
    }

    /// Provider URL: `--rpc`, then the config override, then the
    /// built-in table.
    pub fn rpc_url(&self, flag: Option<&str>, chain_id: u64) -> anyhow::Result<String> {
        if let Some(url) = flag {
            return Ok(url.to_string());
        }
        if let Some(url) = self.rpc_overrides.get(&chain_id) {
            return Ok(url.clone());
        }
        default_provider_url(chain_id)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no provider known for chain {chain_id}, pass --rpc"))
    }

    pub fn thread_pool_size(&self, flag: Option<usize>, chain_id: u64) -> usize {
        flag.or(self.thread_pool_size)
            .unwrap_or_else(|| default_thread_pool_size(chain_id))
            .max(1)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.retry_delay_ms {
            Some(ms) => RetryPolicy::with_delay(Duration::from_millis(ms)),
            None => RetryPolicy::default(),
        }
    }
}

/// Checks the chain named on the command line and by the address prefix
/// against the chain the provider reports.
pub fn resolve_chain_id(
    flag: Option<u64>,
    prefix: Option<u64>,
    rpc_chain_id: u64,
) -> anyhow::Result<u64> {
    if let Some(flag) = flag
        && flag != rpc_chain_id
    {
        anyhow::bail!("--chain-id {flag} does not match the provider's chain {rpc_chain_id}");
    }
    if let Some(prefix) = prefix
        && prefix != rpc_chain_id
    {
        anyhow::bail!("address prefix names chain {prefix}, the provider is on chain {rpc_chain_id}");
    }
    Ok(rpc_chain_id)
}

pub fn config_path() -> Option<PathBuf> {
    config_base_dir().map(|d| d.join("ethfs").join("config.json"))
}

fn config_base_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    }
}
