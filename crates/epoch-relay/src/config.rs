use dotenv::dotenv;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

pub const DEFAULT_KEY_CACHE_SIZE: usize = 64;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;

/// Tunables for an [`Engine`](crate::Engine)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Number of decoded aggregated keys kept in memory
    pub key_cache_size: usize,
    /// Largest batch `receive` accepts in one call
    pub max_batch_size: usize,
    /// When set, Merkle paths with more steps are rejected before hashing
    pub max_proof_depth: Option<usize>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            key_cache_size: DEFAULT_KEY_CACHE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_proof_depth: None,
        }
    }
}

impl RelayConfig {
    /// Reads `RELAY_KEY_CACHE_SIZE`, `RELAY_MAX_BATCH_SIZE` and `RELAY_MAX_PROOF_DEPTH` from the
    /// environment, after loading a `.env` file if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = RelayConfig {
            key_cache_size: parse_var(&lookup, "RELAY_KEY_CACHE_SIZE")?
                .unwrap_or(defaults.key_cache_size),
            max_batch_size: parse_var(&lookup, "RELAY_MAX_BATCH_SIZE")?
                .unwrap_or(defaults.max_batch_size),
            max_proof_depth: parse_var(&lookup, "RELAY_MAX_PROOF_DEPTH")?,
        };
        if config.key_cache_size == 0 {
            eyre::bail!("RELAY_KEY_CACHE_SIZE must be at least 1");
        }
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .wrap_err_with(|| format!("invalid value {:?} for {}", value, name))
        })
        .transpose()
}
