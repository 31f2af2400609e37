//! Node configuration, populated from environment variables.

use std::net::SocketAddr;

/// Runtime configuration for a Kinship node.
///
/// All fields have defaults, so a node can be started with zero
/// configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `KINSHIP_BIND` | `0.0.0.0:3000` | TCP socket address to listen on |
/// | `KINSHIP_DB` | (absent = in-memory) | Path to the SQLite database file |
/// | `KINSHIP_ACCOUNT_SERVICE` | (absent = local) | Base URL of the external account service |
/// | `KINSHIP_ACCOUNT_TIMEOUT_SECS` | `5` | Per-request timeout for the account service |
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file.
    /// `None` means use an in-memory store (data is lost on restart).
    pub db_path: Option<String>,

    /// Base URL of the account service, e.g. `"https://users.example.com"`.
    /// `None` means accounts are registered directly on this node.
    pub account_service: Option<String>,

    /// Timeout for each account-service lookup, in seconds.
    pub account_timeout_secs: u64,
}

/// A configuration variable that is present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid socket address (e.g. 0.0.0.0:3000), got {value:?}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be an http:// or https:// URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

impl NodeConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = get("KINSHIP_BIND").unwrap_or_else(|| "0.0.0.0:3000".into());
        let bind_addr = bind.parse().map_err(|_| ConfigError::InvalidAddr {
            var: "KINSHIP_BIND",
            value: bind.clone(),
        })?;

        let account_timeout_secs = match get("KINSHIP_ACCOUNT_TIMEOUT_SECS") {
            None => 5,
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: "KINSHIP_ACCOUNT_TIMEOUT_SECS",
                    value: v,
                })?,
        };

        let account_service = get("KINSHIP_ACCOUNT_SERVICE").filter(|v| !v.is_empty());
        if let Some(url) = &account_service {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: "KINSHIP_ACCOUNT_SERVICE",
                    value: url.clone(),
                });
            }
        }

        Ok(Self {
            bind_addr,
            db_path: get("KINSHIP_DB").filter(|v| !v.is_empty()),
            account_service,
            account_timeout_secs,
        })
    }

    /// A config for in-process use: in-memory storage, local accounts.
    pub fn ephemeral(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_path: None,
            account_service: None,
            account_timeout_secs: 5,
        }
    }
}
