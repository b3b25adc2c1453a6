// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; any missing or invalid value aborts the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NETWORK` | `Mainnet`, `Preprod` or `Preview` | Required |
//! | `MAESTRO_KEY` | Maestro API key | Required |
//! | `PRIVATE_KEY` | Collateral Ed25519 key (64 hex chars) | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `80` |
//! | `PROVIDER_TIMEOUT_SECS` | Bound on provider and signer calls | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::blockchain::Network;
use crate::logging::LogFormat;

pub const NETWORK_ENV: &str = "NETWORK";
pub const MAESTRO_KEY_ENV: &str = "MAESTRO_KEY";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PROVIDER_TIMEOUT_ENV: &str = "PROVIDER_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 80;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The {0} environment variable must be set.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub network: Network,
    pub maestro_key: String,
    pub private_key: String,
    pub host: String,
    pub port: u16,
    pub provider_timeout: Duration,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("network", &self.network)
            .field("maestro_key", &"<redacted>")
            .field("private_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("provider_timeout", &self.provider_timeout)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let network = required(NETWORK_ENV)?
            .parse::<Network>()
            .map_err(|reason| ConfigError::Invalid {
                name: NETWORK_ENV,
                reason,
            })?;
        let maestro_key = required(MAESTRO_KEY_ENV)?;
        let private_key = required(PRIVATE_KEY_ENV)?;

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or_default(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let timeout_secs =
            parse_or_default(&lookup, PROVIDER_TIMEOUT_ENV, DEFAULT_PROVIDER_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: PROVIDER_TIMEOUT_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            network,
            maestro_key,
            private_key,
            host,
            port,
            provider_timeout: Duration::from_secs(timeout_secs),
            log_format,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })
    }
}

fn parse_or_default<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
