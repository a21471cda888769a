//! Environment configuration. Parsing goes through a lookup closure so it can
//! be exercised without touching the process environment.

use std::env;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid {key} value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Settings shared by the product, user and order services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Absent means the service keeps its data in memory.
    pub database_url: Option<String>,
}

impl ServiceConfig {
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        Self::from_lookup(default_port, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(default_port: u16, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: port(&lookup, default_port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub port: u16,
    pub product_service_url: String,
    pub user_service_url: String,
    pub order_service_url: String,
}

impl GatewayConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: port(&lookup, Self::DEFAULT_PORT)?,
            product_service_url: upstream_url(&lookup, "PRODUCT_SERVICE_URL")?,
            user_service_url: upstream_url(&lookup, "USER_SERVICE_URL")?,
            order_service_url: upstream_url(&lookup, "ORDER_SERVICE_URL")?,
        })
    }
}

fn port<F>(lookup: &F, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("PORT") {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value,
        }),
        None => {
            info!("PORT not set, using default: {default}");
            Ok(default)
        }
    }
}

fn upstream_url<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))?;
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::Invalid { key, value });
    }
    Ok(value.trim_end_matches('/').to_string())
}
