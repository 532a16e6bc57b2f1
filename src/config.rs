//! Environment-driven configuration, read once at startup

use crate::optimizer::ServiceError;
use crate::DEFAULT_CURRENCY;

pub const API_BASE_ENV: &str = "FLIGHT_OPTIMIZER_API_BASE";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

pub const TEQUILA_BASE_ENV: &str = "TEQUILA_BASE";
pub const DEFAULT_TEQUILA_BASE: &str = "https://tequila-api.kiwi.com";
pub const API_KEY_ENV: &str = "KIWI_API_KEY";
pub const DEFAULT_CURRENCY_ENV: &str = "DEFAULT_CURRENCY";
pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Read a variable, treating an empty value as unset
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Where the front end sends its searches
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base: non_empty(&lookup, API_BASE_ENV)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }
}

/// Settings for the `/optimize` service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub tequila_base: String,
    pub api_key: String,
    pub default_currency: String,
    pub bind_addr: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The Tequila API key has no default and must be supplied
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(&lookup, API_KEY_ENV)
            .ok_or_else(|| ServiceError::Config(format!("{} is not set", API_KEY_ENV)))?;

        Ok(Self {
            tequila_base: non_empty(&lookup, TEQUILA_BASE_ENV)
                .unwrap_or_else(|| DEFAULT_TEQUILA_BASE.to_string()),
            api_key,
            default_currency: non_empty(&lookup, DEFAULT_CURRENCY_ENV)
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            bind_addr: non_empty(&lookup, BIND_ADDR_ENV)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_client_config_defaults_to_local_address() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_base, "http://127.0.0.1:8000");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_client_config_reads_env() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            API_BASE_ENV,
            "https://optimizer.example.com",
        )]));
        assert_eq!(config.api_base, "https://optimizer.example.com");

        let blank = ClientConfig::from_lookup(lookup_from(&[(API_BASE_ENV, "  ")]));
        assert_eq!(blank.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_service_config_requires_api_key() {
        let result = ServiceConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.tequila_base, DEFAULT_TEQUILA_BASE);
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_service_config_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (TEQUILA_BASE_ENV, "http://localhost:9000"),
            (DEFAULT_CURRENCY_ENV, "EUR"),
            (BIND_ADDR_ENV, "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(config.tequila_base, "http://localhost:9000");
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
