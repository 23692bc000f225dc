#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::DEFAULT_DISTANCE_MATRIX_ENDPOINT;
use crate::core::ConfigProvider;
use crate::domain::model::{FeeSchedule, ORIGIN};
use crate::utils::error::{Result, ShippingError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

/// Environment variable read when no key is given on the command line or in the config file.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

pub use crate::domain::model::DEFAULT_TABLE_PATH;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;

/// Fully resolved settings of one refresh run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub origin: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub table_path: String,
    pub request_delay_ms: u64,
    pub cities: Vec<String>,
    pub fees: FeeSchedule,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            origin: ORIGIN.to_string(),
            endpoint: DEFAULT_DISTANCE_MATRIX_ENDPOINT.to_string(),
            api_key: None,
            table_path: DEFAULT_TABLE_PATH.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            cities: Vec::new(),
            fees: FeeSchedule::default(),
        }
    }
}

impl RefreshConfig {
    /// Fills a missing key from the environment.
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .and_then(|value| usable_secret(&value));
        }
        self
    }
}

/// The credential, or the fatal error that aborts a refresh run.
pub fn require_api_key<C: ConfigProvider>(config: &C) -> Result<&str> {
    config
        .api_key()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ShippingError::MissingConfigError {
            field: "api_key".to_string(),
        })
}

/// Blank values and `${VAR}` placeholders left by substitution count as absent.
pub(crate) fn usable_secret(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || (trimmed.starts_with("${") && trimmed.ends_with('}')) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn validate_fee_schedule(fees: &FeeSchedule) -> Result<()> {
    if !fees.rate_per_km.is_finite() || fees.rate_per_km < 0.0 {
        return Err(ShippingError::InvalidConfigValueError {
            field: "fees.rate_per_km".to_string(),
            value: fees.rate_per_km.to_string(),
            reason: "Rate must be a finite, non-negative number".to_string(),
        });
    }
    Ok(())
}

impl Validate for RefreshConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("origin", &self.origin)?;
        validate_url("endpoint", &self.endpoint)?;
        validate_path("table_path", &self.table_path)?;
        validate_range("request_delay_ms", self.request_delay_ms, 0, 60_000)?;
        validate_fee_schedule(&self.fees)?;
        Ok(())
    }
}

impl ConfigProvider for RefreshConfig {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn table_path(&self) -> &str {
        &self.table_path
    }

    fn request_delay_ms(&self) -> u64 {
        self.request_delay_ms
    }

    fn cities(&self) -> &[String] {
        &self.cities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_but_has_no_key() {
        let config = RefreshConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(
            require_api_key(&config),
            Err(ShippingError::MissingConfigError { ref field }) if field == "api_key"
        ));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = RefreshConfig {
            api_key: Some("  ".to_string()),
            ..RefreshConfig::default()
        };
        assert!(require_api_key(&config).is_err());

        let config = RefreshConfig {
            api_key: Some("abc".to_string()),
            ..RefreshConfig::default()
        };
        assert_eq!(require_api_key(&config).unwrap(), "abc");
    }

    #[test]
    fn test_placeholder_secret_is_absent() {
        assert_eq!(usable_secret("${GOOGLE_MAPS_API_KEY}"), None);
        assert_eq!(usable_secret("  "), None);
        assert_eq!(usable_secret(" abc "), Some("abc".to_string()));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut config = RefreshConfig::default();
        config.fees.rate_per_km = -1.0;
        assert!(config.validate().is_err());
    }
}
