use crate::config::{usable_secret, validate_fee_schedule, RefreshConfig};
use crate::domain::model::FeeSchedule;
use crate::utils::error::{Result, ShippingError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub refresh: RefreshSection,
    pub fees: Option<FeesSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshSection {
    pub origin: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub table_path: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub cities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeesSection {
    pub base_fee: Option<u64>,
    pub rate_per_km: Option<f64>,
    pub min_fee: Option<u64>,
    pub default_distance_km: Option<u32>,
}

impl FeesSection {
    pub fn apply(&self, mut schedule: FeeSchedule) -> FeeSchedule {
        if let Some(base_fee) = self.base_fee {
            schedule.base_fee = base_fee;
        }
        if let Some(rate_per_km) = self.rate_per_km {
            schedule.rate_per_km = rate_per_km;
        }
        if let Some(min_fee) = self.min_fee {
            schedule.min_fee = min_fee;
        }
        if let Some(default_distance_km) = self.default_distance_km {
            schedule.default_distance_km = default_distance_km;
        }
        schedule
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses after replacing `${VAR}` with the variable's value. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ShippingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        match &self.fees {
            Some(fees) => fees.apply(FeeSchedule::default()),
            None => FeeSchedule::default(),
        }
    }

    /// Layers the file over the defaults.
    pub fn into_refresh_config(self) -> RefreshConfig {
        let fees = self.fee_schedule();
        let defaults = RefreshConfig::default();
        let section = self.refresh;

        RefreshConfig {
            origin: section.origin.unwrap_or(defaults.origin),
            endpoint: section.endpoint.unwrap_or(defaults.endpoint),
            api_key: section.api_key.as_deref().and_then(usable_secret),
            table_path: section.table_path.unwrap_or(defaults.table_path),
            request_delay_ms: section
                .request_delay_ms
                .unwrap_or(defaults.request_delay_ms),
            cities: section.cities.unwrap_or_default(),
            fees,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_fee_schedule(&self.fee_schedule())?;
        self.clone().into_refresh_config().validate()
    }
}
