use crate::config::toml_config::TomlConfig;
use crate::config::{usable_secret, RefreshConfig};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "update-distances")]
#[command(about = "Refresh road distances of the shipping reference table")]
pub struct CliConfig {
    /// TOML configuration file; command-line flags override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Distance Matrix API key (falls back to GOOGLE_MAPS_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Address every distance is measured from
    #[arg(long)]
    pub origin: Option<String>,

    /// Distance Matrix endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Reference table file to read and rewrite
    #[arg(long)]
    pub table: Option<String>,

    /// Only refresh these cities (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub cities: Vec<String>,

    /// Pause between requests, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// List what would be refreshed without calling the service
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Defaults, then the config file, then flags, then the environment for the key.
    pub fn resolve(&self) -> Result<RefreshConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_refresh_config(),
            None => RefreshConfig::default(),
        };

        if let Some(key) = self.api_key.as_deref().and_then(usable_secret) {
            config.api_key = Some(key);
        }
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(table) = &self.table {
            config.table_path = table.clone();
        }
        if !self.cities.is_empty() {
            config.cities = self.cities.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_delay_ms = delay_ms;
        }

        Ok(config.with_env_fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[refresh]
origin = "Somewhere"
api_key = "file-key"
request_delay_ms = 500
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "update-distances",
            "--config",
            file.path().to_str().unwrap(),
            "--api-key",
            "flag-key",
            "--cities",
            "Nairobi,Nakuru",
            "--delay-ms",
            "0",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.origin, "Somewhere");
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.cities, vec!["Nairobi", "Nakuru"]);
        assert_eq!(config.request_delay_ms, 0);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = CliConfig::parse_from(["update-distances", "--config", "/nonexistent/x.toml"]);
        assert!(cli.resolve().is_err());
    }
}
