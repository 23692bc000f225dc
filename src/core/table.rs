use crate::domain::model::{CityDistance, TableFile, ORIGIN};
use crate::utils::error::{Result, ShippingError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// The shipped table. `update-distances` rewrites this file and the next
/// build embeds the new distances.
const EMBEDDED_TABLE: &str = include_str!("../../data/cities.toml");

static BUILTIN: LazyLock<ReferenceTable> = LazyLock::new(|| {
    ReferenceTable::from_toml_str(EMBEDDED_TABLE).expect("embedded data/cities.toml is a valid table")
});

/// Ordered list of known cities. Order is kept for display only; lookups
/// go by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    cities: Vec<CityDistance>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ReferenceTable {
    /// Builds a table after checking names are present and unique, ignoring
    /// case. Names are stored trimmed.
    pub fn new(mut cities: Vec<CityDistance>) -> Result<Self> {
        if cities.is_empty() {
            return Err(ShippingError::TableError {
                message: "reference table has no cities".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(cities.len());
        for city in &mut cities {
            let trimmed = city.name.trim();
            if trimmed.len() != city.name.len() {
                city.name = trimmed.to_string();
            }
            let key = city.name.to_lowercase();
            if key.is_empty() {
                return Err(ShippingError::TableError {
                    message: "city name cannot be blank".to_string(),
                });
            }
            if !seen.insert(key) {
                return Err(ShippingError::TableError {
                    message: format!("duplicate city name '{}'", city.name),
                });
            }
        }

        Ok(Self { cities })
    }

    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_table_file(file: TableFile) -> Result<Self> {
        Self::new(file.cities)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TableFile = toml::from_str(content).map_err(|e| ShippingError::TableError {
            message: format!("TOML parsing error: {}", e),
        })?;
        Self::from_table_file(file)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Reads the table at `path`, or the embedded one when no file exists there.
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(
                "No reference table at {}, using the embedded table",
                path.display()
            );
            return Ok(Self::builtin());
        }
        Self::from_file(path)
    }

    pub fn to_table_file(&self) -> TableFile {
        TableFile {
            origin: Some(ORIGIN.to_string()),
            refreshed_at: None,
            cities: self.cities.clone(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_table_file())?)
    }

    /// Exact, case-insensitive match on the trimmed input.
    pub fn find(&self, name: &str) -> Option<&CityDistance> {
        let wanted = normalize(name);
        self.cities
            .iter()
            .find(|city| normalize(&city.name) == wanted)
    }

    /// Cities whose name contains `query`, ignoring case. A blank query
    /// returns the whole table.
    pub fn search(&self, query: &str) -> Vec<&CityDistance> {
        let needle = normalize(query);
        if needle.is_empty() {
            return self.cities.iter().collect();
        }
        self.cities
            .iter()
            .filter(|city| normalize(&city.name).contains(&needle))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.cities.iter().map(|city| city.name.clone()).collect()
    }

    pub fn cities(&self) -> &[CityDistance] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::builtin()
    }
}
