use crate::core::table::ReferenceTable;
use crate::domain::model::{FeeSchedule, ShippingQuote, DEFAULT_TABLE_PATH, TABLE_PATH_ENV};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DEPLOYED: LazyLock<ShippingResolver> = LazyLock::new(ShippingResolver::deployed);

/// Maps a free-text city name to a delivery fee.
///
/// Resolution never fails: a name that is not in the table is charged at the
/// schedule's default distance so checkout can always show a number.
#[derive(Debug, Clone)]
pub struct ShippingResolver {
    table: ReferenceTable,
    schedule: FeeSchedule,
}

impl ShippingResolver {
    pub fn new(table: ReferenceTable, schedule: FeeSchedule) -> Self {
        Self { table, schedule }
    }

    pub fn builtin() -> Self {
        Self::new(ReferenceTable::builtin(), FeeSchedule::default())
    }

    /// Resolver over the table file at `path`, or the embedded table when
    /// the file does not exist.
    pub fn from_table_path<P: AsRef<Path>>(path: P, schedule: FeeSchedule) -> Result<Self> {
        Ok(Self::new(ReferenceTable::load_or_builtin(path)?, schedule))
    }

    /// Path of the deployed table: `SHIPPING_TABLE_PATH` if set, else
    /// `data/cities.toml`.
    pub fn deployed_table_path() -> PathBuf {
        std::env::var_os(TABLE_PATH_ENV)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_PATH))
    }

    /// Resolver over the deployed table file. An unreadable file is logged
    /// and the embedded table is used, since quoting must not fail.
    pub fn deployed() -> Self {
        let path = Self::deployed_table_path();
        Self::from_table_path(&path, FeeSchedule::default()).unwrap_or_else(|e| {
            tracing::error!(
                "Could not read reference table {}: {}. Using the embedded table",
                path.display(),
                e
            );
            Self::builtin()
        })
    }

    /// Process-wide resolver, loaded once from the deployed table.
    pub fn global() -> &'static ShippingResolver {
        &DEPLOYED
    }

    pub fn resolve(&self, city_name: &str) -> ShippingQuote {
        let distance_km = match self.table.find(city_name) {
            Some(city) => city.distance_km,
            None => {
                tracing::debug!(
                    "Unknown city '{}', charging default distance {} km",
                    city_name.trim(),
                    self.schedule.default_distance_km
                );
                self.schedule.default_distance_km
            }
        };
        self.schedule.quote(distance_km)
    }

    pub fn fee(&self, city_name: &str) -> u64 {
        self.resolve(city_name).fee
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }
}

/// [`ShippingResolver::resolve`] over the deployed table.
pub fn resolve(city_name: &str) -> ShippingQuote {
    ShippingResolver::global().resolve(city_name)
}
