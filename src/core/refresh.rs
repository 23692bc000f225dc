use crate::core::table::ReferenceTable;
use crate::core::{CityDistance, CityOutcome, DistanceSource, TableFile, TableStore};
use crate::domain::model::DEFAULT_DISTANCE_KM;
use crate::utils::error::Result;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// Pause between two distance requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub origin: String,
    pub outcomes: Vec<CityOutcome>,
    pub table: TableFile,
}

impl RefreshReport {
    pub fn degraded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_degraded())
            .map(CityOutcome::name)
            .collect()
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_degraded()).count()
    }
}

/// What a run would query, worked out from the stored table alone. Needs no
/// distance source, so a dry run can be planned without a credential.
#[derive(Debug, Clone)]
pub struct RefreshPlan {
    pub current: ReferenceTable,
    pub targets: Vec<String>,
}

impl RefreshPlan {
    pub async fn load<S: TableStore>(store: &S, cities: &[String]) -> Result<Self> {
        let current = load_table(store).await?;
        let targets = Self::targets(&current, cities);
        Ok(Self { current, targets })
    }

    /// The requested cities, spelled as in the table when they are already
    /// known, or the whole table.
    pub fn targets(current: &ReferenceTable, cities: &[String]) -> Vec<String> {
        if cities.is_empty() {
            return current.names();
        }
        dedup_targets(cities)
            .into_iter()
            .map(|city| match current.find(&city) {
                Some(entry) => entry.name.clone(),
                None => city,
            })
            .collect()
    }

    /// Stored distance for a target, `None` when the city would be added.
    pub fn previous_km(&self, city: &str) -> Option<u32> {
        self.current.find(city).map(|entry| entry.distance_km)
    }
}

/// The stored table, or the embedded one before the first refresh.
pub async fn load_table<S: TableStore>(store: &S) -> Result<ReferenceTable> {
    match store.load().await? {
        Some(file) => ReferenceTable::from_table_file(file),
        None => {
            tracing::info!("No stored reference table, starting from the built-in list");
            Ok(ReferenceTable::builtin())
        }
    }
}

/// Rewrites the reference table one city at a time.
///
/// A city whose lookup fails keeps its previous distance (or the default
/// distance when it had none), so the written table is always complete.
pub struct RefreshEngine<D: DistanceSource, S: TableStore> {
    source: D,
    store: S,
    origin: String,
    request_delay: Duration,
    default_distance_km: u32,
}

impl<D: DistanceSource, S: TableStore> RefreshEngine<D, S> {
    pub fn new(source: D, store: S, origin: impl Into<String>) -> Self {
        Self {
            source,
            store,
            origin: origin.into(),
            request_delay: DEFAULT_REQUEST_DELAY,
            default_distance_km: DEFAULT_DISTANCE_KM,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_default_distance(mut self, distance_km: u32) -> Self {
        self.default_distance_km = distance_km;
        self
    }

    /// Fetches every target, in order, and decides the distance to keep for each.
    pub async fn fetch(&self, current: &ReferenceTable, targets: &[String]) -> Vec<CityOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());

        for (index, city) in targets.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let previous_km = current.find(city).map(|entry| entry.distance_km);
            let outcome = match self.source.distance_km(&self.origin, city).await {
                Ok(distance_km) => {
                    tracing::info!("✓ {:<20} {} km", city, distance_km);
                    CityOutcome::Updated {
                        name: city.clone(),
                        previous_km,
                        distance_km,
                    }
                }
                Err(e) => {
                    let distance_km = previous_km.unwrap_or(self.default_distance_km);
                    tracing::warn!("~ {:<20} {} km (kept existing): {}", city, distance_km, e);
                    CityOutcome::Kept {
                        name: city.clone(),
                        distance_km,
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Applies outcomes entry by entry: known cities are overwritten in
    /// place, new ones are appended, untouched ones stay as they were.
    pub fn merge(&self, current: &ReferenceTable, outcomes: &[CityOutcome]) -> TableFile {
        let mut cities = current.cities().to_vec();
        for outcome in outcomes {
            let wanted = outcome.name().trim().to_lowercase();
            match cities.iter_mut().find(|c| c.name.trim().to_lowercase() == wanted) {
                Some(entry) => entry.distance_km = outcome.distance_km(),
                None => cities.push(CityDistance::new(outcome.name(), outcome.distance_km())),
            }
        }

        TableFile {
            origin: Some(self.origin.clone()),
            refreshed_at: Some(Utc::now()),
            cities,
        }
    }

    /// Runs a refresh and writes the merged table back. An empty `cities`
    /// list refreshes every city in the current table.
    pub async fn run(&self, cities: &[String]) -> Result<RefreshReport> {
        let RefreshPlan { current, targets } = RefreshPlan::load(&self.store, cities).await?;

        tracing::info!("📍 Origin: {}", self.origin);
        tracing::info!("🏙 Cities: {}", targets.len());

        let outcomes = self.fetch(&current, &targets).await;
        let table = self.merge(&current, &outcomes);

        ReferenceTable::new(table.cities.clone())?;
        self.store.save(&table).await?;

        let report = RefreshReport {
            origin: self.origin.clone(),
            outcomes,
            table,
        };

        let degraded = report.degraded();
        if !degraded.is_empty() {
            tracing::warn!(
                "⚠ {} city/cities used fallback distances: {}",
                degraded.len(),
                degraded.join(", ")
            );
        }
        tracing::info!(
            "✅ Reference table updated with {} cities ({} refreshed)",
            report.table.cities.len(),
            report.updated_count()
        );

        Ok(report)
    }
}

/// Trims names, drops blanks and case-insensitive repeats, keeps first-seen order.
fn dedup_targets(cities: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    cities
        .iter()
        .map(|city| city.trim())
        .filter(|city| !city.is_empty())
        .filter(|city| seen.insert(city.to_lowercase()))
        .map(str::to_string)
        .collect()
}
