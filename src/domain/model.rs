use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat amount added to every quote (KES).
pub const BASE_FEE: u64 = 150;
/// Charge per kilometre of road distance from the origin (KES).
pub const RATE_PER_KM: f64 = 2.0;
/// No quote falls below this amount (KES).
pub const MIN_FEE: u64 = 200;
/// Distance charged when a city is not in the reference table.
pub const DEFAULT_DISTANCE_KM: u32 = 500;

/// Fixed fulfilment location every distance is measured from.
pub const ORIGIN: &str = "Imaara Mall, Nairobi, Kenya";

/// Reference table written by `update-distances` and read by the resolver.
pub const DEFAULT_TABLE_PATH: &str = "data/cities.toml";
/// Overrides [`DEFAULT_TABLE_PATH`] for the process-wide resolver.
pub const TABLE_PATH_ENV: &str = "SHIPPING_TABLE_PATH";

/// One reference point: a city or town and its road distance from the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDistance {
    pub name: String,
    pub distance_km: u32,
}

impl CityDistance {
    pub fn new(name: impl Into<String>, distance_km: u32) -> Self {
        Self {
            name: name.into(),
            distance_km,
        }
    }
}

/// Result of resolving a city name. Computed per request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub fee: u64,
    pub distance_km: u32,
}

/// The constants of the fee formula, grouped so a deployment can override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub base_fee: u64,
    pub rate_per_km: f64,
    pub min_fee: u64,
    pub default_distance_km: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee: BASE_FEE,
            rate_per_km: RATE_PER_KM,
            min_fee: MIN_FEE,
            default_distance_km: DEFAULT_DISTANCE_KM,
        }
    }
}

impl FeeSchedule {
    /// `max(min_fee, base_fee + round(distance_km * rate_per_km))`.
    ///
    /// Rounds half away from zero before the floor is applied.
    pub fn fee_for(&self, distance_km: u32) -> u64 {
        let variable = (f64::from(distance_km) * self.rate_per_km).round();
        let variable = if variable.is_finite() && variable > 0.0 {
            variable as u64
        } else {
            0
        };
        self.min_fee.max(self.base_fee.saturating_add(variable))
    }

    pub fn quote(&self, distance_km: u32) -> ShippingQuote {
        ShippingQuote {
            fee: self.fee_for(distance_km),
            distance_km,
        }
    }
}

/// On-disk form of the reference table, rewritten by the refresh tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    pub cities: Vec<CityDistance>,
}

/// What happened to one city during a refresh run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CityOutcome {
    Updated {
        name: String,
        previous_km: Option<u32>,
        distance_km: u32,
    },
    Kept {
        name: String,
        distance_km: u32,
        reason: String,
    },
}

impl CityOutcome {
    pub fn name(&self) -> &str {
        match self {
            CityOutcome::Updated { name, .. } | CityOutcome::Kept { name, .. } => name,
        }
    }

    pub fn distance_km(&self) -> u32 {
        match self {
            CityOutcome::Updated { distance_km, .. } | CityOutcome::Kept { distance_km, .. } => {
                *distance_km
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CityOutcome::Kept { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_floor_applies_to_short_distances() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.fee_for(0), 200);
        assert_eq!(schedule.fee_for(12), 200);
        assert_eq!(schedule.fee_for(25), 200);
        assert_eq!(schedule.fee_for(26), 202);
    }

    #[test]
    fn test_fee_rounds_before_floor() {
        let schedule = FeeSchedule {
            base_fee: 150,
            rate_per_km: 1.25,
            min_fee: 0,
            default_distance_km: 500,
        };
        // 3 * 1.25 = 3.75 -> 4, 2 * 1.25 = 2.5 -> 3
        assert_eq!(schedule.fee_for(3), 154);
        assert_eq!(schedule.fee_for(2), 153);
    }

    #[test]
    fn test_outcome_accessors() {
        let kept = CityOutcome::Kept {
            name: "Lamu".to_string(),
            distance_km: 700,
            reason: "ZERO_RESULTS".to_string(),
        };
        assert!(kept.is_degraded());
        assert_eq!(kept.name(), "Lamu");
        assert_eq!(kept.distance_km(), 700);
    }
}
