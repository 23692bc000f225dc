pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::RefreshConfig;

pub use adapters::{DistanceMatrixClient, LocalTableStore};
pub use core::{
    checkout::{Cart, CheckoutTotals},
    refresh::{RefreshEngine, RefreshPlan, RefreshReport},
    resolver::{resolve, ShippingResolver},
    table::ReferenceTable,
};
pub use domain::model::{
    CityDistance, FeeSchedule, ShippingQuote, BASE_FEE, DEFAULT_DISTANCE_KM, DEFAULT_TABLE_PATH,
    MIN_FEE, RATE_PER_KM, TABLE_PATH_ENV,
};
pub use utils::error::{Result, ShippingError};
