pub mod checkout;
pub mod refresh;
pub mod resolver;
pub mod table;

pub use crate::domain::model::{CityDistance, CityOutcome, FeeSchedule, ShippingQuote, TableFile};
pub use crate::domain::ports::{ConfigProvider, DistanceSource, TableStore};
pub use crate::utils::error::Result;
