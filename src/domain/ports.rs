use crate::domain::model::TableFile;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Road distance lookup from an origin address to a destination.
#[async_trait]
pub trait DistanceSource: Send + Sync {
    /// Distance in whole kilometres, or the reason this destination failed.
    async fn distance_km(&self, origin: &str, city: &str) -> Result<u32>;
}

/// Where the reference table artifact lives between refresh runs.
pub trait TableStore: Send + Sync {
    /// `Ok(None)` when no table has been written yet.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<TableFile>>> + Send;
    fn save(&self, table: &TableFile) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn origin(&self) -> &str;
    fn endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn table_path(&self) -> &str;
    fn request_delay_ms(&self) -> u64;
    /// Target cities; empty means every city already in the table.
    fn cities(&self) -> &[String];
}
