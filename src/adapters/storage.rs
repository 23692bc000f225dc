use crate::domain::model::TableFile;
use crate::domain::ports::TableStore;
use crate::utils::error::{Result, ShippingError};
use std::fs;
use std::path::{Path, PathBuf};

/// Reference table kept as a TOML file on the local disk.
#[derive(Debug, Clone)]
pub struct LocalTableStore {
    path: PathBuf,
}

impl LocalTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for LocalTableStore {
    async fn load(&self) -> Result<Option<TableFile>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let table = toml::from_str(&content).map_err(|e| ShippingError::TableError {
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(Some(table))
    }

    async fn save(&self, table: &TableFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(table)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("Reference table written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CityDistance;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = LocalTableStore::new(dir.path().join("cities.toml"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = LocalTableStore::new(dir.path().join("data").join("cities.toml"));
        let table = TableFile {
            origin: Some("Imaara Mall, Nairobi, Kenya".to_string()),
            refreshed_at: Some(chrono::Utc::now()),
            cities: vec![CityDistance::new("Murang'a", 89)],
        };

        store.save(&table).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded.cities, table.cities);
        assert_eq!(loaded.origin, table.origin);
        assert!(!store.path().with_extension("toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_table_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cities.toml");
        std::fs::write(&path, "[[cities]]\nname = 5\n").unwrap();

        let err = LocalTableStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, ShippingError::TableError { .. }));
    }
}
