use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::{Catalog, NewTrackedItem, TrackedItem};
use crate::utils::error::Result;

/// Flat JSON file holding the whole catalog.
///
/// Every save rewrites the file in full. There is no temp-file swap, so a
/// crash mid-write can leave a truncated catalog behind.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the catalog, creating an empty one on disk if the file is absent.
    ///
    /// Malformed content is returned as an error rather than replaced.
    pub async fn load(&self) -> Result<Catalog> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let catalog: Catalog = serde_json::from_slice(&bytes)?;
                debug!("Loaded {} tracked items from {}", catalog.len(), self.path.display());
                Ok(catalog)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No catalog at {}, starting empty", self.path.display());
                let catalog = Catalog::default();
                self.save(&catalog).await?;
                Ok(catalog)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(catalog)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved {} tracked items to {}", catalog.len(), self.path.display());
        Ok(())
    }

    /// Append a new item and persist the catalog straight away.
    pub async fn add<'a>(
        &self,
        catalog: &'a mut Catalog,
        new_item: NewTrackedItem,
    ) -> Result<&'a TrackedItem> {
        new_item.check()?;

        let item = TrackedItem::new(new_item);
        info!("Tracking {} at target {}", item.url, item.target_price);
        let index = catalog.len();
        catalog.push(item);
        self.save(catalog).await?;

        Ok(&catalog.items()[index])
    }
}
