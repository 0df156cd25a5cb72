pub mod catalog_store;
pub mod config;
pub mod extractor;
pub mod models;
pub mod plugins;
pub mod price_checker;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use catalog_store::CatalogStore;
pub use config::AppConfig;
pub use extractor::PriceExtractor;
pub use models::{Catalog, NewTrackedItem, TrackedItem};
pub use price_checker::{CycleReport, PriceChecker};
pub use scheduler::{CycleScheduler, SchedulerStats};
pub use scraper::PageFetcher;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
