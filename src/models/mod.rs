pub mod catalog;
pub mod tracked_item;

// Re-exports for convenience
pub use catalog::*;
pub use tracked_item::*;
