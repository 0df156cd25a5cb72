pub mod extractors;
pub mod notifiers;
pub mod traits;

pub use traits::{Notifier, PriceSource, PriceStrategy};
