pub mod extractor;
pub mod notifier;
pub mod source;

pub use extractor::{PriceStrategy, StrategyOutcome};
pub use notifier::{Notifier, NotificationResult, PriceAlert};
pub use source::{PageObservation, PriceSource};
