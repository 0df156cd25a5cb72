use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of fetching one product page. A failed fetch has neither field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageObservation {
    pub price: Option<Decimal>,
    pub title: Option<String>,
}

impl PageObservation {
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Anything that can report the current price of a URL.
///
/// Implementations swallow their own errors: a failure is an observation
/// without a price.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, url: &str) -> PageObservation;
}
