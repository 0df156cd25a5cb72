use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::models::{Catalog, TrackedItem};
use crate::plugins::traits::{Notifier, PriceAlert, PriceSource};
use crate::utils::error::Result;

/// What happened to one item during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemCheckResult {
    /// No price could be read; the item was left untouched.
    Skipped,
    Observed {
        price: Decimal,
        previous_price: Option<Decimal>,
        alert: AlertOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertOutcome {
    NotQualifying,
    Sent,
    /// Qualifying drop, but delivery did not go through.
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub items_total: usize,
    pub items_checked: usize,
    pub items_skipped: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    pub errors: usize,
}

/// Fetches, compares and alerts for each catalog item in turn.
pub struct PriceChecker {
    source: Box<dyn PriceSource>,
    notifier: Box<dyn Notifier>,
    currency_symbol: String,
}

impl PriceChecker {
    pub fn new(
        source: Box<dyn PriceSource>,
        notifier: Box<dyn Notifier>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            source,
            notifier,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Check a single item, mutating its stored observation in place.
    pub async fn check_item(&self, item: &mut TrackedItem) -> Result<ItemCheckResult> {
        let observation = self.source.fetch(&item.url).await;
        let Some(price) = observation.price else {
            return Ok(ItemCheckResult::Skipped);
        };

        let previous_price = item.record_observation(price, observation.title.as_deref(), Utc::now());
        info!("{}: {}{}", item.display_name(), self.currency_symbol, price);

        if !item.is_qualifying_drop(price, previous_price) {
            return Ok(ItemCheckResult::Observed {
                price,
                previous_price,
                alert: AlertOutcome::NotQualifying,
            });
        }

        let alert = PriceAlert {
            name: item.display_name().to_string(),
            url: item.url.clone(),
            price,
            previous_price,
            target_price: item.target_price,
        };
        let result = self.notifier.send(&alert).await?;

        let outcome = if result.success {
            info!("Alert sent for {} at {}{}", alert.name, self.currency_symbol, price);
            AlertOutcome::Sent
        } else {
            let reason = result.error.unwrap_or_else(|| "unknown error".to_string());
            warn!("Alert for {} at {}{} not delivered: {}", alert.name, self.currency_symbol, price, reason);
            AlertOutcome::Failed(reason)
        };

        Ok(ItemCheckResult::Observed {
            price,
            previous_price,
            alert: outcome,
        })
    }

    /// One pass over the whole catalog. A failing item is logged and the
    /// pass moves on; nothing here aborts the cycle.
    pub async fn run_cycle(&self, catalog: &mut Catalog) -> CycleReport {
        let mut report = CycleReport {
            items_total: catalog.len(),
            ..CycleReport::default()
        };

        for item in catalog.iter_mut() {
            match self.check_item(item).await {
                Ok(ItemCheckResult::Skipped) => report.items_skipped += 1,
                Ok(ItemCheckResult::Observed { alert, .. }) => {
                    report.items_checked += 1;
                    match alert {
                        AlertOutcome::NotQualifying => {}
                        AlertOutcome::Sent => report.alerts_sent += 1,
                        AlertOutcome::Failed(_) => report.alerts_failed += 1,
                    }
                }
                Err(e) => {
                    report.errors += 1;
                    error!("Error processing {}: {}", item.display_name(), e);
                }
            }
        }

        report
    }
}
