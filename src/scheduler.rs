use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

use crate::catalog_store::CatalogStore;
use crate::models::Catalog;
use crate::price_checker::{CycleReport, PriceChecker};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub cycles_completed: u64,
    pub items_checked: u64,
    pub items_skipped: u64,
    pub alerts_sent: u64,
    /// Qualifying drops whose alert was attempted but not delivered.
    pub alerts_failed: u64,
    pub errors: u64,
    pub failed_saves: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl SchedulerStats {
    fn record(&mut self, report: &CycleReport) {
        self.cycles_completed += 1;
        self.items_checked += report.items_checked as u64;
        self.items_skipped += report.items_skipped as u64;
        self.alerts_sent += report.alerts_sent as u64;
        self.alerts_failed += report.alerts_failed as u64;
        self.errors += report.errors as u64;
        self.last_cycle_at = Some(Utc::now());
    }
}

/// Runs scan cycles back to back with a fixed pause in between.
///
/// The next pause only starts once the previous cycle has been persisted,
/// so cycles never overlap.
pub struct CycleScheduler {
    checker: PriceChecker,
    store: CatalogStore,
    catalog: Catalog,
    interval: Duration,
    stats: SchedulerStats,
}

impl CycleScheduler {
    pub fn new(checker: PriceChecker, store: CatalogStore, catalog: Catalog, interval: Duration) -> Self {
        Self {
            checker,
            store,
            catalog,
            interval,
            stats: SchedulerStats::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Check every item once, then persist the catalog.
    ///
    /// A failed save is logged and counted; the in-memory catalog is still
    /// current and the next cycle writes it again.
    pub async fn run_once(&mut self) -> CycleReport {
        tracing::debug!("Starting scan of {} tracked items", self.catalog.len());
        let report = self.checker.run_cycle(&mut self.catalog).await;

        if let Err(e) = self.store.save(&self.catalog).await {
            self.stats.failed_saves += 1;
            tracing::error!("Failed to save catalog to {}: {}", self.store.path().display(), e);
        }

        self.stats.record(&report);
        tracing::info!(
            "Scan complete: {} checked, {} skipped, {} alerts, {} undelivered, {} errors",
            report.items_checked,
            report.items_skipped,
            report.alerts_sent,
            report.alerts_failed,
            report.errors
        );
        report
    }

    /// Loop until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// A stop request that arrives mid-cycle takes effect once that cycle
    /// has been saved.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> (Catalog, SchedulerStats) {
        tracing::info!("Price scheduler started, checking every {}s", self.interval.as_secs());

        loop {
            self.run_once().await;

            if *shutdown.borrow() {
                break;
            }

            let sender_gone = tokio::select! {
                _ = tokio::time::sleep(self.interval) => false,
                changed = shutdown.changed() => changed.is_err(),
            };
            if sender_gone || *shutdown.borrow() {
                break;
            }
        }

        tracing::info!("Price scheduler stopped after {} cycles", self.stats.cycles_completed);
        (self.catalog, self.stats)
    }
}
