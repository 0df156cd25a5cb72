// Integration tests for Price Drop Watcher
// These tests drive the real fetcher, checker, store and scheduler together
// against a local mock HTTP server.

pub mod catalog_lifecycle_tests;
pub mod scan_cycle_tests;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use price_drop_watcher::config::ScraperConfig;
use price_drop_watcher::plugins::traits::{NotificationResult, Notifier, PriceAlert};
use price_drop_watcher::{Catalog, CatalogStore, CycleScheduler, PageFetcher, PriceChecker, Result};

/// Notifier that remembers every alert instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<PriceAlert>>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<PriceAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &PriceAlert) -> Result<NotificationResult> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(NotificationResult::sent(format!("test-{}", alert.url)))
    }
}

pub fn test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        request_timeout: 2,
        ..ScraperConfig::default()
    }
}

/// Minimal product page in the layout the default selectors expect.
pub fn product_page(title: &str, price_text: &str) -> String {
    format!(
        r#"<html><body>
            <span id="productTitle"> {} </span>
            <div class="a-price"><span class="a-offscreen">{}</span></div>
        </body></html>"#,
        title, price_text
    )
}

pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Swap the page served at `page_path` for the next cycle.
pub async fn replace_pages(server: &MockServer, pages: Vec<(&str, String)>) {
    server.reset().await;
    for (page_path, body) in pages {
        mount_page(server, page_path, body).await;
    }
}

pub struct TestEnv {
    pub dir: TempDir,
    pub store: CatalogStore,
    pub notifier: RecordingNotifier,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        Self {
            dir,
            store,
            notifier: RecordingNotifier::default(),
        }
    }

    pub fn scheduler(&self, catalog: Catalog) -> CycleScheduler {
        let fetcher = PageFetcher::from_config(&test_scraper_config()).unwrap();
        let checker = PriceChecker::new(Box::new(fetcher), Box::new(self.notifier.clone()), "₹");
        CycleScheduler::new(checker, self.store.clone(), catalog, Duration::from_secs(300))
    }
}
