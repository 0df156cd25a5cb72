use rust_decimal::Decimal;
use std::str::FromStr;
use wiremock::MockServer;

use price_drop_watcher::{Catalog, NewTrackedItem, TrackedItem};

use super::*;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn tracked(server: &MockServer, page_path: &str, target: &str) -> TrackedItem {
    TrackedItem::new(NewTrackedItem::new(
        format!("{}{}", server.uri(), page_path),
        dec(target),
        None,
    ))
}

#[tokio::test]
async fn test_first_observation_below_target_alerts_and_persists() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/1", product_page("Boat Rockerz 255 Pro", "₹999.0")).await;
    let env = TestEnv::new();
    let mut scheduler = env.scheduler(Catalog::new(vec![tracked(&server, "/dp/1", "1000")]));

    let report = scheduler.run_once().await;

    assert_eq!(report.alerts_sent, 1);
    let alerts = env.notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].price, dec("999.0"));
    assert_eq!(alerts[0].previous_price, None);
    assert_eq!(alerts[0].name, "Boat Rockerz 255 Pro");

    let saved = env.store.load().await.unwrap();
    let item = &saved.items()[0];
    assert_eq!(item.last_price, Some(dec("999.0")));
    assert_eq!(item.name.as_deref(), Some("Boat Rockerz 255 Pro"));
    assert!(item.last_checked.is_some());
}

#[tokio::test]
async fn test_unchanged_price_does_not_realert() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/1", product_page("Speaker", "₹999.0")).await;
    let env = TestEnv::new();
    let mut item = tracked(&server, "/dp/1", "1000");
    item.last_price = Some(dec("999.0"));
    let mut scheduler = env.scheduler(Catalog::new(vec![item]));

    let first = scheduler.run_once().await;
    let second = scheduler.run_once().await;

    assert_eq!(first.items_checked, 1);
    assert_eq!(first.alerts_sent + second.alerts_sent, 0);
    assert!(env.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_unreachable_page_leaves_item_and_cycle_continues() {
    let server = MockServer::start().await;
    mount_status(&server, "/dp/down", 503).await;
    mount_page(&server, "/dp/up", product_page("Headphones", "₹1,499.00")).await;
    let env = TestEnv::new();
    let mut down = tracked(&server, "/dp/down", "1000");
    down.last_price = Some(dec("1200"));
    let mut scheduler = env.scheduler(Catalog::new(vec![
        down.clone(),
        tracked(&server, "/dp/up", "1000"),
    ]));

    let report = scheduler.run_once().await;

    assert_eq!(report.items_skipped, 1);
    assert_eq!(report.items_checked, 1);
    assert_eq!(report.alerts_sent, 0);

    let saved = env.store.load().await.unwrap();
    assert_eq!(saved.items()[0], down);
    assert_eq!(saved.items()[1].last_price, Some(dec("1499.00")));
}

#[tokio::test]
async fn test_page_without_price_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/dp/1",
        "<html><body><span id=\"productTitle\">Gone</span></body></html>".to_string(),
    )
    .await;
    let env = TestEnv::new();
    let mut scheduler = env.scheduler(Catalog::new(vec![tracked(&server, "/dp/1", "1000")]));

    let report = scheduler.run_once().await;

    assert_eq!(report.items_skipped, 1);
    let item = &scheduler.catalog().items()[0];
    assert_eq!(item.last_price, None);
    assert_eq!(item.last_checked, None);
    assert_eq!(item.name, None);
}

#[tokio::test]
async fn test_each_further_drop_alerts_again() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    let mut scheduler = env.scheduler(Catalog::new(vec![tracked(&server, "/dp/1", "1000")]));

    for price in ["₹980", "₹960", "₹960", "₹940"] {
        replace_pages(&server, vec![("/dp/1", product_page("Speaker", price))]).await;
        scheduler.run_once().await;
    }

    let prices: Vec<Decimal> = env.notifier.alerts().iter().map(|a| a.price).collect();
    assert_eq!(prices, vec![dec("980"), dec("960"), dec("940")]);
    assert_eq!(scheduler.stats().alerts_sent, 3);
}

#[tokio::test]
async fn test_returning_to_an_earlier_low_alerts_again() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    let mut scheduler = env.scheduler(Catalog::new(vec![tracked(&server, "/dp/1", "1000")]));

    // Only the immediately preceding observation is compared against
    for price in ["₹900", "₹950", "₹900"] {
        replace_pages(&server, vec![("/dp/1", product_page("Speaker", price))]).await;
        scheduler.run_once().await;
    }

    let alerts = env.notifier.alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1].previous_price, Some(dec("950")));
}

#[tokio::test]
async fn test_stored_name_is_kept_over_page_title() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/1", product_page("Some Long Listing Title", "₹1,200")).await;
    let env = TestEnv::new();
    let item = TrackedItem::new(NewTrackedItem::new(
        format!("{}/dp/1", server.uri()),
        dec("1000"),
        Some("My Speaker".to_string()),
    ));
    let mut scheduler = env.scheduler(Catalog::new(vec![item]));

    scheduler.run_once().await;

    let item = &scheduler.catalog().items()[0];
    assert_eq!(item.name.as_deref(), Some("My Speaker"));
    assert_eq!(item.last_price, Some(dec("1200")));
}
