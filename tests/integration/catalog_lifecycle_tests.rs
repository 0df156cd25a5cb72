use rust_decimal::Decimal;
use std::str::FromStr;

use price_drop_watcher::{AppError, Catalog, NewTrackedItem};

use super::*;

#[tokio::test]
async fn test_add_to_fresh_catalog_writes_single_entry() {
    let env = TestEnv::new();
    let mut catalog = env.store.load().await.unwrap();
    assert!(catalog.is_empty());

    env.store
        .add(
            &mut catalog,
            NewTrackedItem::new(
                "https://www.example.com/dp/B082VS5H3Y",
                Decimal::from(1000),
                Some("Boat Rockerz 255 Pro".to_string()),
            ),
        )
        .await
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.store.path()).unwrap()).unwrap();
    let entries = raw.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["url"], "https://www.example.com/dp/B082VS5H3Y");
    assert_eq!(entries[0]["name"], "Boat Rockerz 255 Pro");
    assert!(entries[0]["last_checked"].is_null());
    assert!(entries[0]["last_price"].is_null());
}

#[tokio::test]
async fn test_catalog_survives_reload_unchanged() {
    let env = TestEnv::new();
    let mut catalog = env.store.load().await.unwrap();
    for (url, target) in [
        ("https://www.example.com/dp/1", "1000"),
        ("https://www.example.com/dp/2", "249.99"),
    ] {
        env.store
            .add(&mut catalog, NewTrackedItem::new(url, Decimal::from_str(target).unwrap(), None))
            .await
            .unwrap();
    }

    let reloaded = env.store.load().await.unwrap();

    assert_eq!(reloaded, catalog);
    assert_eq!(reloaded.items()[1].target_price, Decimal::from_str("249.99").unwrap());
}

#[tokio::test]
async fn test_rejected_item_is_not_persisted() {
    let env = TestEnv::new();
    let mut catalog = env.store.load().await.unwrap();

    let result = env
        .store
        .add(&mut catalog, NewTrackedItem::new("not a url", Decimal::from(10), None))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(env.store.load().await.unwrap(), Catalog::default());
}

#[tokio::test]
async fn test_hand_written_catalog_without_observations_loads() {
    let env = TestEnv::new();
    std::fs::write(
        env.store.path(),
        r#"[{"url": "https://www.example.com/dp/9", "target_price": 500.0}]"#,
    )
    .unwrap();

    let catalog = env.store.load().await.unwrap();

    assert_eq!(catalog.len(), 1);
    let item = &catalog.items()[0];
    assert_eq!(item.target_price, Decimal::from(500));
    assert_eq!(item.name, None);
    assert_eq!(item.last_price, None);
    assert_eq!(item.display_name(), "Unknown");
}
