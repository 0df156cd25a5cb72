use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::error::AppError;

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// A product page the user wants watched, plus its last observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedItem {
    pub url: String,
    pub target_price: Decimal,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_checked_at")]
    pub last_checked: Option<DateTime<Utc>>,
    pub last_price: Option<Decimal>,
}

/// Accepts RFC 3339 strings and, for catalogs written by older tooling,
/// Unix epoch seconds (possibly fractional). Always written back as RFC 3339.
fn deserialize_checked_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CheckedAt {
        Rfc3339(DateTime<Utc>),
        EpochSeconds(f64),
    }

    match Option::<CheckedAt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CheckedAt::Rfc3339(at)) => Ok(Some(at)),
        Some(CheckedAt::EpochSeconds(secs)) => {
            let millis = (secs * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("last_checked out of range: {}", secs)))
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewTrackedItem {
    #[validate(url)]
    pub url: String,
    pub target_price: Decimal,
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

impl NewTrackedItem {
    pub fn new(url: impl Into<String>, target_price: Decimal, name: Option<String>) -> Self {
        Self {
            url: url.into(),
            target_price,
            name,
        }
    }

    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        let scheme = url::Url::parse(&self.url).map(|u| u.scheme().to_string());
        if !matches!(scheme.as_deref(), Ok("http") | Ok("https")) {
            return Err(AppError::Validation(format!(
                "url must be an http(s) page, got {}",
                self.url
            )));
        }
        if self.target_price.is_sign_negative() {
            return Err(AppError::Validation(format!(
                "target_price must not be negative, got {}",
                self.target_price
            )));
        }
        Ok(())
    }
}

impl TrackedItem {
    pub fn new(new_item: NewTrackedItem) -> Self {
        Self {
            url: new_item.url,
            target_price: new_item.target_price,
            name: new_item.name,
            last_checked: None,
            last_price: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Store a fresh price and return the one it replaced.
    ///
    /// The page title is only adopted when the item has no name yet.
    pub fn record_observation(
        &mut self,
        price: Decimal,
        title: Option<&str>,
        checked_at: DateTime<Utc>,
    ) -> Option<Decimal> {
        if self.name.as_deref().map_or(true, str::is_empty) {
            self.name = Some(title.unwrap_or(UNKNOWN_PRODUCT).to_string());
        }

        self.last_checked = Some(checked_at);
        self.last_price.replace(price)
    }

    pub fn is_qualifying_drop(&self, current: Decimal, previous: Option<Decimal>) -> bool {
        is_qualifying_drop(current, self.target_price, previous)
    }
}

/// At or below target, and strictly below the previous observation if any.
pub fn is_qualifying_drop(current: Decimal, target: Decimal, previous: Option<Decimal>) -> bool {
    if current > target {
        return false;
    }

    match previous {
        Some(previous) => current < previous,
        None => true,
    }
}
