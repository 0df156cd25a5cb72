use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::SelectorRule;
use crate::plugins::traits::{PriceStrategy, StrategyOutcome};
use crate::utils::error::AppError;

/// Reads the first element matching a CSS selector and keeps only the
/// digits and decimal points of its text (or of one of its attributes).
pub struct SelectorStrategy {
    label: String,
    selector: Selector,
    attribute: Option<String>,
}

impl SelectorStrategy {
    pub fn new(css: &str, attribute: Option<String>) -> Result<Self, AppError> {
        let selector = parse_selector(css)?;
        let label = match &attribute {
            Some(attribute) => format!("{}@{}", css, attribute),
            None => css.to_string(),
        };

        Ok(Self {
            label,
            selector,
            attribute,
        })
    }

    pub fn from_rule(rule: &SelectorRule) -> Result<Self, AppError> {
        Self::new(&rule.css, rule.attribute.clone())
    }
}

impl PriceStrategy for SelectorStrategy {
    fn name(&self) -> &str {
        &self.label
    }

    fn extract(&self, document: &Html) -> StrategyOutcome {
        let Some(element) = document.select(&self.selector).next() else {
            return StrategyOutcome::NoMatch;
        };

        let raw = match &self.attribute {
            Some(attribute) => match element.value().attr(attribute) {
                Some(value) => value.to_string(),
                None => return StrategyOutcome::NoMatch,
            },
            None => element.text().collect::<String>(),
        };

        let cleaned = clean_price_text(raw.trim());
        if cleaned.is_empty() {
            return StrategyOutcome::NoMatch;
        }

        match parse_price(&cleaned) {
            Some(price) => StrategyOutcome::Price(price),
            None => StrategyOutcome::Unparseable { raw: cleaned },
        }
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn non_price_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^0-9.]").unwrap())
}

/// Drop everything but ASCII digits and `.`; thousands separators and
/// currency symbols disappear with it.
pub fn clean_price_text(text: &str) -> String {
    non_price_chars().replace_all(text, "").into_owned()
}

/// Parse cleaned price text the way a float literal reads: `"1299."` and
/// `".5"` are fine, `"1.2.3"` and `"."` are not.
pub fn parse_price(cleaned: &str) -> Option<Decimal> {
    if cleaned.matches('.').count() > 1 {
        return None;
    }

    let mut normalized = cleaned.strip_suffix('.').unwrap_or(cleaned).to_string();
    if normalized.is_empty() {
        return None;
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }

    // Values past Decimal's 96-bit range come back as None (Unparseable)
    Decimal::from_str(&normalized).ok()
}
