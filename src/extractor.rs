use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::models::UNKNOWN_PRODUCT;
use crate::plugins::extractors::selector::parse_selector;
use crate::plugins::extractors::SelectorStrategy;
use crate::plugins::traits::{PageObservation, PriceStrategy, StrategyOutcome};
use crate::utils::error::Result;

/// Ordered chain of price strategies plus a title lookup.
pub struct PriceExtractor {
    strategies: Vec<Box<dyn PriceStrategy>>,
    title_selector: Selector,
}

impl PriceExtractor {
    pub fn new(strategies: Vec<Box<dyn PriceStrategy>>, title_selector: &str) -> Result<Self> {
        Ok(Self {
            strategies,
            title_selector: parse_selector(title_selector)?,
        })
    }

    /// Build the chain from configured selector rules, in order.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        let strategies = config
            .price_selectors
            .iter()
            .map(|rule| {
                SelectorStrategy::from_rule(rule).map(|s| Box::new(s) as Box<dyn PriceStrategy>)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(strategies, &config.title_selector)
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Parse a page body and pull out both price and title.
    pub fn extract(&self, html: &str) -> PageObservation {
        let document = Html::parse_document(html);
        PageObservation {
            price: self.extract_price(&document),
            title: Some(self.extract_title(&document)),
        }
    }

    /// First strategy with an opinion wins. An unparseable match ends the
    /// search with no price rather than falling through.
    pub fn extract_price(&self, document: &Html) -> Option<Decimal> {
        for strategy in &self.strategies {
            match strategy.extract(document) {
                StrategyOutcome::NoMatch => continue,
                StrategyOutcome::Price(price) => {
                    debug!("Price {} found via {}", price, strategy.name());
                    return Some(price);
                }
                StrategyOutcome::Unparseable { raw } => {
                    warn!("Could not parse price text '{}' found via {}", raw, strategy.name());
                    return None;
                }
            }
        }

        None
    }

    pub fn extract_title(&self, document: &Html) -> String {
        document
            .select(&self.title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string())
    }
}
