use rust_decimal::Decimal;
use scraper::Html;

/// What a single strategy made of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// Nothing usable here; the next strategy gets a turn.
    NoMatch,
    Price(Decimal),
    /// Text was found but did not parse. Extraction stops.
    Unparseable { raw: String },
}

/// One way of pulling a price out of a product page.
///
/// Strategies are tried in configured order by [`crate::extractor::PriceExtractor`]
/// until one returns something other than [`StrategyOutcome::NoMatch`].
pub trait PriceStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, document: &Html) -> StrategyOutcome;
}
