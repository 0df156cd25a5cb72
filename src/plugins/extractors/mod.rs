// Price extraction strategies
pub mod selector;

pub use selector::SelectorStrategy;
