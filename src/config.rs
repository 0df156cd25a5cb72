use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub products_file: PathBuf,
    /// Seed one example item when the catalog is empty on startup.
    pub seed_example: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub price_selectors: Vec<SelectorRule>,
    pub title_selector: String,
}

/// One entry of the ordered price extraction chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRule {
    pub css: String,
    /// Read this attribute instead of the element text.
    #[serde(default)]
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub smtp: SmtpConfig,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Environment variable holding the account address.
    pub username_env: String,
    /// Environment variable holding the application password.
    pub password_env: String,
    pub from_name: Option<String>,
    pub to_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
    pub filter: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_file: PathBuf::from("products.json"),
            seed_example: true,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            price_selectors: vec![
                SelectorRule::css("#priceblock_ourprice"),
                SelectorRule::css("#priceblock_dealprice"),
                SelectorRule::css(".a-price-whole"),
                SelectorRule::css(".a-price .a-offscreen"),
            ],
            title_selector: "span#productTitle".to_string(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            smtp: SmtpConfig::default(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { check_interval_secs: 300 }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            username_env: "EMAIL_USER".to_string(),
            password_env: "EMAIL_PASS".to_string(),
            from_name: None,
            to_address: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("price_tracker.log"),
            filter: "info".to_string(),
        }
    }
}

impl SelectorRule {
    pub fn css(css: &str) -> Self {
        Self {
            css: css.to_string(),
            attribute: None,
        }
    }
}

/// `PRICEWATCH_SCHEDULER__CHECK_INTERVAL_SECS=60` sets `scheduler.check_interval_secs`:
/// one underscore after the prefix, two between nested keys.
fn environment() -> Environment {
    Environment::with_prefix("PRICEWATCH")
        .prefix_separator("_")
        .separator("__")
}

impl AppConfig {
    /// Layer `default`, `local`, then `PRICEWATCH_*` environment variables.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(config_dir, environment())
    }

    fn load_with_env(config_dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(config_dir.join("default")).required(false))
            // Add local config (ignored by git)
            .add_source(File::from(config_dir.join("local")).required(false))
            .add_source(env)
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.products_file.as_os_str().is_empty() {
            return Err(ConfigError::Message("Catalog products_file must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scraper.price_selectors.is_empty() {
            return Err(ConfigError::Message("Scraper price_selectors must list at least one selector".into()));
        }

        if self.scraper.price_selectors.iter().any(|rule| rule.css.trim().is_empty()) {
            return Err(ConfigError::Message("Scraper price_selectors must not contain empty selectors".into()));
        }

        if self.scraper.title_selector.trim().is_empty() {
            return Err(ConfigError::Message("Scraper title_selector must not be empty".into()));
        }

        if self.scheduler.check_interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler check_interval_secs must be greater than 0".into()));
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.notifications.smtp.username_env.is_empty() || self.notifications.smtp.password_env.is_empty() {
            return Err(ConfigError::Message("SMTP credential variable names must be set".into()));
        }

        if self.logging.log_file.file_name().is_none() {
            return Err(ConfigError::Message("Logging log_file must name a file".into()));
        }

        Ok(())
    }
}
