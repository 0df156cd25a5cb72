use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ScraperConfig;
use crate::extractor::PriceExtractor;
use crate::plugins::traits::{PageObservation, PriceSource};
use crate::utils::error::{AppError, Result};

/// Fetches product pages over HTTP and hands the body to the extractor.
///
/// One `reqwest::Client` is built up front and reused for every request.
pub struct PageFetcher {
    client: Client,
    extractor: PriceExtractor,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig, extractor: PriceExtractor) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client, extractor })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Self::new(config, PriceExtractor::from_config(config)?)
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceSource for PageFetcher {
    async fn fetch(&self, url: &str) -> PageObservation {
        match self.fetch_body(url).await {
            Ok(body) => {
                debug!("Fetched {} bytes from {}", body.len(), url);
                self.extractor.extract(&body)
            }
            Err(e) => {
                error!("Error fetching price for {}: {}", url, e);
                PageObservation::failed()
            }
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Validation(format!("invalid header value '{}': {}", value, e)))
}
