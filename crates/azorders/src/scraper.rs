use std::future::Future;

use reqwest::{Client, StatusCode};

use crate::config::CrawlConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP client setup failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Result of one GET against a year's index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { document: String, url: String },
    NotFound { status: u16, url: String },
    TransportError { message: String, url: String },
}

/// One attempt per call, no retries.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new(config: &CrawlConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    async fn get_html(&self, url: &str) -> FetchOutcome {
        let response = match self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))
        {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::TransportError {
                    message: e.to_string(),
                    url: url.to_string(),
                };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchOutcome::NotFound {
                status: status.as_u16(),
                url: url.to_string(),
            };
        }

        match response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))
        {
            Ok(document) => FetchOutcome::Success {
                document,
                url: url.to_string(),
            },
            Err(e) => FetchOutcome::TransportError {
                message: e.to_string(),
                url: url.to_string(),
            },
        }
    }
}

impl Fetcher for WebScraper {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send {
        self.get_html(url)
    }
}
