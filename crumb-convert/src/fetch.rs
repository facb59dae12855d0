#![doc = "HTTP image fetcher: the network side of image resolution, implemented over reqwest."]
//
//! # HTTP Image Fetcher
//!
//! The core crate only knows the [`ImageFetcher`] trait. This module provides
//! the implementation the binary uses: one shared [`reqwest::Client`] with the
//! configured timeout and user agent.
//!
//! - A non-success HTTP status becomes [`FetchError::Status`].
//! - Connection, TLS and body errors become [`FetchError::Transport`].
//!
//! Both are recovered per image by the core resolver.

use std::time::Duration;

use async_trait::async_trait;
use crumb_convert_core::config::FetchConfig;
use crumb_convert_core::contract::ImageFetcher;
use crumb_convert_core::error::FetchError;

pub const DEFAULT_USER_AGENT: &str = concat!("crumb-convert/", env!("CARGO_PKG_VERSION"));

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent.as_str())
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to build HTTP client");
                anyhow::anyhow!("Failed to build HTTP client: {e}")
            })?;
        tracing::info!(
            user_agent = %user_agent,
            timeout_secs = config.timeout_secs,
            "Initialized HttpImageFetcher"
        );
        Ok(Self { client })
    }
}

fn transport(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url, "Fetching image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport(url, e))?;
        Ok(bytes.to_vec())
    }
}
