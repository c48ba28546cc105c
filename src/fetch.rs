//! Remote image retrieval for big-picture notifications

use image::DynamicImage;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Why an image could not be fetched. Every variant degrades the
/// presentation to big-text; none is surfaced to the end user.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("undecodable image body: {0}")]
    Decode(#[from] image::ImageError),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Retrieves the image referenced by a payload's `image` field.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, FetchError>;
}

/// Fetcher backed by a single unauthenticated HTTP GET.
pub struct HttpImageFetcher {
    http: Client,
    timeout: Option<Duration>,
}

impl HttpImageFetcher {
    /// `timeout` bounds the whole GET-and-decode; `None` leaves it
    /// unbounded, matching the behavior this crate replaced.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<DynamicImage, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(image::load_from_memory(&body)?)
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch_and_decode(url))
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => self.fetch_and_decode(url).await,
        }
    }
}
