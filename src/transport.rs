//! Fetching index pages over HTTP.
//!
//! The controller only needs "give me the text at this URL", so that is the
//! whole [`Transport`] trait. [`HttpTransport`] is the production
//! implementation on a blocking `reqwest` client; tests swap in an in-memory
//! transport.

use crate::config::TransportConfig;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

/// Anything that stops a listing from arriving as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request to {url} failed: {reason}")]
    Connection { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

pub trait Transport {
    /// Fetch the body at `url` as text. Non-2xx responses are errors.
    fn fetch_text(&self, url: &str) -> Result<String, NetworkError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        (**self).fetch_text(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        (**self).fetch_text(url)
    }
}

/// Blocking HTTP transport. Redirects are followed by the client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NetworkError::Connection {
                url: String::new(),
                reason: format!("could not build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| NetworkError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| NetworkError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("GET {url} → {} bytes", body.len());
        Ok(body)
    }
}
