// # HTTP IP Resolver
//
// This crate provides the HTTP-based public IP resolver for dnsync.
//
// ## Architecture
//
// Issues a single GET to a plain-text IP-echo service (default:
// https://checkip.amazonaws.com) and returns the body with surrounding
// whitespace stripped. No retries; every failure is an `Error::IpLookup`.

use dnsync_core::config::IpResolverConfig;
use dnsync_core::traits::{IpResolver, PublicAddress};
use dnsync_core::{Error, Result};

use std::time::Duration;

/// Default timeout for the lookup request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP resolver
pub struct HttpIpResolver {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://checkip.amazonaws.com")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    ///
    /// Fails with [`Error::Config`] if the HTTP client cannot be built.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(url, client))
    }

    /// Create with a preconfigured HTTP client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &IpResolverConfig) -> Result<Self> {
        config.validate()?;

        match config {
            IpResolverConfig::Http { url } => Self::new(url.clone()),
        }
    }

    /// URL this resolver queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        tracing::debug!("Looking up public IP via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_lookup(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::ip_lookup(format!(
                "Unexpected HTTP status from {}: {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_lookup(format!("Failed to read response: {}", e)))?;

        PublicAddress::from_body(&body)
            .ok_or_else(|| Error::ip_lookup(format!("Empty response body from {}", self.url)))
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
