//! Error types for dnsync
//!
//! Every boundary call (IP lookup, zone lookup, record listing, record update)
//! returns one of these kinds. The original message is always kept as data.

use thiserror::Error;

/// Result type alias for dnsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsync
#[derive(Error, Debug)]
pub enum Error {
    /// The public IP lookup could not complete
    #[error("Public IP lookup failed: {0}")]
    IpLookup(String),

    /// No zone matches the configured domain
    #[error("No zone found for domain: {0}")]
    ZoneNotFound(String),

    /// The zone exists but holds no record of the requested type
    #[error("No DNS record found: {0}")]
    RecordNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other provider API failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a public IP lookup error
    pub fn ip_lookup(msg: impl Into<String>) -> Self {
        Self::IpLookup(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound(domain.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came back from the DNS provider's API
    ///
    /// Authentication and rate limit failures are provider failures too; they
    /// only get their own variants so callers can report them distinctly.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Authentication(_) | Self::RateLimited(_) | Self::Json(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
