//! Configuration types for dnsync
//!
//! This module defines all configuration structures used throughout the crate.
//! The binary builds a [`SyncConfig`] from the environment and hands it, along
//! with constructed resolver/provider handles, to [`SyncEngine`](crate::SyncEngine).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default IP-echo endpoint
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://checkip.amazonaws.com";

/// Main dnsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Public IP resolver configuration
    #[serde(default)]
    pub ip_resolver: IpResolverConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Domains whose first A record is kept in sync
    pub domains: Vec<String>,
}

impl SyncConfig {
    /// Create a configuration for the given provider and domains
    pub fn new(provider: ProviderConfig, domains: Vec<String>) -> Self {
        Self {
            ip_resolver: IpResolverConfig::default(),
            provider,
            domains,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domains.is_empty() {
            return Err(crate::Error::config("No domains configured"));
        }

        if let Some(blank) = self
            .domains
            .iter()
            .find(|d| d.trim().trim_end_matches('.').is_empty())
        {
            return Err(crate::Error::config(format!(
                "Domain names cannot be blank (got {:?})",
                blank
            )));
        }

        self.provider.validate()?;
        self.ip_resolver.validate()?;

        Ok(())
    }
}

/// Public IP resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpResolverConfig {
    /// Plain-text IP-echo service reached over HTTP
    Http {
        /// URL to fetch the address from
        url: String,
    },
}

impl IpResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpResolverConfig::Http { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("IP lookup URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for IpResolverConfig {
    fn default() -> Self {
        IpResolverConfig::Http {
            url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

/// Provider credentials
///
/// The Debug implementation never prints secrets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    /// Account email plus global API key
    ApiKey {
        /// Account email
        email: String,
        /// Global API key
        key: String,
    },

    /// Scoped API token
    ApiToken {
        /// Bearer token
        token: String,
    },
}

impl Credentials {
    /// Validate that no credential field is empty
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            Credentials::ApiKey { email, key } => {
                if email.is_empty() {
                    return Err(crate::Error::config("Provider account email cannot be empty"));
                }
                if !email.contains('@') {
                    return Err(crate::Error::config(format!(
                        "Provider account email looks invalid: {}",
                        email
                    )));
                }
                if key.is_empty() {
                    return Err(crate::Error::config("Provider API key cannot be empty"));
                }
                Ok(())
            }
            Credentials::ApiToken { token } => {
                if token.is_empty() {
                    return Err(crate::Error::config("Provider API token cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
            Credentials::ApiToken { .. } => f
                .debug_struct("ApiToken")
                .field("token", &"<REDACTED>")
                .finish(),
        }
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Account credentials
        credentials: Credentials,
        /// Perform lookups but only log intended updates
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { credentials, .. } => credentials.validate(),
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }

    /// Whether updates should only be logged
    pub fn dry_run(&self) -> bool {
        match self {
            ProviderConfig::Cloudflare { dry_run, .. } => *dry_run,
        }
    }
}
