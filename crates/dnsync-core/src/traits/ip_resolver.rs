// # IP Resolver Trait
//
// Defines the interface for discovering the caller's current public IP address.
//
// ## Implementations
//
// - HTTP IP-echo service: `dnsync-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::IpResolver;
//
// async fn show(resolver: &dyn IpResolver) -> dnsync_core::Result<()> {
//     let address = resolver.resolve().await?;
//     println!("public address: {}", address);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The caller's public address as reported by the lookup service
///
/// Kept in string form exactly as the service returned it (whitespace
/// stripped). No IPv4/IPv6 parsing is applied; the provider is the one that
/// validates record content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicAddress(String);

impl PublicAddress {
    /// Build an address from a raw lookup body
    ///
    /// Leading and trailing whitespace is stripped. Returns `None` when
    /// nothing is left.
    pub fn from_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for public IP resolvers
///
/// One call performs one lookup. Implementations report every failure
/// (transport error, unexpected status, empty body) as
/// [`Error::IpLookup`](crate::Error::IpLookup) and never retry.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Look up the current public address
    async fn resolve(&self) -> Result<PublicAddress, crate::Error>;

    /// Short name of the lookup source (for logging)
    fn source_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_body_strips_whitespace() {
        let address = PublicAddress::from_body("  203.0.113.7\n").unwrap();
        assert_eq!(address.as_str(), "203.0.113.7");
    }

    #[test]
    fn from_body_does_not_validate_format() {
        let address = PublicAddress::from_body("not-an-ip").unwrap();
        assert_eq!(address.to_string(), "not-an-ip");
    }

    #[test]
    fn from_body_rejects_blank() {
        assert!(PublicAddress::from_body("").is_none());
        assert!(PublicAddress::from_body(" \r\n\t").is_none());
    }
}
