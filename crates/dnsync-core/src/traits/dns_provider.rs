// # DNS Provider Trait
//
// Defines the interface for listing and updating DNS records via a provider API.
//
// ## Implementations
//
// - Cloudflare: `dnsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::traits::{DnsProvider, RecordType};
//
// async fn first_a_record(provider: &dyn DnsProvider) -> dnsync_core::Result<()> {
//     let zones = provider.list_zones("example.com").await?;
//     let records = provider.list_records(&zones[0].id, RecordType::A).await?;
//     println!("{:?}", records.first());
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The administrative grouping of records that owns a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific zone identifier
    pub id: String,
    /// Zone name (e.g., "example.com")
    pub name: String,
}

/// One DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Identifier of the owning zone
    pub zone_id: String,
    /// Record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Current content (the IP address string for A/AAAA records)
    pub content: String,
    /// Time-to-live, if the provider reports one
    pub ttl: Option<u32>,
    /// Provider-side proxying flag, if the provider has one
    pub proxied: Option<bool>,
}

impl DnsRecord {
    /// Copy of this record with only its content replaced
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Trait for DNS provider implementations
///
/// A provider is a thin, stateless client of a remote record-management API.
/// Each method performs one API call and reports its result; deciding whether
/// an update is needed belongs to [`SyncEngine`](crate::SyncEngine).
///
/// Implementations must not retry, cache, or spawn tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones whose name exactly matches `name`
    ///
    /// Returns the first page of results in provider order. An empty list
    /// means no zone matched.
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List records of `record_type` within a zone
    ///
    /// Returns the first page of results in provider order.
    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace a record's content
    ///
    /// `record` carries the record's id, zone id, name and type unchanged, with
    /// `content` already set to the new value. Returns the record as stored by
    /// the provider.
    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether `update_record` only logs instead of writing
    fn is_dry_run(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DnsRecord {
        DnsRecord {
            id: "rec-1".to_string(),
            zone_id: "zone-1".to_string(),
            name: "example.com".to_string(),
            record_type: RecordType::A,
            content: "203.0.113.1".to_string(),
            ttl: Some(300),
            proxied: Some(false),
        }
    }

    #[test]
    fn with_content_keeps_identity() {
        let original = record();
        let updated = original.with_content("203.0.113.7");

        assert_eq!(updated.content, "203.0.113.7");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.zone_id, original.zone_id);
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.record_type, original.record_type);
        assert_eq!(updated.ttl, original.ttl);
        assert_eq!(updated.proxied, original.proxied);
    }

    #[test]
    fn record_type_wire_names() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(
            serde_json::to_string(&RecordType::Aaaa).unwrap(),
            "\"AAAA\""
        );
        assert_eq!(
            serde_json::from_str::<RecordType>("\"A\"").unwrap(),
            RecordType::A
        );
    }
}
