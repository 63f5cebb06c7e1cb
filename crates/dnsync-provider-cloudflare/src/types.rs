//! Cloudflare API v4 wire types

use dnsync_core::traits::{DnsRecord, RecordType, Zone};
use serde::{Deserialize, Serialize};

/// Common response envelope
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<CloudflareApiError>,
}

impl<T> CloudflareResponse<T> {
    /// First reported error, if any
    pub fn first_error(&self) -> Option<&CloudflareApiError> {
        self.errors.first()
    }
}

/// Error entry of a response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareApiError {
    pub code: i64,
    pub message: String,
}

impl CloudflareApiError {
    /// Whether Cloudflare reports the credentials themselves as the problem
    ///
    /// 6003 invalid request headers, 6103 invalid X-Auth-Key format,
    /// 6111 invalid Authorization header, 9103 unknown X-Auth-Key or
    /// X-Auth-Email, 9109 unauthorized, 10000 authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.code, 6003 | 6103 | 6111 | 9103 | 9109 | 10000)
    }
}

/// Zone as listed by `GET /zones`
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

impl From<CloudflareZone> for Zone {
    fn from(zone: CloudflareZone) -> Self {
        Zone {
            id: zone.id,
            name: zone.name,
        }
    }
}

/// DNS record as returned by the records endpoints
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    /// Omitted by newer API responses
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

impl CloudflareDnsRecord {
    /// Convert into the core record, filling the zone id from the request
    /// when the response leaves it out
    ///
    /// Returns `None` for record types dnsync does not manage.
    pub fn into_record(self, zone_id: &str) -> Option<DnsRecord> {
        let record_type = match self.record_type.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            _ => return None,
        };

        Some(DnsRecord {
            id: self.id,
            zone_id: self.zone_id.unwrap_or_else(|| zone_id.to_string()),
            name: self.name,
            record_type,
            content: self.content,
            ttl: self.ttl,
            proxied: self.proxied,
        })
    }
}

/// Body of `PUT /zones/:zone_id/dns_records/:record_id`
///
/// PUT replaces the whole record, so ttl and proxied are sent back as they
/// were listed to keep them unchanged.
#[derive(Debug, Serialize)]
pub struct UpdateRecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl<'a> From<&'a DnsRecord> for UpdateRecordBody<'a> {
    fn from(record: &'a DnsRecord) -> Self {
        Self {
            record_type: record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}
