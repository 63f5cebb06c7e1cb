// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider` for dnsync.
//
// - One HTTP request per trait call
// - Errors are returned to the engine; no retry, no backoff, no caching
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Dry-run mode: listings are real, updates are only logged
//
// ## Authentication
//
// Either the account email plus global API key (`X-Auth-Email` / `X-Auth-Key`)
// or a scoped API token (`Authorization: Bearer`). Credentials never appear
// in logs, errors, or Debug output.
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

mod types;

use async_trait::async_trait;
use dnsync_core::config::{Credentials, ProviderConfig};
use dnsync_core::traits::{DnsProvider, DnsRecord, RecordType, Zone};
use dnsync_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone, UpdateRecordBody};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "cloudflare";

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Account credentials
    /// ⚠️ NEVER log these
    credentials: Credentials,

    /// API base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: global API key with account email, or a scoped token
    ///   with Zone:Read and DNS:Edit permissions
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    ///
    /// Fails with [`Error::Config`] if any credential field is empty.
    pub fn new(credentials: Credentials, dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(credentials, dry_run, client)
    }

    /// Create a provider around a preconfigured HTTP client
    pub fn with_client(
        credentials: Credentials,
        dry_run: bool,
        client: reqwest::Client,
    ) -> Result<Self> {
        credentials.validate()?;

        Ok(Self {
            credentials,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a new Cloudflare provider (production/live mode)
    pub fn new_live(credentials: Credentials) -> Result<Self> {
        Self::new(credentials, false)
    }

    /// Create a new Cloudflare provider (dry-run mode)
    ///
    /// The provider will perform all GET requests but skip PUT updates,
    /// logging what would have been changed.
    pub fn new_dry_run(credentials: Credentials) -> Result<Self> {
        Self::new(credentials, true)
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                credentials,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }
                Self::new(credentials.clone(), *dry_run)
            }
        }
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Attach authentication headers to a request
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::ApiKey { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
            Credentials::ApiToken { token } => request.bearer_auth(token),
        }
    }

    /// Send a request and unwrap the response envelope
    ///
    /// `action` names the call for error messages (e.g. "Zone lookup").
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body, action));
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        if !envelope.success {
            return Err(match envelope.first_error() {
                Some(err) if err.is_auth_error() => Error::auth(format!(
                    "Invalid API credentials or insufficient permissions ({}: {})",
                    err.code, err.message
                )),
                Some(err) => Error::provider(
                    PROVIDER_NAME,
                    format!("{} failed ({}: {})", action, err.code, err.message),
                ),
                None => Error::provider(PROVIDER_NAME, format!("{} failed: Unknown error", action)),
            });
        }

        envelope.result.ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                "Invalid response format: missing result field",
            )
        })
    }
}

/// Map a non-2xx HTTP status to an error
///
/// Cloudflare usually explains the failure in the envelope's `errors`; its
/// first message is kept when the body parses.
fn status_error(status: reqwest::StatusCode, body: &str, action: &str) -> Error {
    let detail = serde_json::from_str::<CloudflareResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|r| r.first_error().map(|e| format!("{}: {}", e.code, e.message)))
        .unwrap_or_else(|| body.trim().to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API credentials or insufficient permissions. Status: {} - {}",
            status, detail
        )),
        404 => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: resource not found. Status: {} - {}", action, status, detail),
        ),
        409 => Error::provider(
            PROVIDER_NAME,
            format!(
                "Conflict: Record is being updated by another process. Status: {} - {}",
                status, detail
            ),
        ),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Cloudflare server error (transient): {} - {}", status, detail),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", action, status, detail),
        ),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Looking up zone for domain: {}", name);

        let url = format!("{}/zones", self.base_url);
        let zones: Vec<CloudflareZone> = self
            .send(self.client.get(&url).query(&[("name", name)]), "Zone lookup")
            .await?;

        Ok(zones.into_iter().map(Zone::from).collect())
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A
    /// ```
    async fn list_records(&self, zone_id: &str, record_type: RecordType) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing {} records in zone {}", record_type, zone_id);

        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let records: Vec<CloudflareDnsRecord> = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("type", record_type.as_str())]),
                "Record lookup",
            )
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|r| r.into_record(zone_id))
            .filter(|r| r.record_type == record_type)
            .collect())
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "example.com", "content": "1.2.3.4", "ttl": 1, "proxied": false }
    /// ```
    ///
    /// Skipped in dry-run mode.
    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, record.zone_id, record.id
        );
        let payload = UpdateRecordBody::from(record);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(record.clone());
        }

        let updated: CloudflareDnsRecord = self
            .send(self.client.put(&url).json(&payload), "Record update")
            .await?;

        updated.into_record(&record.zone_id).ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                "Invalid response format: unexpected record type",
            )
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
