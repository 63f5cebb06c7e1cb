// # dnsync - one-shot DNS sync
//
// This binary is a THIN integration layer:
// - Reads configuration from environment variables (and `.env` if present)
// - Builds the IP resolver and DNS provider
// - Runs the sync engine once and maps the result to an exit code
//
// All reconciliation logic lives in dnsync-core.
//
// ## Configuration
//
// ### Cloudflare
// - `CLOUDFLARE_EMAIL`: Account email (global API key auth)
// - `CLOUDFLARE_API_KEY`: Global API key
// - `CLOUDFLARE_API_TOKEN`: Scoped API token (takes precedence over email/key)
// - `CLOUDFLARE_DOMAINS`: Comma-separated list of domains to keep in sync
//
// ### dnsync
// - `DNSYNC_IP_LOOKUP_URL`: IP-echo URL (default: https://checkip.amazonaws.com)
// - `DNSYNC_MODE`: `live` (default) or `dry-run`
// - `DNSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_EMAIL=ops@example.com
// export CLOUDFLARE_API_KEY=your_key
// export CLOUDFLARE_DOMAINS=example.com,example.org
//
// dnsync
// ```

use anyhow::Result;
use dnsync_core::{Credentials, IpResolverConfig, ProviderConfig, SyncConfig, SyncEngine};
use dnsync_ip_http::HttpIpResolver;
use dnsync_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every domain updated or already up to date
/// - 1: Configuration or startup error
/// - 2: Runtime error (public IP lookup failed, runtime could not start)
/// - 3: Run completed but at least one domain failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
    DomainFailures = 3,
}

impl From<DnsyncExitCode> for ExitCode {
    fn from(code: DnsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Run mode selected by `DNSYNC_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    DryRun,
}

/// Application configuration
struct Config {
    email: Option<String>,
    api_key: Option<String>,
    api_token: Option<String>,
    domains: Vec<String>,
    ip_lookup_url: String,
    mode: String,
    log_level: String,
}

// Secrets stay out of Debug output
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("api_token", &self.api_token.as_ref().map(|_| "<REDACTED>"))
            .field("domains", &self.domains)
            .field("ip_lookup_url", &self.ip_lookup_url)
            .field("mode", &self.mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Variables from a `.env` file in the working directory are loaded
    /// first; variables already set in the environment win.
    fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    ///
    /// Empty values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            email: var("CLOUDFLARE_EMAIL"),
            api_key: var("CLOUDFLARE_API_KEY"),
            api_token: var("CLOUDFLARE_API_TOKEN"),
            domains: var("CLOUDFLARE_DOMAINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ip_lookup_url: var("DNSYNC_IP_LOOKUP_URL")
                .unwrap_or_else(|| dnsync_core::config::DEFAULT_IP_LOOKUP_URL.to_string()),
            mode: var("DNSYNC_MODE").unwrap_or_else(|| "live".to_string()),
            log_level: var("DNSYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Validate the configuration
    ///
    /// Checks credential presence, the domain list, the lookup URL scheme,
    /// the run mode and the log level.
    fn validate(&self) -> Result<()> {
        if self.api_token.is_none() {
            if self.email.is_none() {
                anyhow::bail!(
                    "CLOUDFLARE_EMAIL is required (or set CLOUDFLARE_API_TOKEN). \
                    Set it via: export CLOUDFLARE_EMAIL=you@example.com"
                );
            }
            if self.api_key.is_none() {
                anyhow::bail!(
                    "CLOUDFLARE_API_KEY is required (or set CLOUDFLARE_API_TOKEN). \
                    Set it via: export CLOUDFLARE_API_KEY=your_key"
                );
            }
        }

        if self.domains.is_empty() {
            anyhow::bail!(
                "CLOUDFLARE_DOMAINS must contain at least one domain. \
                Set it via: export CLOUDFLARE_DOMAINS=example.com,example.org"
            );
        }

        for domain in &self.domains {
            validate_domain_name(domain)?;
        }

        if !self.ip_lookup_url.starts_with("https://") && !self.ip_lookup_url.starts_with("http://")
        {
            anyhow::bail!(
                "DNSYNC_IP_LOOKUP_URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_lookup_url
            );
        }

        self.mode()?;
        self.log_level()?;

        Ok(())
    }

    fn mode(&self) -> Result<Mode> {
        match self.mode.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(Mode::DryRun),
            _ => anyhow::bail!(
                "DNSYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn credentials(&self) -> Credentials {
        match &self.api_token {
            Some(token) => Credentials::ApiToken {
                token: token.clone(),
            },
            None => Credentials::ApiKey {
                email: self.email.clone().unwrap_or_default(),
                key: self.api_key.clone().unwrap_or_default(),
            },
        }
    }

    /// Build the core configuration
    fn to_sync_config(&self) -> Result<SyncConfig> {
        let config = SyncConfig {
            ip_resolver: IpResolverConfig::Http {
                url: self.ip_lookup_url.clone(),
            },
            provider: ProviderConfig::Cloudflare {
                credentials: self.credentials(),
                dry_run: self.mode()? == Mode::DryRun,
            },
            domains: self.domains.clone(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters, and
/// hyphen placement. A single trailing dot is accepted.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.strip_suffix('.').unwrap_or(domain).split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DnsyncExitCode::ConfigError.into();
    }

    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsyncExitCode::ConfigError.into();
    }

    info!("Starting dnsync");
    info!("Configuration loaded: {} domain(s)", config.domains.len());

    let sync_config = match config.to_sync_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DnsyncExitCode::ConfigError.into();
        }
    };

    let engine = match build_engine(sync_config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return DnsyncExitCode::ConfigError.into();
        }
    };

    // Domains are processed one after another
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(engine)).into()
}

/// Construct the resolver, provider and engine
fn build_engine(config: SyncConfig) -> Result<SyncEngine> {
    let resolver = HttpIpResolver::from_config(&config.ip_resolver)?;
    let provider = CloudflareProvider::from_config(&config.provider)?;

    if config.provider.dry_run() {
        warn!("DRY-RUN mode: DNS records will not be modified");
    }

    info!(
        "Provider: {}, IP lookup: {}",
        config.provider.type_name(),
        resolver.url()
    );

    Ok(SyncEngine::new(
        Box::new(resolver),
        Box::new(provider),
        config,
    )?)
}

/// Run the engine once and map the result to an exit code
async fn run(engine: SyncEngine) -> DnsyncExitCode {
    match engine.run().await {
        Ok(report) if report.has_failures() => {
            warn!(
                "{} of {} domain(s) failed",
                report.failed(),
                report.outcomes.len()
            );
            DnsyncExitCode::DomainFailures
        }
        Ok(_) => DnsyncExitCode::Success,
        Err(e) => {
            error!("Run aborted: {}", e);
            DnsyncExitCode::RuntimeError
        }
    }
}
