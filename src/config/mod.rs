//! Configuration types for the shipping-line relay.
//!
//! This module provides the types used to configure the relay at startup.
//! Configuration is loaded once (usually from the environment via
//! [`RelayConfig::from_env`]) into an immutable [`RelayConfig`] value that is
//! passed explicitly into the components that need it. There is no ambient
//! process-global configuration.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`RelayConfig`]: The configuration struct holding all relay settings
//! - [`RelayConfigBuilder`]: A builder for constructing [`RelayConfig`] values
//! - [`RegionEntry`]: One candidate region as written in configuration
//! - [`ShopDomain`]: A validated storefront domain
//! - [`AccessToken`] / [`SharedSecret`]: Non-empty secrets with masked debug output
//! - [`ApiVersion`]: The Admin API version to target
//!
//! # Example
//!
//! ```rust
//! use shipline_relay::{ApiVersion, RegionEntry, RelayConfig};
//!
//! let config = RelayConfig::builder()
//!     .region(RegionEntry::new("de", Some("store-de.myshopify.com"), Some("shpat_abc"), None))
//!     .api_version(ApiVersion::latest())
//!     .build();
//!
//! assert_eq!(config.api_version(), &ApiVersion::latest());
//! ```

mod newtypes;
mod version;

pub use newtypes::{AccessToken, HostUrl, SharedSecret, ShopDomain};
pub use version::ApiVersion;

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Default per-call timeout for outbound Admin API requests.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default listen port for the HTTP endpoint.
pub const DEFAULT_PORT: u16 = 8787;

/// One candidate region as written in configuration.
///
/// Entries are intentionally loose: every field except `code` is optional so
/// that partially-provisioned regions can sit in configuration without
/// breaking startup. The region registry decides what to do with incomplete
/// entries (missing domain: dropped; missing token: kept, but mutating calls
/// fail with a gateway error).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    /// Short region identifier (e.g., "de", "us").
    pub code: String,
    /// Storefront domain, e.g. `store-de.myshopify.com`.
    pub shop_domain: Option<String>,
    /// Admin API access token for this storefront.
    pub admin_token: Option<String>,
    /// Optional shared secret expected in the `X-Flow-Secret` header.
    pub flow_secret: Option<String>,
}

impl RegionEntry {
    /// Convenience constructor, mostly for tests and examples.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        shop_domain: Option<&str>,
        admin_token: Option<&str>,
        flow_secret: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            shop_domain: shop_domain.map(str::to_string),
            admin_token: admin_token.map(str::to_string),
            flow_secret: flow_secret.map(str::to_string),
        }
    }
}

/// Configuration for the shipping-line relay.
///
/// # Thread Safety
///
/// `RelayConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    regions: Vec<RegionEntry>,
    api_version: ApiVersion,
    fetch_timeout: Duration,
    debug_details: bool,
    port: u16,
    api_host: Option<HostUrl>,
}

impl RelayConfig {
    /// Creates a new builder for constructing a `RelayConfig`.
    #[must_use]
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    ///
    /// Recognized variables:
    ///
    /// - `RELAY_REGIONS`: JSON array of [`RegionEntry`] objects
    ///   (`[{"code":"de","shopDomain":"...","adminToken":"...","flowSecret":"..."}]`)
    /// - `SHOPIFY_API_VERSION`: Admin API version (`YYYY-MM` or `unstable`)
    /// - `FETCH_TIMEOUT_MS`: per-call timeout in milliseconds
    /// - `DEBUG_DETAILS`: `1`/`true` to include error details in responses
    /// - `PORT`: listen port
    /// - `RELAY_API_HOST`: base URL override for Admin API traffic (proxy)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvValue`] when a variable is present
    /// but unparseable, or the corresponding validation error for malformed
    /// versions and host URLs. Absent variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Ok(raw) = std::env::var("RELAY_REGIONS") {
            let regions: Vec<RegionEntry> =
                serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidEnvValue {
                    var: "RELAY_REGIONS",
                    reason: e.to_string(),
                })?;
            builder = builder.regions(regions);
        }

        if let Ok(raw) = std::env::var("SHOPIFY_API_VERSION") {
            builder = builder.api_version(raw.parse()?);
        }

        if let Ok(raw) = std::env::var("FETCH_TIMEOUT_MS") {
            let ms: u64 = raw.parse().map_err(|_| ConfigError::InvalidEnvValue {
                var: "FETCH_TIMEOUT_MS",
                reason: format!("expected milliseconds, got '{raw}'"),
            })?;
            builder = builder.fetch_timeout(Duration::from_millis(ms));
        }

        if let Ok(raw) = std::env::var("DEBUG_DETAILS") {
            builder = builder.debug_details(matches!(raw.as_str(), "1" | "true" | "TRUE"));
        }

        if let Ok(raw) = std::env::var("PORT") {
            let port: u16 = raw.parse().map_err(|_| ConfigError::InvalidEnvValue {
                var: "PORT",
                reason: format!("expected a port number, got '{raw}'"),
            })?;
            builder = builder.port(port);
        }

        if let Ok(raw) = std::env::var("RELAY_API_HOST") {
            builder = builder.api_host(HostUrl::new(raw)?);
        }

        Ok(builder.build())
    }

    /// Returns the configured region entries.
    #[must_use]
    pub fn regions(&self) -> &[RegionEntry] {
        &self.regions
    }

    /// Returns the Admin API version to target.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the per-call timeout for outbound Admin API requests.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns whether error responses may carry debug details.
    #[must_use]
    pub const fn debug_details(&self) -> bool {
        self.debug_details
    }

    /// Returns the listen port for the HTTP endpoint.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the Admin API host override, if configured.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }
}

/// Builder for [`RelayConfig`].
///
/// Every field has a sensible default, so `build()` is infallible; validation
/// of individual values happens in the newtype constructors before they reach
/// the builder.
#[derive(Clone, Debug, Default)]
pub struct RelayConfigBuilder {
    regions: Vec<RegionEntry>,
    api_version: Option<ApiVersion>,
    fetch_timeout: Option<Duration>,
    debug_details: bool,
    port: Option<u16>,
    api_host: Option<HostUrl>,
}

impl RelayConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one region entry.
    #[must_use]
    pub fn region(mut self, entry: RegionEntry) -> Self {
        self.regions.push(entry);
        self
    }

    /// Replaces the region entries wholesale.
    #[must_use]
    pub fn regions(mut self, entries: Vec<RegionEntry>) -> Self {
        self.regions = entries;
        self
    }

    /// Sets the Admin API version (default: [`ApiVersion::latest`]).
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the per-call timeout (default: 10 seconds).
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Enables or disables debug details in error responses (default: off).
    #[must_use]
    pub const fn debug_details(mut self, enabled: bool) -> Self {
        self.debug_details = enabled;
        self
    }

    /// Sets the listen port (default: 8787).
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the Admin API host override.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RelayConfig {
        RelayConfig {
            regions: self.regions,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            fetch_timeout: self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            debug_details: self.debug_details,
            port: self.port.unwrap_or(DEFAULT_PORT),
            api_host: self.api_host,
        }
    }
}
