//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear
//! error messages, and secret-bearing types mask their value in debug output.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated storefront domain.
///
/// Region lookup is keyed by the exact domain string, so this newtype accepts
/// only the fully-qualified `shop-name.myshopify.com` form and performs no
/// normalization: comparison downstream is case-sensitive byte equality.
///
/// # Example
///
/// ```rust
/// use shipline_relay::ShopDomain;
///
/// let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// // Short form and foreign domains are rejected
/// assert!(ShopDomain::new("my-store").is_err());
/// assert!(ShopDomain::new("my-store.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] unless the value matches
    /// `^[a-z0-9-]+\.myshopify\.com$` exactly.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into();

        let Some(shop_name) = domain.strip_suffix(Self::SUFFIX) else {
            return Err(ConfigError::InvalidShopDomain { domain });
        };

        if !Self::is_valid_shop_name(shop_name) {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain: domain,
        })
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    /// Reports whether `raw` is a well-formed storefront domain.
    #[must_use]
    pub fn is_valid(raw: &str) -> bool {
        raw.strip_suffix(Self::SUFFIX)
            .is_some_and(Self::is_valid_shop_name)
    }

    fn is_valid_shop_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated Admin API access token.
///
/// This newtype ensures the token is non-empty and masks its value in debug
/// output to prevent accidental exposure in logs.
///
/// # Example
///
/// ```rust
/// use shipline_relay::AccessToken;
///
/// let token = AccessToken::new("shpat_example").unwrap();
/// assert_eq!(format!("{:?}", token), "AccessToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new validated access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyAccessToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// A validated shared secret for the `X-Flow-Secret` header check.
///
/// Like [`AccessToken`], the debug representation masks the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Creates a new validated shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySharedSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySharedSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for SharedSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(*****)")
    }
}

/// A validated host URL used to redirect Admin API traffic.
///
/// When configured, the gateway sends its requests to this base URL instead
/// of `https://{shop-domain}`. This is the proxy scenario, and it is also how
/// integration tests point the gateway at a local mock server.
///
/// # Example
///
/// ```rust
/// use shipline_relay::HostUrl;
///
/// let url = HostUrl::new("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(url.as_ref(), "http://127.0.0.1:8080");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl(String);

impl HostUrl {
    /// Creates a new validated host URL.
    ///
    /// Trailing slashes are stripped so the URL can be joined with an
    /// absolute API path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the URL has no scheme or
    /// no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        let Some(scheme_end) = url.find("://") else {
            return Err(ConfigError::InvalidHostUrl { url });
        };

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidHostUrl { url });
        }

        if url[scheme_end + 3..].is_empty() {
            return Err(ConfigError::InvalidHostUrl { url });
        }

        Ok(Self(url))
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_domain_accepts_full_format_only() {
        let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");

        // Short form is not normalized, unlike SDK-style domain handling
        assert!(ShopDomain::new("my-store").is_err());
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new(".myshopify.com").is_err());
        assert!(ShopDomain::new("my store.myshopify.com").is_err());
        assert!(ShopDomain::new("my_store.myshopify.com").is_err());
        assert!(ShopDomain::new("my-store.otherdomain.com").is_err());

        // No case normalization: uppercase is invalid, not coerced
        assert!(ShopDomain::new("MY-STORE.myshopify.com").is_err());
    }

    #[test]
    fn test_shop_domain_allows_digits_and_hyphens() {
        assert!(ShopDomain::new("store-2.myshopify.com").is_ok());
        assert!(ShopDomain::new("123.myshopify.com").is_ok());
    }

    #[test]
    fn test_shop_domain_serializes_to_string() {
        let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""my-store.myshopify.com""#);
    }

    #[test]
    fn test_shop_domain_deserialize_rejects_invalid() {
        let result: Result<ShopDomain, _> = serde_json::from_str(r#""not a domain""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_access_token_rejects_empty_string() {
        assert!(matches!(
            AccessToken::new(""),
            Err(ConfigError::EmptyAccessToken)
        ));
    }

    #[test]
    fn test_access_token_masks_value_in_debug() {
        let token = AccessToken::new("shpat_super_secret").unwrap();
        let debug_output = format!("{:?}", token);
        assert_eq!(debug_output, "AccessToken(*****)");
        assert!(!debug_output.contains("shpat_super_secret"));
    }

    #[test]
    fn test_shared_secret_masks_value_in_debug() {
        let secret = SharedSecret::new("flow-secret").unwrap();
        assert_eq!(format!("{:?}", secret), "SharedSecret(*****)");
    }

    #[test]
    fn test_host_url_strips_trailing_slash() {
        let url = HostUrl::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.as_ref(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("://example.com").is_err());
    }
}
