//! Error types for relay configuration.
//!
//! This module contains the error type used by configuration constructors
//! and the region registry. All construction-time validation is fail-fast:
//! constructors return `Result<T, ConfigError>` with clear, actionable
//! messages.
//!
//! # Example
//!
//! ```rust
//! use shipline_relay::{AccessToken, ConfigError};
//!
//! let result = AccessToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessToken)));
//! ```

use thiserror::Error;

/// Errors that can occur while building the relay configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Admin access token cannot be empty.
    #[error("Access token cannot be empty. Please provide a valid Shopify Admin API token.")]
    EmptyAccessToken,

    /// Shared secret cannot be empty.
    #[error("Shared secret cannot be empty. Omit the field to disable the secret check.")]
    EmptySharedSecret,

    /// Storefront domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2025-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Host URL override is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://proxy.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Two region entries share the same storefront domain.
    #[error("Duplicate region for shop domain '{domain}'. Each storefront domain may be configured at most once.")]
    DuplicateRegionDomain {
        /// The domain configured more than once.
        domain: String,
    },

    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnvValue {
        /// The environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_access_token_error_message() {
        let error = ConfigError::EmptyAccessToken;
        let message = error.to_string();
        assert!(message.contains("Access token cannot be empty"));
    }

    #[test]
    fn test_invalid_shop_domain_error_message() {
        let error = ConfigError::InvalidShopDomain {
            domain: "bad domain!".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("bad domain!"));
        assert!(message.contains("Expected format"));
    }

    #[test]
    fn test_duplicate_region_error_message() {
        let error = ConfigError::DuplicateRegionDomain {
            domain: "store-a.myshopify.com".to_string(),
        };
        assert!(error.to_string().contains("store-a.myshopify.com"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyAccessToken;
        let _: &dyn std::error::Error = &error;
    }
}
