//! Shopify Admin API version definitions.
//!
//! This module provides the [`ApiVersion`] enum for specifying which version
//! of the Admin GraphQL API the gateway should target.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version.
///
/// Shopify releases new API versions quarterly (January, April, July,
/// October). This enum provides variants for the versions inside the current
/// support window, plus an `Unstable` variant for development and a `Custom`
/// variant for future versions.
///
/// # Example
///
/// ```rust
/// use shipline_relay::ApiVersion;
///
/// // Use the latest stable version
/// let version = ApiVersion::latest();
/// assert!(version.is_stable());
///
/// // Parse from string
/// let version: ApiVersion = "2025-01".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2025_01);
///
/// // Display as string
/// assert_eq!(format!("{}", ApiVersion::V2025_01), "2025-01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Custom version string for future or unrecognized versions.
    Custom(String),
}

impl ApiVersion {
    /// Returns the latest stable API version.
    ///
    /// This should be updated when new stable versions are released.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2025_10
    }

    /// Returns `true` if this is a known stable API version.
    ///
    /// Returns `false` for `Unstable` and `Custom` variants.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    /// Returns the version string as used in API URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(s) => s,
        }
    }

    /// Validates a custom version string in `YYYY-MM` format.
    fn is_valid_custom(s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == 7
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4] == b'-'
            && matches!(&bytes[5..7], b"01" | b"04" | b"07" | b"10")
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            other if Self::is_valid_custom(other) => Ok(Self::Custom(other.to_string())),
            other => Err(ConfigError::InvalidApiVersion {
                version: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_stable() {
        assert!(ApiVersion::latest().is_stable());
    }

    #[test]
    fn test_parse_known_versions() {
        let version: ApiVersion = "2025-01".parse().unwrap();
        assert_eq!(version, ApiVersion::V2025_01);

        let version: ApiVersion = "unstable".parse().unwrap();
        assert_eq!(version, ApiVersion::Unstable);
    }

    #[test]
    fn test_parse_future_version_as_custom() {
        let version: ApiVersion = "2026-01".parse().unwrap();
        assert_eq!(version, ApiVersion::Custom("2026-01".to_string()));
        assert_eq!(version.as_str(), "2026-01");
    }

    #[test]
    fn test_parse_rejects_malformed_versions() {
        assert!("2025".parse::<ApiVersion>().is_err());
        assert!("2025-13".parse::<ApiVersion>().is_err());
        assert!("2025-02".parse::<ApiVersion>().is_err());
        assert!("latest".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_display_matches_url_form() {
        assert_eq!(format!("{}", ApiVersion::V2025_10), "2025-10");
        assert_eq!(format!("{}", ApiVersion::Unstable), "unstable");
    }
}
