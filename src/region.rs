//! Region registry: the immutable storefront-domain → credential map.
//!
//! A [`Region`] ties one storefront domain to its Admin API credential and an
//! optional shared secret for inbound authentication. The [`RegionRegistry`]
//! is built once at startup from configuration entries and never mutated
//! afterwards, so it can be shared freely across request handlers without
//! locking.

use std::collections::HashMap;

use crate::config::{AccessToken, RegionEntry, SharedSecret, ShopDomain};
use crate::error::ConfigError;

/// One configured storefront region.
///
/// The credential is optional: a region without a token is still routable
/// (it shows up in `/health` as unconfigured) but any gateway call against
/// it fails with a missing-credential error.
#[derive(Clone, Debug)]
pub struct Region {
    /// Short region identifier (e.g., "de").
    pub code: String,
    /// The storefront domain, unique across the registry.
    pub domain: ShopDomain,
    /// Admin API access token, if provisioned.
    pub credential: Option<AccessToken>,
    /// Shared secret for the `X-Flow-Secret` header, if enforced.
    pub shared_secret: Option<SharedSecret>,
}

impl Region {
    /// Returns `true` if this region has an Admin API credential.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.credential.is_some()
    }
}

/// Immutable mapping from storefront domain to [`Region`].
///
/// Lookup is O(1) by exact, case-sensitive domain string equality. No
/// normalization is applied on either side; the domain must already be in
/// canonical `shop-name.myshopify.com` form.
///
/// # Example
///
/// ```rust
/// use shipline_relay::{RegionEntry, RegionRegistry};
///
/// let registry = RegionRegistry::from_entries(vec![
///     RegionEntry::new("de", Some("store-de.myshopify.com"), Some("shpat_abc"), None),
///     // Entries without a domain are dropped
///     RegionEntry::new("fr", None, Some("shpat_def"), None),
/// ])
/// .unwrap();
///
/// assert!(registry.lookup("store-de.myshopify.com").is_some());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RegionRegistry {
    by_domain: HashMap<String, Region>,
}

// Verify RegionRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RegionRegistry>();
};

impl RegionRegistry {
    /// Builds a registry from configuration entries.
    ///
    /// Entries missing a storefront domain are dropped with a warning.
    /// Empty token or secret strings are treated as absent rather than
    /// rejected, matching how unset environment values usually arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] for a malformed domain and
    /// [`ConfigError::DuplicateRegionDomain`] when two entries share one.
    pub fn from_entries(entries: Vec<RegionEntry>) -> Result<Self, ConfigError> {
        let mut by_domain = HashMap::with_capacity(entries.len());

        for entry in entries {
            let Some(raw_domain) = non_empty(entry.shop_domain) else {
                tracing::warn!(code = %entry.code, "dropping region entry without a shop domain");
                continue;
            };

            let domain = ShopDomain::new(raw_domain)?;

            let credential = non_empty(entry.admin_token)
                .map(AccessToken::new)
                .transpose()?;
            let shared_secret = non_empty(entry.flow_secret)
                .map(SharedSecret::new)
                .transpose()?;

            let region = Region {
                code: entry.code,
                domain: domain.clone(),
                credential,
                shared_secret,
            };

            if by_domain
                .insert(domain.as_ref().to_string(), region)
                .is_some()
            {
                return Err(ConfigError::DuplicateRegionDomain {
                    domain: domain.as_ref().to_string(),
                });
            }
        }

        Ok(Self { by_domain })
    }

    /// Looks up a region by its exact storefront domain.
    #[must_use]
    pub fn lookup(&self, domain: &str) -> Option<&Region> {
        self.by_domain.get(domain)
    }

    /// Iterates over all configured regions in arbitrary order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.by_domain.values()
    }

    /// Returns the number of registered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    /// Returns `true` if no regions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}

/// Maps empty or absent strings to `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
