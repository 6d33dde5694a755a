//! Request validation for the relay endpoint.
//!
//! These validators run before any remote call is attempted: they check the
//! storefront domain shape, resolve the region, verify the optional shared
//! secret, canonicalize the order reference, and require a target title.
//! All of them are pure functions returning a structured [`ValidationError`]
//! with an HTTP-style status code, never a panic.
//!
//! # Security
//!
//! The shared-secret check uses constant-time comparison
//! ([`subtle::ConstantTimeEq`]) so that response timing does not leak the
//! position of the first mismatched byte. Absent or empty header values are
//! compared as an empty byte string rather than rejected up front, keeping
//! the comparison path uniform.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::ShopDomain;
use crate::region::{Region, RegionRegistry};

/// Canonical prefix of a fully-qualified order identifier.
pub const ORDER_GID_PREFIX: &str = "gid://shopify/Order/";

/// A request-level validation failure.
///
/// Carries the HTTP status the endpoint should answer with (400 or 401) and
/// a caller-facing message. These are the caller's fault by definition; remote
/// faults live in the gateway and orchestrator error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// HTTP status code for the response (400 or 401).
    pub status: u16,
    /// Caller-facing error message.
    pub message: String,
}

impl ValidationError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            message: message.into(),
        }
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: 401,
            message: message.into(),
        }
    }
}

/// Validates the storefront domain shape.
///
/// The value must match `^[a-z0-9-]+\.myshopify\.com$` exactly; there is no
/// trimming, lowercasing, or short-form expansion.
///
/// # Errors
///
/// Returns 400 `Missing/invalid shopDomain` for absent or malformed values.
pub fn validate_domain(raw: Option<&str>) -> Result<&str, ValidationError> {
    match raw {
        Some(domain) if ShopDomain::is_valid(domain) => Ok(domain),
        _ => Err(ValidationError::bad_request("Missing/invalid shopDomain")),
    }
}

/// Resolves a validated domain to its configured region.
///
/// # Errors
///
/// Returns 400 `Shop not recognized: <domain>` when the domain is not in the
/// registry.
pub fn resolve_region<'a>(
    registry: &'a RegionRegistry,
    domain: &str,
) -> Result<&'a Region, ValidationError> {
    registry
        .lookup(domain)
        .ok_or_else(|| ValidationError::bad_request(format!("Shop not recognized: {domain}")))
}

/// Verifies the shared-secret header for a region.
///
/// Only enforced when the region has a configured secret. The comparison is
/// constant-time over the bytes of both operands; an absent header is treated
/// as an empty byte string so the check never faults on missing input.
///
/// # Errors
///
/// Returns 401 `Bad X-Flow-Secret` on mismatch.
pub fn check_secret(region: &Region, provided: Option<&str>) -> Result<(), ValidationError> {
    let Some(expected) = &region.shared_secret else {
        return Ok(());
    };

    let provided = provided.unwrap_or("").as_bytes();
    let matches: bool = provided.ct_eq(expected.as_ref().as_bytes()).into();
    if matches {
        Ok(())
    } else {
        Err(ValidationError::unauthorized("Bad X-Flow-Secret"))
    }
}

/// Canonicalizes an order reference to the fully-qualified gid form.
///
/// The fully-qualified candidate (`orderGid`) is tried first, then the bare
/// numeric fallback (`orderId`). A candidate is accepted when it already
/// carries the canonical prefix, or consists only of decimal digits and is
/// wrapped into `gid://shopify/Order/<digits>`.
///
/// # Errors
///
/// Returns 400 `Missing/invalid orderGid/orderId` when neither candidate is
/// usable.
pub fn canonicalize_order_ref(
    gid: Option<&str>,
    numeric: Option<&str>,
) -> Result<String, ValidationError> {
    for candidate in [gid, numeric].into_iter().flatten() {
        if candidate.starts_with(ORDER_GID_PREFIX) {
            return Ok(candidate.to_string());
        }
        if !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(format!("{ORDER_GID_PREFIX}{candidate}"));
        }
    }
    Err(ValidationError::bad_request(
        "Missing/invalid orderGid/orderId",
    ))
}

/// Requires a non-empty target shipping title.
///
/// Whitespace is trimmed; the trimmed value is returned.
///
/// # Errors
///
/// Returns 400 `Missing targetShippingTitle` for absent or blank values.
pub fn require_title(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(ValidationError::bad_request("Missing targetShippingTitle")),
    }
}
