//! Commerce gateway: authenticated calls to the Admin GraphQL API.
//!
//! This module provides the [`CommerceGateway`] type for executing GraphQL
//! operations against a resolved region's storefront backend. Each call is
//! all-or-nothing: on any failure no partial data is returned, and the
//! gateway never retries (the caller decides whether to retry).
//!
//! # Thread Safety
//!
//! `CommerceGateway` is `Send + Sync` and cheap to clone; the underlying
//! `reqwest::Client` is shared.

use serde_json::Value;
use thiserror::Error;

use crate::config::{ApiVersion, HostUrl, RelayConfig};
use crate::region::Region;

/// Upper bound on error text carried out of the gateway.
///
/// Remote bodies can be arbitrarily large; truncating keeps log lines and
/// error responses bounded.
pub const MAX_ERROR_LEN: usize = 500;

/// Error type for gateway calls.
///
/// Every variant carries a human-readable message already truncated to
/// [`MAX_ERROR_LEN`]. All gateway failures surface to the endpoint as remote
/// faults (HTTP 500); none of them are the caller's doing.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The region has no Admin API credential configured.
    #[error("No Shopify token configured for {code}")]
    MissingCredential {
        /// Region code the call was made against.
        code: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("Shopify request timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout in milliseconds.
        timeout_ms: u128,
    },

    /// The request failed below HTTP (DNS, TLS, connection reset).
    #[error("Shopify request failed: {detail}")]
    Network {
        /// Truncated transport error description.
        detail: String,
    },

    /// The remote answered with a non-success HTTP status.
    #[error("Shopify HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Unexpected Shopify response: {detail}")]
    Malformed {
        /// Truncated description of the malformation.
        detail: String,
    },

    /// The response carried a non-empty top-level `errors` list.
    #[error("Shopify GraphQL errors: {errors}")]
    Remote {
        /// Truncated serialized error list.
        errors: String,
    },
}

/// Truncates error text to [`MAX_ERROR_LEN`] bytes on a char boundary.
pub(crate) fn truncate_error(text: &str) -> String {
    if text.len() <= MAX_ERROR_LEN {
        return text.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

/// Authenticated GraphQL gateway for the Admin API.
///
/// One gateway serves all regions; the credential and endpoint are picked
/// per call from the [`Region`] argument.
///
/// # Example
///
/// ```rust,ignore
/// use serde_json::json;
/// use shipline_relay::{CommerceGateway, RelayConfig};
///
/// let gateway = CommerceGateway::new(&RelayConfig::builder().build());
/// let data = gateway
///     .call(region, "query { shop { name } }", json!({}))
///     .await?;
/// println!("{}", data["shop"]["name"]);
/// ```
#[derive(Clone, Debug)]
pub struct CommerceGateway {
    client: reqwest::Client,
    api_version: ApiVersion,
    timeout: std::time::Duration,
    api_host: Option<HostUrl>,
}

// Verify CommerceGateway is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CommerceGateway>();
};

impl CommerceGateway {
    /// Creates a gateway from the relay configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created, which only
    /// happens when TLS initialization fails at process startup.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_version: config.api_version().clone(),
            timeout: config.fetch_timeout(),
            api_host: config.api_host().cloned(),
        }
    }

    /// Returns the Admin API version this gateway targets.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Builds the GraphQL endpoint URL for a region.
    ///
    /// Uses the configured host override when present (proxy and test
    /// scenario), otherwise `https://{shop-domain}`.
    #[must_use]
    pub fn endpoint(&self, region: &Region) -> String {
        let base = self.api_host.as_ref().map_or_else(
            || format!("https://{}", region.domain.as_ref()),
            |host| host.as_ref().to_string(),
        );
        format!("{base}/admin/api/{}/graphql.json", self.api_version)
    }

    /// Executes one GraphQL operation against the region's backend.
    ///
    /// Sends `{query, variables}` with the region's access token and returns
    /// the response's `data` object.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the region has no credential, the call
    /// times out (cooperative per-request cancellation), the HTTP status is
    /// not success, the body is not the expected JSON shape, or the response
    /// carries top-level GraphQL errors.
    pub async fn call(
        &self,
        region: &Region,
        query: &str,
        variables: Value,
    ) -> Result<Value, GatewayError> {
        let token = region
            .credential
            .as_ref()
            .ok_or_else(|| GatewayError::MissingCredential {
                code: region.code.clone(),
            })?;

        let url = self.endpoint(region);
        tracing::debug!(region = %region.code, %url, "sending Admin API request");

        let result = self
            .client
            .post(&url)
            .header("X-Shopify-Access-Token", token.as_ref())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await;

        let response = result.map_err(|e| self.transport_error(&e))?;

        let status = response.status().as_u16();
        // The request timeout also covers body reads, so a deadline that
        // fires mid-body classifies the same as one that fires mid-send.
        let body_text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !(200..300).contains(&status) {
            return Err(GatewayError::Status {
                status,
                body: truncate_error(&body_text),
            });
        }

        let body: Value =
            serde_json::from_str(&body_text).map_err(|_| GatewayError::Malformed {
                detail: truncate_error(&format!("non-JSON body: {body_text}")),
            })?;

        if let Some(errors) = body.get("errors").filter(|e| is_non_empty_list(e)) {
            return Err(GatewayError::Remote {
                errors: truncate_error(&errors.to_string()),
            });
        }

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(GatewayError::Malformed {
                detail: truncate_error("response has no data object"),
            }),
        }
    }

    /// Maps a transport-layer failure, whether it hit during send or while
    /// reading the body, to the matching gateway error.
    fn transport_error(&self, e: &reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout.as_millis(),
            }
        } else {
            GatewayError::Network {
                detail: truncate_error(&e.to_string()),
            }
        }
    }
}

fn is_non_empty_list(value: &Value) -> bool {
    value.as_array().is_some_and(|a| !a.is_empty())
}
