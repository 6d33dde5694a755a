//! HTTP endpoint adapter.
//!
//! Turns inbound requests into orchestrator calls and orchestrator results
//! into JSON responses. Two routes exist: an unauthenticated `GET /health`
//! and the `POST /flow/edit-shipping-lines` webhook target.
//!
//! Every failure path answers JSON `{"error": message}`; a `details` field is
//! added only when the debug toggle is enabled, never by default. Validation
//! failures are answered before any remote call is made.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{ApiVersion, RelayConfig};
use crate::orchestrator::{EditError, EditRequest, EditResult, Orchestrator};
use crate::region::RegionRegistry;
use crate::validate;

/// Header carrying the shared secret for authenticated regions.
pub const FLOW_SECRET_HEADER: &str = "x-flow-secret";

/// Shared state behind the router.
#[derive(Debug)]
pub struct AppState {
    /// Immutable region registry built at startup.
    pub registry: RegionRegistry,
    /// The edit orchestrator (owns the gateway).
    pub orchestrator: Orchestrator,
    /// Admin API version, reported by `/health`.
    pub api_version: ApiVersion,
    /// Whether error responses may carry debug details.
    pub debug_details: bool,
}

impl AppState {
    /// Builds the state from configuration plus the pre-built registry and
    /// orchestrator.
    #[must_use]
    pub fn new(config: &RelayConfig, registry: RegionRegistry, orchestrator: Orchestrator) -> Self {
        Self {
            registry,
            orchestrator,
            api_version: config.api_version().clone(),
            debug_details: config.debug_details(),
        }
    }
}

/// Builds the relay router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/flow/edit-shipping-lines", post(edit_shipping_lines))
        .with_state(state)
}

/// Inbound body for `POST /flow/edit-shipping-lines`.
///
/// Everything is optional at the transport layer; the validators decide what
/// is actually required and answer with precise 4xx messages.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditShippingLinesBody {
    shop_domain: Option<String>,
    order_gid: Option<String>,
    order_id: Option<String>,
    target_shipping_title: Option<String>,
    /// Accepted as number or string; parsed (and rejected) downstream.
    target_shipping_price: Option<Value>,
    #[serde(default)]
    dry_run: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let shops: Vec<&str> = state
        .registry
        .regions()
        .map(|r| r.domain.as_ref())
        .collect();
    let configured: serde_json::Map<String, Value> = state
        .registry
        .regions()
        .map(|r| (r.code.clone(), Value::Bool(r.is_configured())))
        .collect();

    Json(json!({
        "ok": true,
        "shops": shops,
        "shopifyConfigured": configured,
        "apiVersion": state.api_version.as_str(),
    }))
}

async fn edit_shipping_lines(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<EditShippingLinesBody>, JsonRejection>,
) -> Response {
    // Absent or malformed bodies fall through to the validators, which
    // answer with a precise field-level message instead of a transport error.
    let body = body.map(|Json(b)| b).unwrap_or_default();

    match handle_edit(&state, &headers, body).await {
        Ok(response) => response,
        Err(err) => error_response(&state, &err),
    }
}

/// The validated request flow: domain → region → secret → order ref → title,
/// then the orchestrator sequence.
async fn handle_edit(
    state: &AppState,
    headers: &HeaderMap,
    body: EditShippingLinesBody,
) -> Result<Response, EditError> {
    let domain = validate::validate_domain(body.shop_domain.as_deref())?;
    let region = validate::resolve_region(&state.registry, domain)?;

    let provided_secret = headers
        .get(FLOW_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    validate::check_secret(region, provided_secret)?;

    let order_gid =
        validate::canonicalize_order_ref(body.order_gid.as_deref(), body.order_id.as_deref())?;
    let target_title = validate::require_title(body.target_shipping_title.as_deref())?;

    let request = EditRequest {
        order_gid,
        target_title,
        target_price: body.target_shipping_price.as_ref().map(price_as_string),
        dry_run: body.dry_run,
    };

    let result = state.orchestrator.execute(region, &request).await?;
    Ok(success_response(domain, &result))
}

/// Carries the caller's price downstream as a raw string, preserving the
/// orchestrator's own parse-and-reject behavior for non-numeric input.
fn price_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn success_response(domain: &str, result: &EditResult) -> Response {
    let mut body = json!({
        "ok": true,
        "shopDomain": domain,
        "orderName": result.order_name,
        "mode": result.mode,
        "from": result.before.as_ref().map(|line| json!({
            "id": line.id,
            "title": line.title,
            "price": line.price,
        })),
        "to": { "title": result.after.title, "price": result.after.price },
    });
    if result.dry_run {
        body["dryRun"] = Value::Bool(true);
    }
    (StatusCode::OK, Json(body)).into_response()
}

fn error_response(state: &AppState, err: &EditError) -> Response {
    let status = err.status();
    if status >= 500 {
        tracing::error!(%err, status, "edit-shipping-lines failed");
    } else {
        tracing::debug!(%err, status, "edit-shipping-lines rejected");
    }

    let mut body = json!({ "error": err.to_string() });
    if state.debug_details {
        body["details"] = Value::String(format!("{err:?}"));
    }

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionEntry;
    use crate::gateway::CommerceGateway;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let config = RelayConfig::builder()
            .region(RegionEntry::new(
                "de",
                Some("store-de.myshopify.com"),
                Some("shpat_test"),
                None,
            ))
            .region(RegionEntry::new(
                "us",
                Some("store-us.myshopify.com"),
                None,
                None,
            ))
            .api_version(ApiVersion::V2025_10)
            .build();
        let registry = RegionRegistry::from_entries(config.regions().to_vec()).unwrap();
        let orchestrator = Orchestrator::new(CommerceGateway::new(&config));
        Arc::new(AppState::new(&config, registry, orchestrator))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_shops_and_configuration() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["apiVersion"], json!("2025-10"));
        assert_eq!(body["shopifyConfigured"]["de"], json!(true));
        assert_eq!(body["shopifyConfigured"]["us"], json!(false));

        let shops = body["shops"].as_array().unwrap();
        assert_eq!(shops.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_rejects_unknown_shop_with_400() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/flow/edit-shipping-lines")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "shopDomain": "other.myshopify.com", "orderId": "1", "targetShippingTitle": "X" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            json!("Shop not recognized: other.myshopify.com")
        );
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_edit_handles_missing_body() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/flow/edit-shipping-lines")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // No body at all still gets the validator's answer, not a transport 500
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Missing/invalid shopDomain"));
    }

    #[test]
    fn test_price_as_string_passes_numbers_and_strings_through() {
        assert_eq!(price_as_string(&json!(5.5)), "5.5");
        assert_eq!(price_as_string(&json!("7.25")), "7.25");
        // Non-numeric JSON still becomes a string; the orchestrator rejects it
        assert_eq!(price_as_string(&json!(true)), "true");
    }
}
