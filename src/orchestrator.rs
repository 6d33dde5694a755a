//! Shipping-line edit orchestration.
//!
//! This module implements the five-step order-edit sequence: fetch the order
//! and its current shipping line, decide add-vs-replace, begin an edit
//! session, add the new line, remove the old line when replacing, and commit.
//! Each step gates the next; a failure aborts the remainder with no
//! compensating rollback (the remote order may be left mid-edit, which the
//! error makes visible by naming the failing step).
//!
//! Dry-run requests short-circuit after the fetch: the add/replace decision
//! and the resulting before/after shape are computed and returned without a
//! single mutating call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::gateway::{truncate_error, CommerceGateway, GatewayError};
use crate::region::Region;
use crate::validate::ValidationError;

/// Staff annotation attached to every committed edit.
pub const STAFF_NOTE: &str = "Normalized shipping line via Flow";

const ORDER_SHIPPING_QUERY: &str = r"
query OrderShippingLines($id: ID!) {
  order(id: $id) {
    id
    name
    currencyCode
    shippingLines(first: 10) {
      edges {
        node {
          id
          title
          originalPriceSet { shopMoney { amount currencyCode } }
        }
      }
    }
  }
}";

const ORDER_EDIT_BEGIN: &str = r"
mutation OrderEditBegin($id: ID!) {
  orderEditBegin(id: $id) {
    calculatedOrder { id }
    userErrors { field message }
  }
}";

const ORDER_EDIT_ADD_SHIPPING_LINE: &str = r"
mutation OrderEditAddShippingLine($id: ID!, $shippingLine: OrderEditAddShippingLineInput!) {
  orderEditAddShippingLine(id: $id, shippingLine: $shippingLine) {
    calculatedOrder { id }
    userErrors { field message }
  }
}";

const ORDER_EDIT_REMOVE_SHIPPING_LINE: &str = r"
mutation OrderEditRemoveShippingLine($id: ID!, $shippingLineId: ID!) {
  orderEditRemoveShippingLine(id: $id, shippingLineId: $shippingLineId) {
    calculatedOrder { id }
    userErrors { field message }
  }
}";

const ORDER_EDIT_COMMIT: &str = r"
mutation OrderEditCommit($id: ID!, $staffNote: String) {
  orderEditCommit(id: $id, notifyCustomer: false, staffNote: $staffNote) {
    order { id }
    userErrors { field message }
  }
}";

/// One shipping-line edit request, already validated and canonicalized.
#[derive(Clone, Debug)]
pub struct EditRequest {
    /// Canonical order identifier (`gid://shopify/Order/<digits>`).
    pub order_gid: String,
    /// The shipping title to put on the order.
    pub target_title: String,
    /// Caller-supplied price, used only in add mode. Kept as the raw string
    /// so the parse failure is this module's decision, not the transport's.
    pub target_price: Option<String>,
    /// When set, compute the result without issuing any mutating call.
    pub dry_run: bool,
}

/// Whether the order had a shipping line to replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// No existing line; a new one is added at the caller's price.
    Add,
    /// An existing line is replaced, carrying its price over verbatim.
    Replace,
}

impl EditMode {
    /// Returns the wire form of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
        }
    }
}

/// The shipping line found on the order before the edit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShippingLine {
    /// Remote identifier of the line.
    pub id: String,
    /// Line title.
    pub title: String,
    /// Parsed price.
    pub price: f64,
    /// Currency code, when the remote supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// The shipping line as it stands after the edit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppliedLine {
    /// The target title.
    pub title: String,
    /// The applied price.
    pub price: f64,
}

/// Outcome of a (possibly dry-run) edit.
#[derive(Clone, Debug, Serialize)]
pub struct EditResult {
    /// Add or replace.
    pub mode: EditMode,
    /// The order's display name (e.g., `#1001`).
    pub order_name: String,
    /// The line that was on the order, or `None` in add mode.
    pub before: Option<ShippingLine>,
    /// The line the order ends up with.
    pub after: AppliedLine,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Error type for the edit sequence.
#[derive(Debug, Error)]
pub enum EditError {
    /// A request-level validation failure (400/401).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The order does not exist on the storefront backend.
    #[error("Order not found")]
    OrderNotFound,

    /// A price failed to parse to a finite number.
    ///
    /// 400 when the caller supplied the bad price, 500 when the *existing*
    /// remote price is bad: the latter is a remote data problem, not a
    /// caller error.
    #[error("{detail}")]
    InvalidPrice {
        /// 400 or 500, depending on whose price was bad.
        status: u16,
        /// What failed to parse.
        detail: String,
    },

    /// `orderEditBegin` answered without a calculated-order handle, which
    /// breaks the remote contract.
    #[error("Missing calculatedOrderId")]
    MissingSessionHandle,

    /// A mutating step answered with a non-empty `userErrors` list.
    #[error("{step} failed: {errors}")]
    RemoteUserError {
        /// The mutation that failed.
        step: &'static str,
        /// Truncated serialized error list.
        errors: String,
    },

    /// A transport- or protocol-level gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl EditError {
    /// Maps the error to the HTTP status the endpoint should answer with.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(e) => e.status,
            Self::OrderNotFound => 404,
            Self::InvalidPrice { status, .. } => *status,
            Self::MissingSessionHandle | Self::RemoteUserError { .. } | Self::Gateway(_) => 500,
        }
    }
}

// Typed views over the fetch response. Mutation payloads are inspected
// positionally instead; they only ever need two fields.

#[derive(Debug, Deserialize)]
struct OrderShippingData {
    order: Option<OrderNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    name: String,
    currency_code: Option<String>,
    shipping_lines: ShippingLineConnection,
}

#[derive(Debug, Deserialize)]
struct ShippingLineConnection {
    edges: Vec<ShippingLineEdge>,
}

#[derive(Debug, Deserialize)]
struct ShippingLineEdge {
    node: ShippingLineNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShippingLineNode {
    id: String,
    title: Option<String>,
    original_price_set: Option<PriceSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceSet {
    shop_money: Option<Money>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Money {
    amount: Option<String>,
    currency_code: Option<String>,
}

impl ShippingLineNode {
    fn raw_amount(&self) -> Option<&str> {
        self.original_price_set
            .as_ref()?
            .shop_money
            .as_ref()?
            .amount
            .as_deref()
    }

    fn currency(&self) -> Option<&str> {
        self.original_price_set
            .as_ref()?
            .shop_money
            .as_ref()?
            .currency_code
            .as_deref()
    }
}

/// Parses the caller-supplied price, defaulting to 0 when absent.
/// Shipping-line prices are non-negative, so values below zero are
/// rejected here rather than bounced back as remote `userErrors`.
fn parse_caller_price(raw: Option<&str>) -> Result<f64, EditError> {
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| EditError::InvalidPrice {
            status: 400,
            detail: format!("Invalid targetShippingPrice: {raw}"),
        })
}

/// Parses the existing line's price; a bad value here is a remote fault.
fn parse_existing_price(raw: Option<&str>) -> Result<f64, EditError> {
    let raw = raw.unwrap_or_default();
    raw.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| EditError::InvalidPrice {
            status: 500,
            detail: format!("Unparseable existing shipping price: {raw}"),
        })
}

/// Fails with [`EditError::RemoteUserError`] when the mutation payload
/// carries a non-empty `userErrors` list.
fn ensure_no_user_errors(step: &'static str, payload: &Value) -> Result<(), EditError> {
    match payload.get("userErrors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => Err(EditError::RemoteUserError {
            step,
            errors: truncate_error(&Value::Array(errors.clone()).to_string()),
        }),
        _ => Ok(()),
    }
}

/// Extracts a mutation payload from the response data, failing when the
/// remote dropped it entirely.
fn mutation_payload<'a>(data: &'a Value, field: &str) -> Result<&'a Value, EditError> {
    match data.get(field) {
        Some(payload) if !payload.is_null() => Ok(payload),
        _ => Err(EditError::Gateway(GatewayError::Malformed {
            detail: format!("response has no {field} payload"),
        })),
    }
}

/// Runs shipping-line edits against a storefront backend.
///
/// One orchestrator serves all regions; the region is picked per call.
///
/// # Example
///
/// ```rust,ignore
/// use shipline_relay::{EditRequest, Orchestrator};
///
/// let result = orchestrator
///     .execute(region, &EditRequest {
///         order_gid: "gid://shopify/Order/1001".to_string(),
///         target_title: "DHL_PAKET::Standard".to_string(),
///         target_price: None,
///         dry_run: false,
///     })
///     .await?;
/// assert_eq!(result.after.title, "DHL_PAKET::Standard");
/// ```
#[derive(Clone, Debug)]
pub struct Orchestrator {
    gateway: CommerceGateway,
}

impl Orchestrator {
    /// Creates an orchestrator over the given gateway.
    #[must_use]
    pub const fn new(gateway: CommerceGateway) -> Self {
        Self { gateway }
    }

    /// Returns the underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &CommerceGateway {
        &self.gateway
    }

    /// Executes the edit sequence for one order.
    ///
    /// Steps, in strict order: fetch, decide mode and price, dry-run
    /// short-circuit, begin edit, add line, remove old line (replace mode
    /// only), commit. Every mutating step's `userErrors` list is checked;
    /// a non-empty list aborts the remaining sequence immediately.
    ///
    /// # Errors
    ///
    /// - [`EditError::OrderNotFound`] when the order is absent
    /// - [`EditError::InvalidPrice`] for unparseable prices (400 caller /
    ///   500 existing)
    /// - [`EditError::MissingSessionHandle`] when `orderEditBegin` returns
    ///   no calculated-order id
    /// - [`EditError::RemoteUserError`] naming the failing step
    /// - [`EditError::Gateway`] for transport and protocol failures
    pub async fn execute(
        &self,
        region: &Region,
        request: &EditRequest,
    ) -> Result<EditResult, EditError> {
        // Step 1: fetch the order and its current shipping line.
        let data = self
            .gateway
            .call(
                region,
                ORDER_SHIPPING_QUERY,
                json!({ "id": request.order_gid }),
            )
            .await?;
        let parsed: OrderShippingData =
            serde_json::from_value(data).map_err(|e| GatewayError::Malformed {
                detail: truncate_error(&format!("unexpected order shape: {e}")),
            })?;
        let order = parsed.order.ok_or(EditError::OrderNotFound)?;

        // Only the first of possibly many lines is considered "current".
        let current = order.shipping_lines.edges.first().map(|e| &e.node);

        // Step 2: mode and price. Replace carries the existing price over
        // verbatim; add uses the caller's price or 0.
        let (mode, price, amount, before) = match current {
            Some(node) => {
                let price = parse_existing_price(node.raw_amount())?;
                let before = ShippingLine {
                    id: node.id.clone(),
                    title: node.title.clone().unwrap_or_default(),
                    price,
                    currency: node.currency().map(str::to_string),
                };
                let amount = node.raw_amount().unwrap_or_default().to_string();
                (EditMode::Replace, price, amount, Some(before))
            }
            None => {
                let price = parse_caller_price(request.target_price.as_deref())?;
                let amount = request
                    .target_price
                    .as_deref()
                    .map_or_else(|| "0".to_string(), |raw| raw.trim().to_string());
                (EditMode::Add, price, amount, None)
            }
        };

        let result = EditResult {
            mode,
            order_name: order.name.clone(),
            before,
            after: AppliedLine {
                title: request.target_title.clone(),
                price,
            },
            dry_run: request.dry_run,
        };

        // Step 3: dry-run short-circuit, zero mutating calls.
        if request.dry_run {
            tracing::debug!(order = %order.name, mode = mode.as_str(), "dry run, skipping edit");
            return Ok(result);
        }

        let currency = result
            .before
            .as_ref()
            .and_then(|b| b.currency.clone())
            .or(order.currency_code);

        // Step 4: begin the edit session.
        let data = self
            .gateway
            .call(region, ORDER_EDIT_BEGIN, json!({ "id": request.order_gid }))
            .await?;
        let payload = mutation_payload(&data, "orderEditBegin")?;
        ensure_no_user_errors("orderEditBegin", payload)?;
        let calculated_id = payload
            .pointer("/calculatedOrder/id")
            .and_then(Value::as_str)
            .ok_or(EditError::MissingSessionHandle)?
            .to_string();
        tracing::debug!(order = %order.name, mode = mode.as_str(), "edit session started");

        // Step 5: add the new line.
        let mut price_input = json!({ "amount": amount });
        if let Some(currency) = currency {
            price_input["currencyCode"] = Value::String(currency);
        }
        let data = self
            .gateway
            .call(
                region,
                ORDER_EDIT_ADD_SHIPPING_LINE,
                json!({
                    "id": calculated_id,
                    "shippingLine": {
                        "title": request.target_title,
                        "price": price_input,
                    },
                }),
            )
            .await?;
        ensure_no_user_errors(
            "orderEditAddShippingLine",
            mutation_payload(&data, "orderEditAddShippingLine")?,
        )?;

        // Step 6: remove the original line, replace mode only.
        if let Some(before) = &result.before {
            let data = self
                .gateway
                .call(
                    region,
                    ORDER_EDIT_REMOVE_SHIPPING_LINE,
                    json!({ "id": calculated_id, "shippingLineId": before.id }),
                )
                .await?;
            ensure_no_user_errors(
                "orderEditRemoveShippingLine",
                mutation_payload(&data, "orderEditRemoveShippingLine")?,
            )?;
        }

        // Step 7: commit with customer notification disabled.
        let data = self
            .gateway
            .call(
                region,
                ORDER_EDIT_COMMIT,
                json!({ "id": calculated_id, "staffNote": STAFF_NOTE }),
            )
            .await?;
        ensure_no_user_errors(
            "orderEditCommit",
            mutation_payload(&data, "orderEditCommit")?,
        )?;

        tracing::debug!(order = %order.name, mode = mode.as_str(), title = %request.target_title, "edit committed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Mode & price decisions ===

    #[test]
    fn test_parse_caller_price_defaults_to_zero() {
        assert_eq!(parse_caller_price(None).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_caller_price_accepts_numeric_strings() {
        assert_eq!(parse_caller_price(Some("12.5")).unwrap(), 12.5);
        assert_eq!(parse_caller_price(Some(" 0 ")).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_caller_price_rejects_garbage_with_400() {
        for raw in ["abc", "", "NaN", "inf"] {
            match parse_caller_price(Some(raw)) {
                Err(EditError::InvalidPrice { status: 400, .. }) => {}
                other => panic!("expected 400 InvalidPrice for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_caller_price_rejects_negative_with_400() {
        for raw in ["-5", "-0.01", " -19.99 "] {
            match parse_caller_price(Some(raw)) {
                Err(EditError::InvalidPrice { status: 400, .. }) => {}
                other => panic!("expected 400 InvalidPrice for {raw:?}, got {other:?}"),
            }
        }
        // Negative zero parses to 0.0 and stays acceptable.
        assert_eq!(parse_caller_price(Some("-0")).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_existing_price_rejects_garbage_with_500() {
        for raw in [None, Some("not-a-price"), Some("NaN")] {
            match parse_existing_price(raw) {
                Err(EditError::InvalidPrice { status: 500, .. }) => {}
                other => panic!("expected 500 InvalidPrice for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_existing_price_is_verbatim_float_parse() {
        assert_eq!(parse_existing_price(Some("5.00")).unwrap(), 5.0);
        assert_eq!(parse_existing_price(Some("19.99")).unwrap(), 19.99);
    }

    // === User-error assertion ===

    #[test]
    fn test_ensure_no_user_errors_passes_on_empty_or_absent_list() {
        assert!(ensure_no_user_errors("step", &json!({ "userErrors": [] })).is_ok());
        assert!(ensure_no_user_errors("step", &json!({})).is_ok());
    }

    #[test]
    fn test_ensure_no_user_errors_names_the_step() {
        let payload = json!({
            "userErrors": [{ "field": ["id"], "message": "Order cannot be edited" }]
        });
        let err = ensure_no_user_errors("orderEditBegin", &payload).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("orderEditBegin"));
        assert!(message.contains("Order cannot be edited"));
        assert_eq!(err.status(), 500);
    }

    // === Error status mapping ===

    #[test]
    fn test_edit_error_statuses() {
        assert_eq!(EditError::OrderNotFound.status(), 404);
        assert_eq!(EditError::MissingSessionHandle.status(), 500);
        assert_eq!(
            EditError::Gateway(GatewayError::MissingCredential {
                code: "de".to_string()
            })
            .status(),
            500
        );
    }

    #[test]
    fn test_edit_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EditMode::Add).unwrap(), r#""add""#);
        assert_eq!(
            serde_json::to_string(&EditMode::Replace).unwrap(),
            r#""replace""#
        );
    }

    #[test]
    fn test_fetch_shape_deserializes() {
        let data = json!({
            "order": {
                "id": "gid://shopify/Order/1",
                "name": "#1001",
                "currencyCode": "EUR",
                "shippingLines": {
                    "edges": [{
                        "node": {
                            "id": "gid://shopify/ShippingLine/9",
                            "title": "Standard",
                            "originalPriceSet": { "shopMoney": { "amount": "5.00", "currencyCode": "EUR" } }
                        }
                    }]
                }
            }
        });

        let parsed: OrderShippingData = serde_json::from_value(data).unwrap();
        let order = parsed.order.unwrap();
        assert_eq!(order.name, "#1001");
        let node = &order.shipping_lines.edges[0].node;
        assert_eq!(node.raw_amount(), Some("5.00"));
        assert_eq!(node.currency(), Some("EUR"));
    }

    #[test]
    fn test_missing_order_deserializes_to_none() {
        let parsed: OrderShippingData = serde_json::from_value(json!({ "order": null })).unwrap();
        assert!(parsed.order.is_none());
    }
}
