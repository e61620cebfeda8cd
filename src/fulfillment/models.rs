//! Fulfillment API wire models
//!
//! Request and response shapes for the Printful v1 endpoints this service
//! uses, mapped into the domain records. Every response arrives inside the
//! `{code, result}` envelope.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{MockupStatus, MockupTask, Order, OrderCosts, Recipient, ShippingRate};

/// Generic API response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub result: T,
}

/// Decimal amounts arrive as strings on order endpoints and as numbers on
/// estimate endpoints; normalize both to strings.
fn de_decimal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected decimal string or number, got {other}"
        ))),
    }
}

/// Rate ids are strings in practice but numbers in some responses
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    de_decimal(deserializer)
}

// ============================================================================
// Mockup Generator
// ============================================================================

/// File entry for a mockup generation request
#[derive(Debug, Serialize)]
pub struct MockupFile {
    pub placement: String,
    pub image_url: String,
}

/// POST /mockup-generator/create-task/{product_id}
#[derive(Debug, Serialize)]
pub struct CreateMockupTaskRequest {
    pub variant_ids: Vec<i64>,
    pub format: String,
    pub files: Vec<MockupFile>,
}

/// A single generated mockup
#[derive(Debug, Deserialize)]
pub struct WireMockup {
    pub mockup_url: String,
    #[serde(default)]
    pub placement: Option<String>,
}

/// GET /mockup-generator/task result (also returned by task creation)
#[derive(Debug, Deserialize)]
pub struct WireMockupTask {
    pub task_key: String,
    pub status: String,
    #[serde(default)]
    pub mockups: Vec<WireMockup>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<WireMockupTask> for MockupTask {
    fn from(wire: WireMockupTask) -> Self {
        let status = match wire.status.as_str() {
            "completed" => MockupStatus::Completed,
            "failed" => MockupStatus::Failed,
            _ => MockupStatus::Pending,
        };
        MockupTask {
            task_key: wire.task_key,
            status,
            result_urls: wire.mockups.into_iter().map(|m| m.mockup_url).collect(),
            error: wire.error,
        }
    }
}

// ============================================================================
// Shipping Rates
// ============================================================================

/// Line item for rate and cost estimates
#[derive(Debug, Serialize)]
pub struct RateItem {
    pub variant_id: i64,
    pub quantity: u32,
}

/// POST /shipping/rates
#[derive(Debug, Serialize)]
pub struct ShippingRatesRequest<'a> {
    pub recipient: &'a Recipient,
    pub items: Vec<RateItem>,
}

/// Shipping option as returned by the API
#[derive(Debug, Deserialize)]
pub struct WireShippingRate {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "de_decimal")]
    pub rate: String,
    pub currency: String,
    #[serde(default, rename = "minDeliveryDays")]
    pub min_delivery_days: Option<i32>,
    #[serde(default, rename = "maxDeliveryDays")]
    pub max_delivery_days: Option<i32>,
}

impl From<WireShippingRate> for ShippingRate {
    fn from(wire: WireShippingRate) -> Self {
        ShippingRate {
            id: wire.id,
            name: wire.name,
            rate: wire.rate,
            currency: wire.currency,
            min_days: wire.min_delivery_days,
            max_days: wire.max_delivery_days,
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// File entry for an order line item
#[derive(Debug, Serialize)]
pub struct OrderFile {
    pub url: String,
}

/// Order line item with the artwork attached
#[derive(Debug, Serialize)]
pub struct OrderItem {
    pub variant_id: i64,
    pub quantity: u32,
    pub files: Vec<OrderFile>,
}

/// POST /orders and POST /orders/estimate-costs
#[derive(Debug, Serialize)]
pub struct OrderRequest<'a> {
    pub recipient: &'a Recipient,
    pub items: Vec<OrderItem>,
}

/// Cost breakdown as returned by the API
#[derive(Debug, Deserialize)]
pub struct WireCosts {
    pub currency: String,
    #[serde(deserialize_with = "de_decimal")]
    pub subtotal: String,
    #[serde(deserialize_with = "de_decimal")]
    pub shipping: String,
    #[serde(deserialize_with = "de_decimal")]
    pub total: String,
}

impl From<WireCosts> for OrderCosts {
    fn from(wire: WireCosts) -> Self {
        OrderCosts {
            subtotal: wire.subtotal,
            shipping: wire.shipping,
            total: wire.total,
            currency: wire.currency,
        }
    }
}

/// POST /orders/estimate-costs result
#[derive(Debug, Deserialize)]
pub struct EstimateCostsResult {
    pub costs: WireCosts,
}

/// Order record as returned by /orders and /orders/{id}/confirm
#[derive(Debug, Deserialize)]
pub struct WireOrder {
    pub id: i64,
    pub status: String,
    pub costs: WireCosts,
    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
}

impl WireOrder {
    /// Fold the wire order into the domain record, preferring the recipient
    /// echoed by the API over the caller-side fallback
    pub fn into_order(self, fallback_recipient: Recipient) -> Order {
        Order {
            id: Some(self.id),
            costs: self.costs.into(),
            recipient: self.recipient.unwrap_or(fallback_recipient),
            dashboard_url: self.dashboard_url,
            created_at: Utc::now(),
        }
    }
}
