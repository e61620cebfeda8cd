//! Fulfillment API contract
//!
//! Six request/response operations plus a side-effect-free health probe.
//! Each maps directly to one upstream endpoint; retry loops and fallback
//! policy live in the orchestrator, not here.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::domain::{MockupTask, Order, OrderCosts, ProductKind, Recipient, ShippingRate};

/// Fulfillment error types
#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("fulfillment API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("fulfillment not configured: {0}")]
    NotConfigured(String),
}

impl FulfillmentError {
    /// Upstream HTTP status, when the error came from a non-success response
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FulfillmentError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for fulfillment operations
pub type FulfillmentResult<T> = Result<T, FulfillmentError>;

/// Contract for the print-on-demand fulfillment service
///
/// `check_connection` never errors. Everything else surfaces the upstream
/// status and message; which failures are fatal is the caller's decision.
#[async_trait]
pub trait FulfillmentApi: Send + Sync {
    /// Probe a lightweight read-only endpoint. Network or auth failure
    /// yields `false`, never an error.
    async fn check_connection(&self) -> bool;

    /// Submit a mockup generation task for the hosted artwork. Returns the
    /// task key to poll.
    async fn create_mockup_task(
        &self,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<String>;

    /// Single poll of a mockup task. The caller owns the retry loop.
    async fn poll_mockup_task(&self, task_key: &str) -> FulfillmentResult<MockupTask>;

    /// Estimate shipping options. Side-effect free on the remote account.
    async fn estimate_shipping_rates(
        &self,
        recipient: &Recipient,
        product: ProductKind,
    ) -> FulfillmentResult<Vec<ShippingRate>>;

    /// Estimate the full cost breakdown. Side-effect free.
    async fn estimate_order_costs(
        &self,
        recipient: &Recipient,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<OrderCosts>;

    /// Allocate a draft order upstream. Costed but not charged.
    async fn create_draft_order(
        &self,
        recipient: &Recipient,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<Order>;

    /// Charge the configured payment method and queue manufacturing.
    /// Irreversible.
    async fn confirm_order(&self, order_id: i64) -> FulfillmentResult<Order>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_only_for_api_errors() {
        let api = FulfillmentError::Api {
            status: 400,
            message: "bad variant".to_string(),
        };
        assert_eq!(api.http_status(), Some(400));

        let parse = FulfillmentError::Parse("truncated".to_string());
        assert_eq!(parse.http_status(), None);
    }
}
