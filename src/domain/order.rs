//! Order, recipient, and mockup-task records
//!
//! These mirror the shapes the fulfillment API works with, normalized into
//! explicit typed records with required vs. optional fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Countries for which the fulfillment service requires a state/region code
const SUBDIVISION_COUNTRIES: [&str; 4] = ["US", "CA", "AU", "JP"];

/// Recipient validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipientError {
    #[error("recipient field '{0}' must not be empty")]
    MissingField(&'static str),

    #[error("country {0} requires a state/region code")]
    MissingState(String),
}

/// Shipping recipient, validated before any network call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recipient {
    pub name: String,
    pub address1: String,
    pub city: String,
    /// Required only for countries with subdivisions (US, CA, AU, JP)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    pub country_code: String,
    pub zip: String,
}

impl Recipient {
    /// Validate required fields and the subdivision rule
    pub fn validate(&self) -> Result<(), RecipientError> {
        for (field, value) in [
            ("name", &self.name),
            ("address1", &self.address1),
            ("city", &self.city),
            ("country_code", &self.country_code),
            ("zip", &self.zip),
        ] {
            if value.trim().is_empty() {
                return Err(RecipientError::MissingField(field));
            }
        }

        let needs_state = SUBDIVISION_COUNTRIES
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&self.country_code));
        let has_state = self
            .state_code
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        if needs_state && !has_state {
            return Err(RecipientError::MissingState(self.country_code.clone()));
        }

        Ok(())
    }
}

impl Default for Recipient {
    /// Placeholder recipient used for pre-checkout estimates
    fn default() -> Self {
        Recipient {
            name: "Estimate".to_string(),
            address1: "1 Main St".to_string(),
            city: "Los Angeles".to_string(),
            state_code: Some("CA".to_string()),
            country_code: "US".to_string(),
            zip: "90001".to_string(),
        }
    }
}

/// Status of a server-side mockup generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MockupStatus {
    Pending,
    Completed,
    Failed,
}

/// Client-side mirror of a mockup generation task
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MockupTask {
    pub task_key: String,
    pub status: MockupStatus,
    /// Populated once the task completes
    pub result_urls: Vec<String>,
    /// Upstream failure reason, if the task failed
    pub error: Option<String>,
}

/// Shipping option returned by the rate estimate
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippingRate {
    pub id: String,
    pub name: String,
    pub rate: String,
    pub currency: String,
    pub min_days: Option<i32>,
    pub max_days: Option<i32>,
}

/// Order cost breakdown, decimal strings as returned by the fulfillment API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderCosts {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub currency: String,
}

impl OrderCosts {
    /// Fixed placeholder shown before an estimate resolves and on the
    /// simulated track
    pub fn placeholder() -> Self {
        OrderCosts {
            subtotal: "29.99".to_string(),
            shipping: "4.99".to_string(),
            total: "34.98".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// A fulfillment order
///
/// A draft has been created and costed but not charged. `id` is `None` only
/// on the simulated (offline) track, which never allocates a real order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Option<i64>,
    pub costs: OrderCosts,
    pub recipient: Recipient,
    pub dashboard_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Whether this order exists only locally
    pub fn is_simulated(&self) -> bool {
        self.id.is_none()
    }

    /// Build the local stand-in order used on the offline track
    pub fn simulated(recipient: Recipient) -> Self {
        Order {
            id: None,
            costs: OrderCosts::placeholder(),
            recipient,
            dashboard_url: None,
            created_at: Utc::now(),
        }
    }
}
