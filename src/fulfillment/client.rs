//! Printful API client
//!
//! Production implementation of the `FulfillmentApi` contract against the
//! Printful v1 REST API. The access token is held server-side; client code
//! in the browser only ever talks to this service.
//!
//! API docs: https://developers.printful.com/docs/

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FulfillmentSettings;
use crate::domain::{MockupTask, Order, OrderCosts, ProductKind, Recipient, ShippingRate};
use crate::fulfillment::http_client::RateLimitedClient;
use crate::fulfillment::models::*;
use crate::fulfillment::traits::{FulfillmentApi, FulfillmentError, FulfillmentResult};

/// Printful API client
pub struct PrintfulClient {
    http: RateLimitedClient,
    access_token: Option<String>,
    base_url: String,
}

impl PrintfulClient {
    pub fn new(settings: &FulfillmentSettings) -> Self {
        PrintfulClient {
            http: RateLimitedClient::new(settings.rate_limit_per_minute),
            access_token: settings.access_token.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether an access token is configured
    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    /// Remaining requests in the provider's rate-limit window
    pub fn rate_limit_remaining(&self) -> Option<u32> {
        self.http.remaining_requests()
    }

    fn token(&self) -> FulfillmentResult<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            FulfillmentError::NotConfigured("no fulfillment access token set".to_string())
        })
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> FulfillmentResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FulfillmentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            FulfillmentError::Parse(format!(
                "JSON parse error: {} - body: {}",
                e,
                &text[..text.len().min(500)]
            ))
        })?;
        Ok(envelope.result)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> FulfillmentResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Fulfillment API GET");

        let response = self
            .http
            .execute(self.http.get(&url).bearer_auth(self.token()?))
            .await?;
        Self::parse(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> FulfillmentResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Fulfillment API POST");

        let response = self
            .http
            .execute(self.http.post(&url).bearer_auth(self.token()?).json(body))
            .await?;
        Self::parse(response).await
    }

    fn order_request<'a>(
        recipient: &'a Recipient,
        image_url: &Url,
        product: ProductKind,
    ) -> OrderRequest<'a> {
        let spec = product.placement_spec();
        OrderRequest {
            recipient,
            items: vec![OrderItem {
                variant_id: spec.variant_id,
                quantity: 1,
                files: vec![OrderFile {
                    url: image_url.to_string(),
                }],
            }],
        }
    }
}

#[async_trait]
impl FulfillmentApi for PrintfulClient {
    async fn check_connection(&self) -> bool {
        match self.get::<serde_json::Value>("/products?limit=1").await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Fulfillment connectivity probe failed");
                false
            }
        }
    }

    async fn create_mockup_task(
        &self,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<String> {
        let spec = product.placement_spec();
        let request = CreateMockupTaskRequest {
            variant_ids: vec![spec.variant_id],
            format: "jpg".to_string(),
            files: vec![MockupFile {
                placement: spec.placement.to_string(),
                image_url: image_url.to_string(),
            }],
        };

        let path = format!("/mockup-generator/create-task/{}", spec.product_id);
        let task: WireMockupTask = self.post(&path, &request).await?;

        info!(product = %product, task_key = %task.task_key, "Mockup task created");
        Ok(task.task_key)
    }

    async fn poll_mockup_task(&self, task_key: &str) -> FulfillmentResult<MockupTask> {
        let path = format!("/mockup-generator/task?task_key={task_key}");
        let task: WireMockupTask = self.get(&path).await?;
        Ok(task.into())
    }

    async fn estimate_shipping_rates(
        &self,
        recipient: &Recipient,
        product: ProductKind,
    ) -> FulfillmentResult<Vec<ShippingRate>> {
        let spec = product.placement_spec();
        let request = ShippingRatesRequest {
            recipient,
            items: vec![RateItem {
                variant_id: spec.variant_id,
                quantity: 1,
            }],
        };

        let rates: Vec<WireShippingRate> = self.post("/shipping/rates", &request).await?;
        Ok(rates.into_iter().map(Into::into).collect())
    }

    async fn estimate_order_costs(
        &self,
        recipient: &Recipient,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<OrderCosts> {
        let request = Self::order_request(recipient, image_url, product);
        let result: EstimateCostsResult = self.post("/orders/estimate-costs", &request).await?;
        Ok(result.costs.into())
    }

    async fn create_draft_order(
        &self,
        recipient: &Recipient,
        image_url: &Url,
        product: ProductKind,
    ) -> FulfillmentResult<Order> {
        let request = Self::order_request(recipient, image_url, product);
        let wire: WireOrder = self.post("/orders", &request).await?;

        info!(order_id = wire.id, product = %product, "Draft order created");
        Ok(wire.into_order(recipient.clone()))
    }

    async fn confirm_order(&self, order_id: i64) -> FulfillmentResult<Order> {
        let path = format!("/orders/{order_id}/confirm");
        let wire: WireOrder = self.post(&path, &serde_json::json!({})).await?;

        if wire.status != "pending" && wire.status != "inprocess" {
            warn!(order_id, status = %wire.status, "Unexpected status after confirm");
        }

        info!(order_id, "Order confirmed and queued for manufacturing");
        Ok(wire.into_order(Recipient::default()))
    }
}
