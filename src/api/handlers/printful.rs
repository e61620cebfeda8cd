//! Authenticated pass-through endpoints for the fulfillment API
//!
//! The wizard client cannot hold the fulfillment credential; these handlers
//! accept credential-free requests, attach the server-side token through the
//! typed client, and relay the upstream result. Non-success upstream
//! responses keep their status code; transport failures map to 502.

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::domain::{ProductKind, Recipient};
use crate::fulfillment::{FulfillmentApi, FulfillmentError};

/// Error response relayed for fulfillment failures
#[derive(Serialize, ToSchema)]
pub struct FulfillmentErrorResponse {
    pub error: String,
}

/// Connectivity and rate-limit status
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub connected: bool,
    pub rate_limit_remaining: Option<u32>,
}

/// Request body for mockup task creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMockupTaskRequest {
    pub image_url: String,
    pub product: ProductKind,
}

/// Response with the key of the created mockup task
#[derive(Serialize, ToSchema)]
pub struct TaskKeyResponse {
    pub task_key: String,
}

/// Query parameters for mockup task polling
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub task_key: String,
}

/// Request body for shipping-rate estimates
#[derive(Debug, Deserialize, ToSchema)]
pub struct RatesRequest {
    pub recipient: Recipient,
    pub product: ProductKind,
}

/// Request body for cost estimates and order creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderRequest {
    pub recipient: Recipient,
    pub image_url: String,
    pub product: ProductKind,
}

fn fulfillment_error(e: &FulfillmentError) -> HttpResponse {
    error!(error = %e, "Fulfillment request failed");
    let status = e
        .http_status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    HttpResponse::build(status).json(FulfillmentErrorResponse {
        error: e.to_string(),
    })
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(FulfillmentErrorResponse { error: message })
}

fn parse_image_url(raw: &str) -> Result<Url, HttpResponse> {
    Url::parse(raw).map_err(|e| bad_request(format!("invalid image_url: {e}")))
}

/// GET /api/printful/status - Connectivity probe
#[utoipa::path(
    get,
    path = "/api/printful/status",
    tag = "fulfillment",
    responses(
        (status = 200, description = "Probe result", body = StatusResponse)
    )
)]
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let connected = state.fulfillment.check_connection().await;
    HttpResponse::Ok().json(StatusResponse {
        connected,
        rate_limit_remaining: state.fulfillment.rate_limit_remaining(),
    })
}

/// POST /api/printful/mockup-task - Create a mockup generation task
#[utoipa::path(
    post,
    path = "/api/printful/mockup-task",
    tag = "fulfillment",
    request_body = CreateMockupTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskKeyResponse),
        (status = 400, description = "Invalid request", body = FulfillmentErrorResponse),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn create_mockup_task(
    state: web::Data<AppState>,
    body: web::Json<CreateMockupTaskRequest>,
) -> HttpResponse {
    let image_url = match parse_image_url(&body.image_url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    match state
        .fulfillment
        .create_mockup_task(&image_url, body.product)
        .await
    {
        Ok(task_key) => HttpResponse::Ok().json(TaskKeyResponse { task_key }),
        Err(e) => fulfillment_error(&e),
    }
}

/// GET /api/printful/mockup-task - Poll a mockup generation task
#[utoipa::path(
    get,
    path = "/api/printful/mockup-task",
    tag = "fulfillment",
    params(
        ("task_key" = String, Query, description = "Key of the task to poll")
    ),
    responses(
        (status = 200, description = "Current task state", body = crate::domain::MockupTask),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn poll_mockup_task(
    state: web::Data<AppState>,
    query: web::Query<TaskQuery>,
) -> HttpResponse {
    match state.fulfillment.poll_mockup_task(&query.task_key).await {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(e) => fulfillment_error(&e),
    }
}

/// POST /api/printful/shipping-rates - Estimate shipping options
#[utoipa::path(
    post,
    path = "/api/printful/shipping-rates",
    tag = "fulfillment",
    request_body = RatesRequest,
    responses(
        (status = 200, description = "Available rates", body = [crate::domain::ShippingRate]),
        (status = 400, description = "Invalid recipient", body = FulfillmentErrorResponse),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn shipping_rates(
    state: web::Data<AppState>,
    body: web::Json<RatesRequest>,
) -> HttpResponse {
    if let Err(e) = body.recipient.validate() {
        return bad_request(e.to_string());
    }

    match state
        .fulfillment
        .estimate_shipping_rates(&body.recipient, body.product)
        .await
    {
        Ok(rates) => HttpResponse::Ok().json(rates),
        Err(e) => fulfillment_error(&e),
    }
}

/// POST /api/printful/estimate-costs - Estimate the full cost breakdown
#[utoipa::path(
    post,
    path = "/api/printful/estimate-costs",
    tag = "fulfillment",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Cost breakdown", body = crate::domain::OrderCosts),
        (status = 400, description = "Invalid request", body = FulfillmentErrorResponse),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn estimate_costs(
    state: web::Data<AppState>,
    body: web::Json<OrderRequest>,
) -> HttpResponse {
    if let Err(e) = body.recipient.validate() {
        return bad_request(e.to_string());
    }
    let image_url = match parse_image_url(&body.image_url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    match state
        .fulfillment
        .estimate_order_costs(&body.recipient, &image_url, body.product)
        .await
    {
        Ok(costs) => HttpResponse::Ok().json(costs),
        Err(e) => fulfillment_error(&e),
    }
}

/// POST /api/printful/orders - Create a draft order (costed, not charged)
#[utoipa::path(
    post,
    path = "/api/printful/orders",
    tag = "fulfillment",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Draft order", body = crate::domain::Order),
        (status = 400, description = "Invalid request", body = FulfillmentErrorResponse),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn create_order(state: web::Data<AppState>, body: web::Json<OrderRequest>) -> HttpResponse {
    if let Err(e) = body.recipient.validate() {
        return bad_request(e.to_string());
    }
    let image_url = match parse_image_url(&body.image_url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    match state
        .fulfillment
        .create_draft_order(&body.recipient, &image_url, body.product)
        .await
    {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(e) => fulfillment_error(&e),
    }
}

/// POST /api/printful/orders/{id}/confirm - Charge and queue for manufacturing
#[utoipa::path(
    post,
    path = "/api/printful/orders/{id}/confirm",
    tag = "fulfillment",
    params(
        ("id" = i64, Path, description = "Draft order id")
    ),
    responses(
        (status = 200, description = "Confirmed order", body = crate::domain::Order),
        (status = 502, description = "Upstream failure", body = FulfillmentErrorResponse)
    )
)]
pub async fn confirm_order(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match state.fulfillment.confirm_order(path.into_inner()).await {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(e) => fulfillment_error(&e),
    }
}
