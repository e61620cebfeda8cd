//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    hosting::{HostErrorResponse, HostImageRequest, HostImageResponse},
    printful::{
        CreateMockupTaskRequest, FulfillmentErrorResponse, OrderRequest, RatesRequest,
        StatusResponse, TaskKeyResponse,
    },
};
use crate::domain::{
    MockupStatus, MockupTask, Order, OrderCosts, ProductKind, Recipient, ShippingRate,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Podbridge API",
        version = "1.0.0",
        description = "Artwork hosting and print-on-demand order workflow service",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health endpoints"),
        (name = "hosting", description = "Public image hosting bridge"),
        (name = "fulfillment", description = "Authenticated fulfillment pass-through")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::hosting::host_image,
        crate::api::handlers::printful::status,
        crate::api::handlers::printful::create_mockup_task,
        crate::api::handlers::printful::poll_mockup_task,
        crate::api::handlers::printful::shipping_rates,
        crate::api::handlers::printful::estimate_costs,
        crate::api::handlers::printful::create_order,
        crate::api::handlers::printful::confirm_order,
    ),
    components(
        schemas(
            // Health schemas
            HealthResponse,
            // Hosting schemas
            HostImageRequest,
            HostImageResponse,
            HostErrorResponse,
            // Fulfillment schemas
            StatusResponse,
            CreateMockupTaskRequest,
            TaskKeyResponse,
            RatesRequest,
            OrderRequest,
            FulfillmentErrorResponse,
            // Domain schemas
            ProductKind,
            Recipient,
            MockupTask,
            MockupStatus,
            ShippingRate,
            OrderCosts,
            Order,
        )
    )
)]
pub struct ApiDoc;
