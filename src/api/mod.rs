//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_web::web;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::fulfillment::PrintfulClient;
use crate::hosting::ImgHostClient;

/// Application state shared across all handlers
pub struct AppState {
    pub fulfillment: Arc<PrintfulClient>,
    pub image_host: Arc<ImgHostClient>,
}

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/host-image", web::post().to(handlers::hosting::host_image))
            .service(
                web::scope("/printful")
                    .route("/status", web::get().to(handlers::printful::status))
                    .route(
                        "/mockup-task",
                        web::post().to(handlers::printful::create_mockup_task),
                    )
                    .route(
                        "/mockup-task",
                        web::get().to(handlers::printful::poll_mockup_task),
                    )
                    .route(
                        "/shipping-rates",
                        web::post().to(handlers::printful::shipping_rates),
                    )
                    .route(
                        "/estimate-costs",
                        web::post().to(handlers::printful::estimate_costs),
                    )
                    .route("/orders", web::post().to(handlers::printful::create_order))
                    .route(
                        "/orders/{id}/confirm",
                        web::post().to(handlers::printful::confirm_order),
                    ),
            ),
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
}
