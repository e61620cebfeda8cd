//! Podbridge service binary
//!
//! Serves the authenticated proxy layer between the wizard client and the
//! fulfillment provider, plus the image hosting bridge. The fulfillment
//! credential is loaded from configuration here and never leaves the server.

use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use podbridge::api::{self, AppState};
use podbridge::config::Settings;
use podbridge::fulfillment::PrintfulClient;
use podbridge::hosting::ImgHostClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("podbridge=info".parse().unwrap())
                .add_directive("actix_web=info".parse().unwrap()),
        )
        .json()
        .init();

    let settings = Settings::load().expect("Failed to load configuration");
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting podbridge v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    let fulfillment = Arc::new(PrintfulClient::new(&settings.fulfillment));
    if !fulfillment.is_configured() {
        warn!("No fulfillment access token configured; connectivity probes will report offline");
    }
    let image_host = Arc::new(ImgHostClient::new(&settings.hosting.upload_url));

    let app_state = web::Data::new(AppState {
        fulfillment,
        image_host,
    });

    let workers = settings.server.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "podbridge"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION"))),
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
