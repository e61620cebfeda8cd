//! Image hosting endpoint
//!
//! Accepts inline-encoded artwork from the wizard client and bridges it to
//! a public URL via the hosting backend.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::domain::ImageData;
use crate::hosting::{HostingError, ImageHost};

/// Request body for image hosting
#[derive(Debug, Deserialize, ToSchema)]
pub struct HostImageRequest {
    /// Data-URI or bare base64 image payload
    pub base64: String,
}

/// Response with the public URL of the hosted image
#[derive(Serialize, ToSchema)]
pub struct HostImageResponse {
    pub url: String,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct HostErrorResponse {
    pub error: String,
}

/// POST /api/host-image - Host an inline image at a public URL
#[utoipa::path(
    post,
    path = "/api/host-image",
    tag = "hosting",
    request_body = HostImageRequest,
    responses(
        (status = 200, description = "Image hosted", body = HostImageResponse),
        (status = 400, description = "Invalid image payload", body = HostErrorResponse),
        (status = 502, description = "Hosting backend failure", body = HostErrorResponse)
    )
)]
pub async fn host_image(
    state: web::Data<AppState>,
    body: web::Json<HostImageRequest>,
) -> HttpResponse {
    let data = ImageData::DataUri(body.into_inner().base64);

    match state.image_host.host_image(&data).await {
        Ok(url) => HttpResponse::Ok().json(HostImageResponse {
            url: url.to_string(),
        }),
        Err(e @ HostingError::InvalidImageData(_)) => {
            error!(error = %e, "Rejected image payload");
            HttpResponse::BadRequest().json(HostErrorResponse {
                error: e.to_string(),
            })
        }
        Err(e) => {
            error!(error = %e, "Image hosting failed");
            HttpResponse::BadGateway().json(HostErrorResponse {
                error: e.to_string(),
            })
        }
    }
}
