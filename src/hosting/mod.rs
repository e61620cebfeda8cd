//! Image hosting bridge
//!
//! The fulfillment service cannot accept inline image data; every artwork
//! reference it sees must be a publicly fetchable URL. This module uploads
//! locally held bytes to an anonymous image-hosting backend via a multipart
//! request and hands back the resulting HTTPS URL. The URL only needs to
//! outlive the ongoing session; long-term persistence is not promised.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::domain::{ImageAsset, ImageData};

/// Errors raised by the hosting bridge
///
/// Any of these is fatal to a flow that needs a public URL; callers fall
/// back to the simulated track.
#[derive(Error, Debug)]
pub enum HostingError {
    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected: {status} - {message}")]
    UploadFailed { status: u16, message: String },

    #[error("malformed hosting response: {0}")]
    MalformedResponse(String),
}

/// Converts locally held image data into a fetchable public URL
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload the image and return its public URL
    async fn host_image(&self, image: &ImageData) -> Result<Url, HostingError>;
}

/// Expected body from the hosting backend
#[derive(Debug, Deserialize)]
struct HostResponse {
    url: String,
}

/// HTTP client for the anonymous image-hosting backend
///
/// Stateless beyond the remote upload itself.
pub struct ImgHostClient {
    client: reqwest::Client,
    upload_url: String,
}

impl ImgHostClient {
    pub fn new(upload_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("podbridge/1.0")
            .build()
            .expect("Failed to create HTTP client");

        ImgHostClient {
            client,
            upload_url: upload_url.to_string(),
        }
    }

    fn parse_body(body: &str) -> Result<Url, HostingError> {
        let parsed: HostResponse = serde_json::from_str(body)
            .map_err(|e| HostingError::MalformedResponse(format!("{e} - body: {body}")))?;
        Url::parse(&parsed.url)
            .map_err(|e| HostingError::MalformedResponse(format!("bad url '{}': {e}", parsed.url)))
    }
}

#[async_trait]
impl ImageHost for ImgHostClient {
    async fn host_image(&self, image: &ImageData) -> Result<Url, HostingError> {
        let payload = image.payload()?;
        let size = payload.len();

        let part = multipart::Part::bytes(payload)
            .file_name(format!("{}.png", Uuid::new_v4()))
            .mime_str("image/png")
            .map_err(|e| HostingError::InvalidImageData(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        debug!(upload_url = %self.upload_url, bytes = size, "Uploading artwork to image host");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HostingError::UploadFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let url = Self::parse_body(&body)?;
        info!(url = %url, "Artwork hosted");
        Ok(url)
    }
}

impl ImageAsset {
    /// Host the artwork if it has not been hosted yet
    ///
    /// Idempotent: a previously obtained URL is reused without a second
    /// upload.
    pub async fn ensure_hosted(&mut self, host: &dyn ImageHost) -> Result<&Url, HostingError> {
        if self.public_url.is_none() {
            let url = host.host_image(&self.data).await?;
            self.public_url = Some(url);
        }
        // Populated just above if it was absent
        Ok(self.public_url.as_ref().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_parse_body_accepts_url_member() {
        let url = ImgHostClient::parse_body("{\"url\":\"https://h/x.png\"}").unwrap();
        assert_eq!(url.as_str(), "https://h/x.png");
    }

    #[test]
    fn test_parse_body_rejects_missing_url() {
        assert!(matches!(
            ImgHostClient::parse_body("{\"ok\":true}"),
            Err(HostingError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_body_rejects_relative_url() {
        assert!(matches!(
            ImgHostClient::parse_body("{\"url\":\"x.png\"}"),
            Err(HostingError::MalformedResponse(_))
        ));
    }

    struct CountingHost {
        uploads: AtomicU32,
    }

    #[async_trait]
    impl ImageHost for CountingHost {
        async fn host_image(&self, _image: &ImageData) -> Result<Url, HostingError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(Url::parse("https://h/x.png").unwrap())
        }
    }

    #[tokio::test]
    async fn test_ensure_hosted_is_idempotent() {
        let host = CountingHost {
            uploads: AtomicU32::new(0),
        };
        let mut asset = ImageAsset::new(ImageData::Bytes(vec![1, 2, 3]));

        let first = asset.ensure_hosted(&host).await.unwrap().clone();
        let second = asset.ensure_hosted(&host).await.unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(host.uploads.load(Ordering::SeqCst), 1);
    }
}
