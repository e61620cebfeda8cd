//! Artwork image data
//!
//! Generated artwork arrives either as raw bytes or as a data-URI string.
//! The hosting bridge needs the bare payload bytes, so the encoding envelope
//! is stripped here before anything goes on the wire.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use url::Url;

use crate::hosting::HostingError;

/// Source artwork for the hosting bridge
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Raw image bytes
    Bytes(Vec<u8>),
    /// Self-describing inline encoding, e.g. `data:image/png;base64,...`,
    /// or a bare base64 string
    DataUri(String),
}

impl ImageData {
    /// Extract the payload bytes, stripping any data-URI envelope
    pub fn payload(&self) -> Result<Vec<u8>, HostingError> {
        match self {
            ImageData::Bytes(bytes) => Ok(bytes.clone()),
            ImageData::DataUri(s) => {
                let encoded = if let Some(rest) = s.strip_prefix("data:") {
                    // data:<mime>;base64,<payload>
                    rest.split_once(',')
                        .map(|(_, payload)| payload)
                        .ok_or_else(|| {
                            HostingError::InvalidImageData("data URI has no payload".to_string())
                        })?
                } else {
                    s.as_str()
                };
                BASE64
                    .decode(encoded.trim())
                    .map_err(|e| HostingError::InvalidImageData(e.to_string()))
            }
        }
    }
}

/// A piece of artwork and, once hosted, its public URL
///
/// `public_url` is populated lazily on first need and reused afterwards;
/// re-hosting the same bytes is never required at this layer.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub data: ImageData,
    pub public_url: Option<Url>,
}

impl ImageAsset {
    pub fn new(data: ImageData) -> Self {
        ImageAsset {
            data,
            public_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let data = ImageData::DataUri("data:image/png;base64,AAAA".to_string());
        assert_eq!(data.payload().unwrap(), BASE64.decode("AAAA").unwrap());
    }

    #[test]
    fn test_bare_base64_accepted() {
        let data = ImageData::DataUri("AAAA".to_string());
        assert_eq!(data.payload().unwrap(), vec![0u8, 0, 0]);
    }

    #[test]
    fn test_raw_bytes_pass_through() {
        let data = ImageData::Bytes(vec![1, 2, 3]);
        assert_eq!(data.payload().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_data_uri_without_comma_rejected() {
        let data = ImageData::DataUri("data:image/png;base64".to_string());
        assert!(matches!(
            data.payload(),
            Err(HostingError::InvalidImageData(_))
        ));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let data = ImageData::DataUri("data:image/png;base64,!!!".to_string());
        assert!(matches!(
            data.payload(),
            Err(HostingError::InvalidImageData(_))
        ));
    }
}
