//! Headshot download and content-type sniffing.

use reqwest::Url;

use crate::client::{redact_api_key, BylineClient};
use crate::error::ScraperError;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Image formats the backfill flow will write to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    /// File extension used for the stored headshot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Identifies the format from the leading bytes of `body`.
    ///
    /// The declared `Content-Type` is not trusted; CDNs routinely serve
    /// headshots as `application/octet-stream`.
    #[must_use]
    pub fn sniff(body: &[u8]) -> Option<Self> {
        if body.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if body.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

/// A downloaded headshot whose format has been confirmed.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

impl DownloadedImage {
    /// `<name>.<ext>` for this image.
    #[must_use]
    pub fn file_name(&self, journalist_name: &str) -> String {
        format!("{journalist_name}.{}", self.image_type.extension())
    }
}

/// Downloads the image at `url` and confirms it is a JPEG or PNG.
///
/// # Errors
///
/// - [`ScraperError::UnsupportedImage`] if the body is neither format.
/// - Any error from [`BylineClient::fetch_bytes`].
pub async fn download_image(
    client: &BylineClient,
    url: &Url,
) -> Result<DownloadedImage, ScraperError> {
    let (bytes, content_type) = client.fetch_bytes(url).await?;
    let Some(image_type) = ImageType::sniff(&bytes) else {
        return Err(ScraperError::UnsupportedImage {
            content_type: content_type.unwrap_or_else(|| "unknown".to_owned()),
            url: redact_api_key(url),
        });
    };
    tracing::debug!(url = %url, mime = image_type.mime(), size = bytes.len(), "downloaded image");
    Ok(DownloadedImage { image_type, bytes })
}
