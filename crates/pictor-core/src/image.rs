//! Opaque image payload handles.
//!
//! Pixel decoding, format conversion, and file I/O belong to the host
//! and its codec library. The types here only carry enough information
//! to reference an image across the backend/browser boundary: either
//! an inline encoded payload (rendered as a `data:` URL) or a record
//! pointing into one of the host's storage folders.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};

use crate::fingerprint::Fingerprint;

/// Container format of an inline image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Returns the IANA media type for this format.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Resolves a media type string back to a format.
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Host storage folder a stored image lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StorageFolder {
    Input,
    Output,
    Temp,
}

/// Reference to a single image payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHandle {
    /// Encoded bytes carried inline, pushed to the browser as a
    /// `data:` URL.
    Inline { format: ImageFormat, bytes: Bytes },
    /// A file the host has already persisted; the browser fetches it
    /// through the host's view endpoint.
    Stored {
        filename: String,
        subfolder: String,
        folder: StorageFolder,
    },
}

impl ImageHandle {
    /// Creates an inline handle from encoded bytes.
    pub fn inline(format: ImageFormat, bytes: impl Into<Bytes>) -> Self {
        Self::Inline {
            format,
            bytes: bytes.into(),
        }
    }

    /// Creates a stored handle pointing into a host folder.
    pub fn stored(
        filename: impl Into<String>,
        subfolder: impl Into<String>,
        folder: StorageFolder,
    ) -> Self {
        Self::Stored {
            filename: filename.into(),
            subfolder: subfolder.into(),
            folder,
        }
    }

    /// Renders an inline handle as a `data:` URL.
    ///
    /// Returns `None` for stored handles, which the browser addresses
    /// by filename instead.
    #[must_use]
    pub fn to_data_url(&self) -> Option<String> {
        match self {
            Self::Inline { format, bytes } => Some(format!(
                "data:{};base64,{}",
                format.media_type(),
                BASE64.encode(bytes)
            )),
            Self::Stored { .. } => None,
        }
    }

    /// Parses a `data:<media-type>;base64,<payload>` URL.
    ///
    /// Bare base64 (no `data:` prefix) is accepted and assumed to be
    /// PNG, matching what browsers post for canvas exports.
    pub fn from_data_url(url: &str) -> Result<Self, DataUrlError> {
        let (format, b64) = match url.strip_prefix("data:") {
            Some(rest) => {
                let (media_type, payload) = rest
                    .split_once(";base64,")
                    .ok_or(DataUrlError::MissingBase64Marker)?;
                let format = ImageFormat::from_media_type(media_type)
                    .ok_or_else(|| DataUrlError::UnsupportedMediaType(media_type.to_owned()))?;
                (format, payload)
            }
            None => (ImageFormat::Png, url),
        };

        let bytes = BASE64.decode(b64).map_err(DataUrlError::Decode)?;
        Ok(Self::inline(format, bytes))
    }

    /// Returns the JSON value pushed to the browser to display this
    /// image.
    #[must_use]
    pub fn to_preview_value(&self) -> Value {
        match self {
            Self::Inline { .. } => json!({
                "imageData": self.to_data_url(),
            }),
            Self::Stored {
                filename,
                subfolder,
                folder,
            } => json!({
                "filename": filename,
                "subfolder": subfolder,
                "type": folder.to_string(),
            }),
        }
    }

    /// Feeds this handle's identity into a fingerprint hasher.
    pub(crate) fn digest_into(&self, hasher: &mut Sha256) {
        match self {
            Self::Inline { format, bytes } => {
                hasher.update(b"inline");
                hasher.update(format.media_type().as_bytes());
                hasher.update(bytes);
            }
            Self::Stored {
                filename,
                subfolder,
                folder,
            } => {
                hasher.update(b"stored");
                hasher.update(filename.as_bytes());
                hasher.update(subfolder.as_bytes());
                hasher.update(folder.to_string().as_bytes());
            }
        }
    }
}

/// Errors from parsing browser-posted `data:` URLs.
#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    /// The URL has a `data:` prefix but no `;base64,` marker.
    #[error("data url is missing the base64 marker")]
    MissingBase64Marker,

    /// The media type is not an image format this suite carries.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The base64 payload failed to decode.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// An ordered batch of images with shared logical dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageBatch {
    width: u32,
    height: u32,
    items: Vec<ImageHandle>,
}

impl ImageBatch {
    /// Creates a batch from handles sharing the given dimensions.
    pub fn new(width: u32, height: u32, items: impl Into<Vec<ImageHandle>>) -> Self {
        Self {
            width,
            height,
            items: items.into(),
        }
    }

    /// Creates a batch holding a single image.
    pub fn single(width: u32, height: u32, item: ImageHandle) -> Self {
        Self::new(width, height, vec![item])
    }

    /// Logical width of every image in the batch.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Logical height of every image in the batch.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of images in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the handle at `index`, if in bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ImageHandle> {
        self.items.get(index)
    }

    /// Iterates over the handles in order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.items.iter()
    }

    /// Content fingerprint over dimensions and every handle in order.
    ///
    /// Two batches fingerprint equal iff the browser would be shown
    /// the same pixels; a changed input invalidates cached rendezvous
    /// results.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for item in &self.items {
            item.digest_into(&mut hasher);
        }
        Fingerprint::from_hasher(hasher)
    }

    /// Preview values for every image, in order.
    #[must_use]
    pub fn to_preview_values(&self) -> Vec<Value> {
        self.items.iter().map(ImageHandle::to_preview_value).collect()
    }
}

impl From<ImageBatch> for Vec<ImageHandle> {
    fn from(batch: ImageBatch) -> Self {
        batch.items
    }
}
