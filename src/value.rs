//! In-memory clipboard values.

use image::DynamicImage;

/// A value travelling to or from the clipboard.
///
/// Exactly one variant is populated, and it must stay consistent with the
/// [`ClipboardFormat`](crate::ClipboardFormat) it is paired with: `Text` for
/// the text and html formats, `Image` for the image format. `Bytes` is the
/// undifferentiated fallback a caller hands over when it does not know what
/// it holds; the sniffer classifies it.
#[derive(Debug, Clone)]
pub enum ClipboardValue {
    /// UTF-8 text (plain or marked up)
    Text(String),
    /// Decoded raster image
    Image(DynamicImage),
    /// Raw byte blob of unknown provenance
    Bytes(Vec<u8>),
}

impl ClipboardValue {
    /// Borrow as text, if this is the text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ClipboardValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a raster image, if this is the image variant
    pub fn as_image(&self) -> Option<&DynamicImage> {
        match self {
            ClipboardValue::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Borrow as raw bytes, if this is the blob variant
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ClipboardValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Variant name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ClipboardValue::Text(_) => "text",
            ClipboardValue::Image(_) => "image",
            ClipboardValue::Bytes(_) => "bytes",
        }
    }
}

impl From<String> for ClipboardValue {
    fn from(s: String) -> Self {
        ClipboardValue::Text(s)
    }
}

impl From<&str> for ClipboardValue {
    fn from(s: &str) -> Self {
        ClipboardValue::Text(s.to_string())
    }
}

impl From<DynamicImage> for ClipboardValue {
    fn from(img: DynamicImage) -> Self {
        ClipboardValue::Image(img)
    }
}

impl From<Vec<u8>> for ClipboardValue {
    fn from(bytes: Vec<u8>) -> Self {
        ClipboardValue::Bytes(bytes)
    }
}
