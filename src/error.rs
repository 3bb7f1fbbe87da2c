//! Error types for clipboard operations.

use thiserror::Error;

use crate::formats::ClipboardFormat;

/// Result type for clipboard operations
pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Errors that can occur during clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The clipboard holds no data at all
    #[error("the clipboard is empty")]
    Empty,

    /// The clipboard holds data, but not in the requested format
    #[error("the clipboard does not hold {0} data")]
    FormatNotPresent(ClipboardFormat),

    /// Bytes claimed to be UTF-8 are not
    #[error("invalid UTF-8 data")]
    InvalidUtf8,

    /// Bytes claimed to be UTF-16LE are not
    #[error("invalid UTF-16 data")]
    InvalidUtf16,

    /// Image decode error
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Image encode error
    #[error("image encode error: {0}")]
    ImageEncode(String),

    /// A CF_HTML buffer fails the fixed header grammar
    #[error("malformed CF_HTML envelope: {0}")]
    MalformedEnvelope(String),

    /// Envelope construction: the selection is not contained in the fragment
    #[error("selection not found in fragment")]
    SelectionNotFound,

    /// Envelope construction: the fragment is not contained in the context
    #[error("fragment not found in context")]
    FragmentNotFound,

    /// Envelope read: the envelope carries no selection offsets
    #[error("envelope carries no selection offsets")]
    SelectionNotPresent,

    /// Content fails to parse as well-formed markup
    #[error("invalid markup: {0}")]
    InvalidMarkup(String),

    /// Format conversion failed (value variant inconsistent with the format)
    #[error("format conversion failed: {0}")]
    FormatConversion(String),

    /// Backend error (native API call or helper process failed)
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipboardError {
    /// Returns true if this error indicates a format or encoding issue
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::FormatConversion(_)
                | Self::InvalidUtf8
                | Self::InvalidUtf16
                | Self::ImageDecode(_)
                | Self::ImageEncode(_)
                | Self::MalformedEnvelope(_)
                | Self::InvalidMarkup(_)
        )
    }

    /// Returns true if the requested data simply is not on the clipboard
    pub fn is_not_present(&self) -> bool {
        matches!(self, Self::Empty | Self::FormatNotPresent(_))
    }
}
