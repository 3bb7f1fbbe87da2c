//! Clipboard formats and per-backend format identifier tables.
//!
//! Every backend speaks its own identifier dialect: MIME-type strings on
//! X11/Wayland, registered or predefined integer codes on Windows. A
//! [`FormatTable`] is the bijection between the canonical [`ClipboardFormat`]
//! set and one backend's identifiers, built once at backend construction and
//! never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Windows Clipboard Format IDs
// =============================================================================

/// Standard Windows clipboard format: Unicode text (UTF-16LE)
pub const CF_UNICODETEXT: u32 = 13;

/// Standard Windows clipboard format: Device-independent bitmap
pub const CF_DIB: u32 = 8;

/// Registered format name for HTML clipboard data.
///
/// The numeric id is assigned by the OS at registration time, so the Windows
/// backend obtains it once at startup via
/// [`RawClipboard::register_format`](crate::backend::RawClipboard::register_format).
pub const HTML_FORMAT_NAME: &str = "HTML Format";

// =============================================================================
// MIME identifiers (X11 / Wayland)
// =============================================================================

/// MIME identifier for plain text
pub const MIME_TEXT: &str = "text/plain";

/// MIME identifier for HTML markup
pub const MIME_HTML: &str = "text/html";

/// MIME identifier for PNG-encoded images
pub const MIME_PNG: &str = "image/png";

// =============================================================================
// Clipboard Format
// =============================================================================

/// Canonical clipboard format set.
///
/// This is the closed set of formats the access layer negotiates; everything
/// a backend announces outside this set is discarded during format listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClipboardFormat {
    /// Plain UTF-8 text
    Text,
    /// HTML markup
    Html,
    /// Raster image
    Image,
}

impl ClipboardFormat {
    /// All formats, in negotiation order
    pub const ALL: [ClipboardFormat; 3] = [ClipboardFormat::Text, ClipboardFormat::Html, ClipboardFormat::Image];

    /// Lowercase name, used in error messages and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipboardFormat::Text => "text",
            ClipboardFormat::Html => "html",
            ClipboardFormat::Image => "image",
        }
    }
}

impl fmt::Display for ClipboardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Format identifiers
// =============================================================================

/// Backend-native identifier for a clipboard format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatId {
    /// MIME-type string (X11, Wayland)
    Mime(String),
    /// Registered or predefined integer format code (Windows)
    Windows(u32),
}

impl FormatId {
    /// Create a MIME identifier
    pub fn mime(mime_type: impl Into<String>) -> Self {
        FormatId::Mime(mime_type.into())
    }

    /// Create a Windows format code identifier
    pub fn windows(code: u32) -> Self {
        FormatId::Windows(code)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatId::Mime(mime) => f.write_str(mime),
            FormatId::Windows(code) => write!(f, "0x{code:04X}"),
        }
    }
}

// =============================================================================
// Format table
// =============================================================================

/// Bijection between [`ClipboardFormat`] and one backend's [`FormatId`]s.
///
/// Both lookup directions are kept as maps; [`FormatTable::insert`] refuses
/// duplicates on either side, so within one table no two formats share an
/// identifier and no two identifiers share a format.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    to_id: HashMap<ClipboardFormat, FormatId>,
    to_format: HashMap<FormatId, ClipboardFormat>,
}

impl FormatTable {
    /// Table for the MIME-speaking backends (X11 and Wayland)
    pub fn mime() -> Self {
        let mut table = Self::default();
        table.insert(ClipboardFormat::Text, FormatId::mime(MIME_TEXT));
        table.insert(ClipboardFormat::Html, FormatId::mime(MIME_HTML));
        table.insert(ClipboardFormat::Image, FormatId::mime(MIME_PNG));
        table
    }

    /// Table for the Windows backend.
    ///
    /// `html_id` is the id the OS assigned when registering
    /// [`HTML_FORMAT_NAME`]; text and image use predefined codes.
    pub fn windows(html_id: FormatId) -> Self {
        let mut table = Self::default();
        table.insert(ClipboardFormat::Text, FormatId::windows(CF_UNICODETEXT));
        table.insert(ClipboardFormat::Image, FormatId::windows(CF_DIB));
        table.insert(ClipboardFormat::Html, html_id);
        table
    }

    /// Insert a mapping. Panics (debug builds) if either side is already taken.
    fn insert(&mut self, format: ClipboardFormat, id: FormatId) {
        let prev_id = self.to_id.insert(format, id.clone());
        let prev_fmt = self.to_format.insert(id, format);
        debug_assert!(prev_id.is_none() && prev_fmt.is_none(), "duplicate format table entry");
    }

    /// Backend identifier for a canonical format
    pub fn id(&self, format: ClipboardFormat) -> Option<&FormatId> {
        self.to_id.get(&format)
    }

    /// Canonical format for a backend identifier
    pub fn format(&self, id: &FormatId) -> Option<ClipboardFormat> {
        self.to_format.get(id).copied()
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    /// Whether the table holds no mappings
    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }
}
