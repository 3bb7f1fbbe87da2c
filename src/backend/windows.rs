//! Windows clipboard adapter.
//!
//! Speaks the native wire dialect: CF_UNICODETEXT is UTF-16LE, CF_DIB a raw
//! bitmap, and html travels inside the CF_HTML envelope. Every operation
//! runs inside one scoped exclusive session; `copy` clears the clipboard
//! before writing so stale formats from the previous owner never linger.

use std::cell::Cell;

use crate::backend::session::ClipboardSession;
use crate::backend::RawClipboard;
use crate::cf_html::{self, HtmlPart};
use crate::codec;
use crate::error::{ClipboardError, ClipboardResult};
use crate::formats::{ClipboardFormat, FormatId, FormatTable, HTML_FORMAT_NAME};
use crate::sniff;
use crate::value::ClipboardValue;

/// Adapter over the native Windows clipboard.
#[derive(Debug)]
pub struct WindowsBackend<R: RawClipboard> {
    raw: R,
    depth: Cell<u32>,
    table: FormatTable,
}

impl<R: RawClipboard> WindowsBackend<R> {
    /// Build the adapter, registering the HTML clipboard format once.
    pub fn new(mut raw: R) -> ClipboardResult<Self> {
        let html_id = raw.register_format(HTML_FORMAT_NAME)?;
        Ok(Self {
            raw,
            depth: Cell::new(0),
            table: FormatTable::windows(html_id),
        })
    }

    /// This backend's format table.
    pub fn format_table(&self) -> &FormatTable {
        &self.table
    }

    fn wire_id(&self, format: ClipboardFormat) -> ClipboardResult<FormatId> {
        self.table
            .id(format)
            .cloned()
            .ok_or_else(|| ClipboardError::FormatConversion(format!("no wire identifier for {format}")))
    }

    /// Copy `value`, sniffing the format when none is given.
    pub fn copy(&mut self, value: &ClipboardValue, format: Option<ClipboardFormat>) -> ClipboardResult<()> {
        let format = format.unwrap_or_else(|| sniff::infer(value, ClipboardFormat::Text));
        let id = self.wire_id(format)?;
        let text_id = self.wire_id(ClipboardFormat::Text)?;
        tracing::debug!(%format, %id, "windows clipboard copy");

        let mut session = ClipboardSession::acquire(&mut self.raw, &self.depth)?;
        session.clear()?;
        match format {
            ClipboardFormat::Text => {
                let text = codec::value_text(value)?;
                session.raw_write(&id, &codec::text_to_utf16le(text))
            }
            ClipboardFormat::Html => {
                let html = codec::value_text(value)?;
                let encoded = cf_html::build_envelope(html, None, None, None)?;
                session.raw_write(&id, &encoded.payload)?;
                // same copy must satisfy plain-text paste requests
                session.raw_write(&text_id, &codec::text_to_utf16le(&encoded.plain_text))
            }
            ClipboardFormat::Image => {
                let image = codec::value_image(value)?;
                session.raw_write(&id, &codec::image_to_dib(&image)?)
            }
        }
    }

    /// Paste in `format`; html yields the envelope's fragment slice.
    pub fn paste(&mut self, format: ClipboardFormat) -> ClipboardResult<ClipboardValue> {
        match format {
            ClipboardFormat::Text => {
                let data = self.read_present(format)?;
                Ok(ClipboardValue::Text(codec::utf16le_to_text(&data)?))
            }
            ClipboardFormat::Html => self.paste_html(HtmlPart::Fragment).map(ClipboardValue::Text),
            ClipboardFormat::Image => {
                let data = self.read_present(format)?;
                Ok(ClipboardValue::Image(codec::dib_to_image(&data)?))
            }
        }
    }

    /// Paste html, selecting which envelope part to return.
    pub fn paste_html(&mut self, part: HtmlPart) -> ClipboardResult<String> {
        let data = self.read_present(ClipboardFormat::Html)?;
        cf_html::read_envelope(&data, part)
    }

    /// List the canonical formats on the clipboard.
    pub fn list_formats(&mut self) -> ClipboardResult<Vec<ClipboardFormat>> {
        let mut session = ClipboardSession::acquire(&mut self.raw, &self.depth)?;
        let ids = session.raw_list()?;
        Ok(super::map_listed_formats(&self.table, ids))
    }

    /// Read bytes for `format`, distinguishing empty clipboard from a
    /// clipboard holding other formats.
    fn read_present(&mut self, format: ClipboardFormat) -> ClipboardResult<Vec<u8>> {
        let id = self.wire_id(format)?;
        let mut session = ClipboardSession::acquire(&mut self.raw, &self.depth)?;
        let ids = session.raw_list()?;
        if ids.is_empty() {
            return Err(ClipboardError::Empty);
        }
        if !ids.contains(&id) {
            return Err(ClipboardError::FormatNotPresent(format));
        }
        session.raw_read(&id)
    }
}
