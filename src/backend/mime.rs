//! MIME-typed clipboard adapter, shared by the X11 and Wayland paths.
//!
//! Both substrates already name payloads with MIME types and serve them as
//! plain byte streams, so the adapter is a thin layer over the generic
//! codec: UTF-8 for text and html, PNG for images. There is no envelope
//! and no exclusive session to hold.

use crate::backend::RawClipboard;
use crate::cf_html::HtmlPart;
use crate::codec;
use crate::error::{ClipboardError, ClipboardResult};
use crate::formats::{ClipboardFormat, FormatId, FormatTable};
use crate::sniff;
use crate::value::ClipboardValue;

/// Adapter over a MIME-typed clipboard substrate.
#[derive(Debug)]
pub struct MimeBackend<R: RawClipboard> {
    raw: R,
    table: FormatTable,
}

impl<R: RawClipboard> MimeBackend<R> {
    /// Build the adapter with the canonical MIME table.
    pub fn new(raw: R) -> Self {
        Self {
            raw,
            table: FormatTable::mime(),
        }
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
        tracing::debug!(%format, %id, "mime clipboard copy");

        let bytes = codec::encode(value, format)?;
        self.raw.clear()?;
        self.raw.raw_write(&id, &bytes)
    }

    /// Paste in `format`.
    pub fn paste(&mut self, format: ClipboardFormat) -> ClipboardResult<ClipboardValue> {
        let data = self.read_present(format)?;
        codec::decode(&data, format)
    }

    /// Paste html. MIME payloads carry no offset header, so every part maps
    /// to the whole document except `Selection`, which does not exist here.
    pub fn paste_html(&mut self, part: HtmlPart) -> ClipboardResult<String> {
        if part == HtmlPart::Selection {
            return Err(ClipboardError::SelectionNotPresent);
        }
        let data = self.read_present(ClipboardFormat::Html)?;
        String::from_utf8(data).map_err(|_| ClipboardError::InvalidUtf8)
    }

    /// List the canonical formats on offer.
    pub fn list_formats(&mut self) -> ClipboardResult<Vec<ClipboardFormat>> {
        let ids = self.raw.raw_list()?;
        Ok(super::map_listed_formats(&self.table, ids))
    }

    fn read_present(&mut self, format: ClipboardFormat) -> ClipboardResult<Vec<u8>> {
        let id = self.wire_id(format)?;
        let ids = self.raw.raw_list()?;
        if ids.is_empty() {
            return Err(ClipboardError::Empty);
        }
        if !ids.contains(&id) {
            return Err(ClipboardError::FormatNotPresent(format));
        }
        self.raw.raw_read(&id)
    }
}
