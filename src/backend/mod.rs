//! Backend adapters and the raw clipboard contract.
//!
//! The platform-I/O collaborator (native API calls on Windows, `xclip` /
//! `wl-copy` style helper processes elsewhere) stays outside this crate; it
//! plugs in through [`RawClipboard`]. The adapters here compose the format
//! table, sniffer and codecs on top of that primitive: one adapter for the
//! Windows wire dialect, one shared by the two MIME-speaking platforms.
//!
//! Backend selection is ordinary control flow: [`create_clipboard`] takes
//! the externally-classified [`Platform`] and returns one variant of the
//! closed [`Clipboard`] enum.

mod mime;
mod session;
mod windows;

pub use mime::MimeBackend;
pub use session::ClipboardSession;
pub use windows::WindowsBackend;

use crate::cf_html::HtmlPart;
use crate::error::ClipboardResult;
use crate::formats::{ClipboardFormat, FormatId, FormatTable};
use crate::value::ClipboardValue;

/// Raw clipboard primitive contract.
///
/// One implementation per platform substrate. Identifiers are MIME strings
/// for the helper-process backends and integer format codes for Windows;
/// the adapter never mixes dialects within one backend.
///
/// `open`/`close` bracket an exclusive session on platforms that have one
/// (Windows). The helper-process backends perform each invocation as its
/// own OS-level transaction, so the defaults are no-ops there.
pub trait RawClipboard {
    /// Open an exclusive clipboard session.
    fn open(&mut self) -> ClipboardResult<()> {
        Ok(())
    }

    /// Close the clipboard session. Infallible: close runs on every exit
    /// path, including error paths that must not mask the original error.
    fn close(&mut self) {}

    /// Register a named clipboard format and return its identifier.
    ///
    /// Windows assigns integer codes at registration; the MIME dialect uses
    /// the name itself, which is what the default does.
    fn register_format(&mut self, name: &str) -> ClipboardResult<FormatId> {
        Ok(FormatId::mime(name))
    }

    /// Enumerate the identifiers currently on the clipboard.
    fn raw_list(&mut self) -> ClipboardResult<Vec<FormatId>>;

    /// Read the raw bytes stored under `id`.
    fn raw_read(&mut self, id: &FormatId) -> ClipboardResult<Vec<u8>>;

    /// Write raw bytes under `id`.
    fn raw_write(&mut self, id: &FormatId, data: &[u8]) -> ClipboardResult<()>;

    /// Clear the clipboard.
    fn clear(&mut self) -> ClipboardResult<()>;
}

/// Clipboard substrate, produced by the external platform classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Native Windows clipboard API
    Windows,
    /// X11 selection via helper process
    X11,
    /// Wayland selection via helper process
    Wayland,
}

/// A clipboard handle for one platform.
///
/// Closed set of backend variants dispatched by `match`; the X11 and
/// Wayland variants share the MIME adapter and differ only in the raw
/// transport behind `R`.
#[derive(Debug)]
pub enum Clipboard<R: RawClipboard> {
    /// Windows native clipboard
    Windows(WindowsBackend<R>),
    /// X11 selection
    X11(MimeBackend<R>),
    /// Wayland selection
    Wayland(MimeBackend<R>),
}

/// Build the clipboard handle for `platform` on top of `raw`.
///
/// The Windows arm registers the HTML clipboard format once, which is the
/// only fallible step.
pub fn create_clipboard<R: RawClipboard>(platform: Platform, raw: R) -> ClipboardResult<Clipboard<R>> {
    match platform {
        Platform::Windows => Ok(Clipboard::Windows(WindowsBackend::new(raw)?)),
        Platform::X11 => Ok(Clipboard::X11(MimeBackend::new(raw))),
        Platform::Wayland => Ok(Clipboard::Wayland(MimeBackend::new(raw))),
    }
}

impl<R: RawClipboard> Clipboard<R> {
    /// The platform this handle was built for.
    pub fn platform(&self) -> Platform {
        match self {
            Clipboard::Windows(_) => Platform::Windows,
            Clipboard::X11(_) => Platform::X11,
            Clipboard::Wayland(_) => Platform::Wayland,
        }
    }

    /// This backend's format table.
    pub fn format_table(&self) -> &FormatTable {
        match self {
            Clipboard::Windows(backend) => backend.format_table(),
            Clipboard::X11(backend) | Clipboard::Wayland(backend) => backend.format_table(),
        }
    }

    /// Copy `value` to the clipboard.
    ///
    /// With `format` absent the sniffer classifies the value (defaulting to
    /// text); an explicit format bypasses the sniffer entirely.
    pub fn copy(&mut self, value: &ClipboardValue, format: Option<ClipboardFormat>) -> ClipboardResult<()> {
        match self {
            Clipboard::Windows(backend) => backend.copy(value, format),
            Clipboard::X11(backend) | Clipboard::Wayland(backend) => backend.copy(value, format),
        }
    }

    /// Paste the clipboard content in `format`.
    ///
    /// For html this returns the fragment slice; [`Clipboard::paste_html`]
    /// exposes the other envelope parts.
    pub fn paste(&mut self, format: ClipboardFormat) -> ClipboardResult<ClipboardValue> {
        match self {
            Clipboard::Windows(backend) => backend.paste(format),
            Clipboard::X11(backend) | Clipboard::Wayland(backend) => backend.paste(format),
        }
    }

    /// Paste html content, selecting which part of the stored document to
    /// return. On the MIME backends the payload is the bare document, so
    /// every part except `Selection` yields the whole string.
    pub fn paste_html(&mut self, part: HtmlPart) -> ClipboardResult<String> {
        match self {
            Clipboard::Windows(backend) => backend.paste_html(part),
            Clipboard::X11(backend) | Clipboard::Wayland(backend) => backend.paste_html(part),
        }
    }

    /// List the canonical formats currently available on the clipboard.
    ///
    /// Identifiers outside the format table are discarded.
    pub fn list_formats(&mut self) -> ClipboardResult<Vec<ClipboardFormat>> {
        match self {
            Clipboard::Windows(backend) => backend.list_formats(),
            Clipboard::X11(backend) | Clipboard::Wayland(backend) => backend.list_formats(),
        }
    }
}

/// Map raw identifiers through the table, dropping anything unrecognized.
fn map_listed_formats(table: &FormatTable, ids: Vec<FormatId>) -> Vec<ClipboardFormat> {
    let mut formats = Vec::new();
    for id in ids {
        match table.format(&id) {
            Some(format) => {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
            None => tracing::debug!(%id, "discarding unrecognized clipboard format id"),
        }
    }
    formats
}
