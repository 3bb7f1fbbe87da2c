//! # crossclip
//!
//! Cross-platform clipboard access with format negotiation.
//!
//! The crate centers on three canonical formats — text, html, and image —
//! and translates each one to the wire dialect of the platform underneath:
//!
//! - **[`ClipboardFormat`] / [`FormatTable`]** - canonical formats and their
//!   per-platform wire identifiers
//! - **[`sniff`]** - infer a format from a value's content
//! - **[`codec`]** - UTF-8 and PNG encoding, plus the Windows UTF-16LE and
//!   DIB wire helpers
//! - **[`cf_html`]** - the CF_HTML envelope with its byte-offset header
//! - **[`RawClipboard`] trait** - the primitive a platform substrate
//!   implements; [`Clipboard`] layers copy/paste/list on top of it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crossclip::{create_clipboard, ClipboardFormat, ClipboardValue, Platform};
//!
//! let mut clipboard = create_clipboard(Platform::Wayland, raw)?;
//!
//! // Format is sniffed from the content: this lands as html.
//! clipboard.copy(&ClipboardValue::from("<b>bold</b>"), None)?;
//!
//! let value = clipboard.paste(ClipboardFormat::Html)?;
//! ```
//!
//! ## Architecture
//!
//! [`RawClipboard`] is deliberately small: open/close, list, read, write,
//! clear, all in raw bytes. Everything format-shaped lives above it, so a
//! substrate implementation never needs to know what CF_HTML or a DIB is.
//! The Windows adapter wraps every operation in a scoped exclusive session;
//! the X11 and Wayland adapters share one MIME-typed code path.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod error;
mod value;

pub mod backend;
pub mod cf_html;
pub mod codec;
pub mod formats;
pub mod markup;
pub mod sniff;

pub use backend::{create_clipboard, Clipboard, ClipboardSession, MimeBackend, Platform, RawClipboard, WindowsBackend};
pub use cf_html::{build_envelope, read_envelope, EncodedHtml, HtmlEnvelope, HtmlPart, Selection};
pub use error::{ClipboardError, ClipboardResult};
pub use formats::{ClipboardFormat, FormatId, FormatTable};
pub use value::ClipboardValue;
