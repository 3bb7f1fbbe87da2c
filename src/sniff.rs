//! Format sniffer: best-effort classification of untyped clipboard values.

use crate::formats::ClipboardFormat;
use crate::markup;
use crate::value::ClipboardValue;

/// Infer the clipboard format of `value`.
///
/// - images are `Image`;
/// - text is `Html` when it parses as a well-formed document, otherwise `Text`;
/// - byte blobs that decode as UTF-8 follow the text rule, the rest are
///   assumed to be image payloads;
/// - values carrying no signal (empty text, empty blob) fall back to
///   `default`.
///
/// This is a heuristic, not a content-type authority: callers that know the
/// format pass it explicitly and skip the sniffer entirely.
pub fn infer(value: &ClipboardValue, default: ClipboardFormat) -> ClipboardFormat {
    let verdict = match value {
        ClipboardValue::Image(_) => ClipboardFormat::Image,
        ClipboardValue::Text(text) => infer_text(text, default),
        ClipboardValue::Bytes(bytes) => {
            if bytes.is_empty() {
                default
            } else {
                match std::str::from_utf8(bytes) {
                    Ok(text) => infer_text(text, default),
                    Err(_) => ClipboardFormat::Image,
                }
            }
        }
    };
    tracing::trace!(kind = value.kind(), %verdict, "sniffed clipboard format");
    verdict
}

fn infer_text(text: &str, default: ClipboardFormat) -> ClipboardFormat {
    if text.is_empty() {
        default
    } else if markup::is_well_formed(text) {
        ClipboardFormat::Html
    } else {
        ClipboardFormat::Text
    }
}
