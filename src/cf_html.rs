//! Windows CF_HTML envelope codec.
//!
//! CF_HTML wraps an HTML document in a textual header whose fields are byte
//! offsets into the final buffer: `StartHTML`/`EndHTML` bound the document,
//! `StartFragment`/`EndFragment` the copyable unit inside it, and the
//! optional `StartSelection`/`EndSelection` pair a user selection. The
//! header counts itself in every offset it declares, which is why building
//! one takes two passes: render once with zeroed fields to learn the header
//! length, then again with the real values. Offset fields are exactly nine
//! zero-padded decimal digits, so both passes produce the same length.
//!
//! All offsets are **byte** offsets into the UTF-8 buffer. They are computed
//! and sliced as such here; an offset landing inside a multi-byte sequence
//! is a malformed envelope, never a panic.

use crate::error::{ClipboardError, ClipboardResult};
use crate::markup;

/// Version string written into built envelopes.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Largest offset a nine-digit header field can address.
const MAX_OFFSET: usize = 999_999_999;

/// Which slice of an envelope a paste should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlPart {
    /// The full document, `StartHTML..EndHTML`
    FullDocument,
    /// The copyable unit, `StartFragment..EndFragment`
    Fragment,
    /// The user selection, `StartSelection..EndSelection`
    Selection,
    /// The entire decoded buffer, header included
    Raw,
}

/// Selection to embed when building an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// First occurrence of this substring inside the fragment
    Text(&'a str),
    /// Explicit fragment-relative byte range
    Range {
        /// Start byte offset within the fragment
        start: usize,
        /// End byte offset within the fragment
        end: usize,
    },
}

/// Output of [`build_envelope`].
///
/// A CF_HTML write is two clipboard writes: the envelope itself under the
/// registered HTML format, and `plain_text` under the text format so the
/// same copy satisfies plain-text paste requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHtml {
    /// The UTF-8 envelope bytes (header + document)
    pub payload: Vec<u8>,
    /// Plain-text extraction of the document, the companion text payload
    pub plain_text: String,
}

/// Build a CF_HTML envelope around `fragment`.
///
/// When `context` is absent a minimal document is synthesized around the
/// fragment with the conventional `<!--StartFragment-->` markers. When it is
/// given, the fragment must occur inside it verbatim. The context must parse
/// as well-formed markup; its text content becomes
/// [`plain_text`](EncodedHtml::plain_text). Documents whose end offset would
/// not fit the nine-digit header fields are rejected as malformed.
pub fn build_envelope(
    fragment: &str,
    selection: Option<Selection<'_>>,
    context: Option<&str>,
    source_url: Option<&str>,
) -> ClipboardResult<EncodedHtml> {
    let selection = match selection {
        None => None,
        Some(Selection::Text(sub)) => {
            let start = fragment.find(sub).ok_or(ClipboardError::SelectionNotFound)?;
            Some((start, start + sub.len()))
        }
        Some(Selection::Range { start, end }) => {
            let valid = start <= end
                && end <= fragment.len()
                && fragment.is_char_boundary(start)
                && fragment.is_char_boundary(end);
            if !valid {
                return Err(ClipboardError::SelectionNotFound);
            }
            Some((start, end))
        }
    };

    let synthesized;
    let context = match context {
        Some(ctx) => ctx,
        None => {
            synthesized = format!("<html><body><!--StartFragment-->{fragment}<!--EndFragment--></body></html>");
            &synthesized
        }
    };

    let fragment_start = context.find(fragment).ok_or(ClipboardError::FragmentNotFound)?;
    let fragment_end = fragment_start + fragment.len();

    // selection offsets are fragment-relative; translate to document offsets
    let selection = selection.map(|(start, end)| (fragment_start + start, fragment_start + end));

    // pass one: zeroed fields, just to learn the header's own byte length
    let probe = render_header(0, 0, (0, 0), selection.map(|_| (0, 0)), source_url);
    let header_len = probe.len();

    // past this the fields widen and the two passes disagree on length
    if context.len() > MAX_OFFSET - header_len {
        return Err(malformed("document too large for nine-digit offsets"));
    }

    markup::validate(context)?;
    let plain_text = markup::extract_text(context);

    let header = render_header(
        header_len,
        header_len + context.len(),
        (header_len + fragment_start, header_len + fragment_end),
        selection.map(|(start, end)| (header_len + start, header_len + end)),
        source_url,
    );
    debug_assert_eq!(header.len(), header_len, "fixed-width header changed length");

    let mut payload = header.into_bytes();
    payload.extend_from_slice(context.as_bytes());

    tracing::trace!(
        header_len,
        document_len = context.len(),
        fragment_start,
        fragment_end,
        "built CF_HTML envelope"
    );

    Ok(EncodedHtml { payload, plain_text })
}

/// Render the fixed-field header. Offset fields are nine zero-padded digits.
fn render_header(
    start_html: usize,
    end_html: usize,
    fragment: (usize, usize),
    selection: Option<(usize, usize)>,
    source_url: Option<&str>,
) -> String {
    let mut header = format!(
        "Version:{ENVELOPE_VERSION}\r\n\
         StartHTML:{start_html:09}\r\n\
         EndHTML:{end_html:09}\r\n\
         StartFragment:{:09}\r\n\
         EndFragment:{:09}\r\n",
        fragment.0, fragment.1
    );
    if let Some((start, end)) = selection {
        header.push_str(&format!("StartSelection:{start:09}\r\nEndSelection:{end:09}\r\n"));
    }
    if let Some(url) = source_url {
        header.push_str(&format!("SourceURL:{url}\r\n"));
    }
    header
}

/// Parse an envelope and return the requested part as an owned string.
pub fn read_envelope(bytes: &[u8], part: HtmlPart) -> ClipboardResult<String> {
    let envelope = HtmlEnvelope::parse(bytes)?;
    envelope.part(part).map(str::to_string)
}

/// A parsed CF_HTML record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlEnvelope {
    version: String,
    start_html: usize,
    end_html: usize,
    start_fragment: usize,
    end_fragment: usize,
    selection: Option<(usize, usize)>,
    source_url: Option<String>,
    raw: String,
}

impl HtmlEnvelope {
    /// Parse envelope bytes.
    ///
    /// The five required fields must appear, in order, with numeric offsets;
    /// the selection pair and SourceURL may be absent. Trailing NUL padding
    /// (some producers round allocations up) is stripped before offsets are
    /// checked.
    pub fn parse(bytes: &[u8]) -> ClipboardResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| ClipboardError::InvalidUtf8)?;
        let raw = text.trim_end_matches('\0');

        let mut rest = raw;
        let version = required_field(&mut rest, "Version")?.trim().to_string();
        if version.is_empty() {
            return Err(malformed("empty Version header"));
        }
        let start_html = required_offset(&mut rest, "StartHTML")?;
        let end_html = required_offset(&mut rest, "EndHTML")?;
        let start_fragment = required_offset(&mut rest, "StartFragment")?;
        let end_fragment = required_offset(&mut rest, "EndFragment")?;

        let selection = match optional_offset(&mut rest, "StartSelection")? {
            Some(start) => {
                let end = optional_offset(&mut rest, "EndSelection")?
                    .ok_or_else(|| malformed("StartSelection without EndSelection"))?;
                Some((start, end))
            }
            None => None,
        };
        let source_url = take_line(&mut rest, "SourceURL").map(|url| url.trim().to_string());

        let envelope = Self {
            version,
            start_html,
            end_html,
            start_fragment,
            end_fragment,
            selection,
            source_url,
            raw: raw.to_string(),
        };
        envelope.check_offsets()?;
        Ok(envelope)
    }

    /// Envelope version string
    pub fn version(&self) -> &str {
        &self.version
    }

    /// SourceURL header, when present
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Whether the envelope carries selection offsets
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Borrow the requested part of the envelope.
    pub fn part(&self, part: HtmlPart) -> ClipboardResult<&str> {
        match part {
            HtmlPart::Raw => Ok(&self.raw),
            HtmlPart::FullDocument => self.slice(self.start_html, self.end_html),
            HtmlPart::Fragment => self.slice(self.start_fragment, self.end_fragment),
            HtmlPart::Selection => {
                let (start, end) = self.selection.ok_or(ClipboardError::SelectionNotPresent)?;
                self.slice(start, end)
            }
        }
    }

    fn slice(&self, start: usize, end: usize) -> ClipboardResult<&str> {
        self.raw
            .get(start..end)
            .ok_or_else(|| malformed("offset not on a UTF-8 boundary"))
    }

    /// Enforce `0 <= StartHTML <= StartFragment <= EndFragment <= EndHTML <=
    /// buffer length` and, when present, the selection pair inside
    /// `StartHTML..EndHTML`; every offset must land on a UTF-8 boundary.
    fn check_offsets(&self) -> ClipboardResult<()> {
        let ordered = self.start_html <= self.start_fragment
            && self.start_fragment <= self.end_fragment
            && self.end_fragment <= self.end_html
            && self.end_html <= self.raw.len();
        if !ordered {
            return Err(malformed("header offsets out of order"));
        }

        let mut offsets = vec![self.start_html, self.end_html, self.start_fragment, self.end_fragment];
        if let Some((start, end)) = self.selection {
            if !(self.start_html <= start && start <= end && end <= self.end_html) {
                return Err(malformed("selection offsets out of order"));
            }
            offsets.push(start);
            offsets.push(end);
        }
        if offsets.iter().any(|&off| !self.raw.is_char_boundary(off)) {
            return Err(malformed("offset not on a UTF-8 boundary"));
        }
        Ok(())
    }
}

fn malformed(msg: impl Into<String>) -> ClipboardError {
    ClipboardError::MalformedEnvelope(msg.into())
}

/// Consume a `Key:value` line from the front of `rest`, if present.
fn take_line<'a>(rest: &mut &'a str, key: &str) -> Option<&'a str> {
    let after = rest.strip_prefix(key)?.strip_prefix(':')?;
    let (value, remainder) = match after.find('\n') {
        Some(pos) => (&after[..pos], &after[pos + 1..]),
        None => (after, ""),
    };
    *rest = remainder;
    Some(value.trim_end_matches('\r'))
}

fn required_field<'a>(rest: &mut &'a str, key: &str) -> ClipboardResult<&'a str> {
    take_line(rest, key).ok_or_else(|| malformed(format!("missing {key} header")))
}

fn required_offset(rest: &mut &str, key: &str) -> ClipboardResult<usize> {
    let value = required_field(rest, key)?;
    value
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid {key} offset")))
}

fn optional_offset(rest: &mut &str, key: &str) -> ClipboardResult<Option<usize>> {
    match take_line(rest, key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| malformed(format!("invalid {key} offset"))),
    }
}
