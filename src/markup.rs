//! Minimal markup well-formedness scanner and plain-text extraction.
//!
//! The sniffer needs a yes/no answer to "does this string parse as a
//! document?", and the CF_HTML builder needs the plain-text content of a
//! context document for the companion text payload. Neither needs a DOM, so
//! this is a single-pass tag-balance scanner rather than a full parser.
//!
//! The rules are XML-strict with one HTML concession: void elements
//! (`<br>`, `<img>`, ...) do not require a closing tag. A document is one
//! root element, optionally surrounded by comments, declarations and
//! processing instructions; bare text outside the root is rejected.

use crate::error::{ClipboardError, ClipboardResult};

/// HTML elements that never carry content and need no closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Check whether `input` parses as a well-formed document.
pub fn is_well_formed(input: &str) -> bool {
    validate(input).is_ok()
}

/// Validate `input` as a well-formed document.
pub fn validate(input: &str) -> ClipboardResult<()> {
    scan(input, None)
}

/// Extract the plain-text content of `input`.
///
/// Text runs inside elements are concatenated with character references
/// decoded; tags, comments and declarations contribute nothing. Callers
/// validate first; on malformed input this returns whatever text preceded
/// the offending construct.
pub fn extract_text(input: &str) -> String {
    let mut out = String::new();
    let _ = scan(input, Some(&mut out));
    out
}

/// Single scanner behind [`validate`] and [`extract_text`].
fn scan(input: &str, mut sink: Option<&mut String>) -> ClipboardResult<()> {
    let mut rest = input;
    let mut stack: Vec<String> = Vec::new();
    let mut seen_root = false;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let (_, after) = split_past(after, "-->", "unterminated comment")?;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("<![CDATA[") {
            let (content, after) = split_past(after, "]]>", "unterminated CDATA section")?;
            if stack.is_empty() {
                return Err(invalid("CDATA section outside document element"));
            }
            if let Some(out) = sink.as_mut() {
                out.push_str(content);
            }
            rest = after;
        } else if let Some(after) = rest.strip_prefix("<!") {
            let (_, after) = split_past(after, ">", "unterminated declaration")?;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("<?") {
            let (_, after) = split_past(after, "?>", "unterminated processing instruction")?;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("</") {
            let (name, after) = parse_name(after)?;
            let after = after
                .trim_start()
                .strip_prefix('>')
                .ok_or_else(|| invalid("malformed closing tag"))?;
            let name = name.to_ascii_lowercase();
            match stack.pop() {
                Some(open) if open == name => {}
                Some(open) => return Err(invalid(format!("closing tag </{name}> does not match <{open}>"))),
                None => return Err(invalid(format!("closing tag </{name}> with no open element"))),
            }
            rest = after;
        } else if let Some(after) = rest.strip_prefix('<') {
            let (name, after) = parse_name(after)?;
            let (self_closed, after) = skip_attributes(after)?;
            if stack.is_empty() {
                if seen_root {
                    return Err(invalid("content after document element"));
                }
                seen_root = true;
            }
            let name = name.to_ascii_lowercase();
            if !self_closed && !VOID_ELEMENTS.contains(&name.as_str()) {
                stack.push(name);
            }
            rest = after;
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let (chunk, after) = rest.split_at(end);
            if stack.is_empty() && !chunk.trim().is_empty() {
                return Err(invalid(if seen_root {
                    "content after document element"
                } else {
                    "text before document element"
                }));
            }
            if let Some(out) = sink.as_mut() {
                if !stack.is_empty() {
                    push_decoded(out, chunk);
                }
            }
            rest = after;
        }
    }

    if let Some(open) = stack.pop() {
        return Err(invalid(format!("unclosed element <{open}>")));
    }
    if !seen_root {
        return Err(invalid("no document element"));
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ClipboardError {
    ClipboardError::InvalidMarkup(msg.into())
}

/// Split `rest` at the first occurrence of `delim`, consuming the delimiter.
fn split_past<'a>(rest: &'a str, delim: &str, msg: &str) -> ClipboardResult<(&'a str, &'a str)> {
    match rest.find(delim) {
        Some(pos) => Ok((&rest[..pos], &rest[pos + delim.len()..])),
        None => Err(invalid(msg)),
    }
}

/// Parse an element name at the start of `rest`.
fn parse_name(rest: &str) -> ClipboardResult<(&str, &str)> {
    let mut end = 0;
    for (i, c) in rest.char_indices() {
        let name_char = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
        };
        if !name_char {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == 0 {
        return Err(invalid("expected element name after '<'"));
    }
    Ok((&rest[..end], &rest[end..]))
}

/// Skip the attribute section of a start tag, honouring quoted values.
///
/// Returns whether the tag was explicitly self-closed and the input after
/// the terminating `>`.
fn skip_attributes(rest: &str) -> ClipboardResult<(bool, &str)> {
    let mut chars = rest.char_indices();
    let mut self_closed = false;

    while let Some((i, c)) = chars.next() {
        match c {
            '>' => return Ok((self_closed, &rest[i + 1..])),
            '"' | '\'' => {
                let quote = c;
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == quote {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(invalid("unterminated attribute value"));
                }
                self_closed = false;
            }
            '/' => self_closed = true,
            c if c.is_whitespace() => {}
            _ => self_closed = false,
        }
    }

    Err(invalid("unterminated start tag"))
}

/// Append `chunk` to `out` with character references decoded.
fn push_decoded(out: &mut String, chunk: &str) {
    let mut rest = chunk;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // references are short; a distant semicolon is not one
        match rest.find(';') {
            Some(semi) if (2..=12).contains(&semi) => match decode_reference(&rest[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &rest[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

/// Decode a character reference body (without `&` and `;`).
fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{A0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let cp = if let Some(hex) = num.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                num.parse().ok()?
            };
            char::from_u32(cp)
        }
    }
}
