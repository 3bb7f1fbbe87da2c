//! End-to-end clipboard scenarios over an in-memory raw backend.

use std::collections::HashMap;

use crossclip::formats::{CF_DIB, CF_UNICODETEXT, HTML_FORMAT_NAME, MIME_HTML, MIME_PNG, MIME_TEXT};
use crossclip::{
    create_clipboard, ClipboardError, ClipboardFormat, ClipboardResult, ClipboardValue, FormatId, HtmlPart, Platform,
    RawClipboard,
};

const HTML_ID: u32 = 0xC100;

/// In-memory raw clipboard, usable for either wire dialect.
#[derive(Debug, Default)]
struct MemoryRaw {
    windows_dialect: bool,
    store: HashMap<FormatId, Vec<u8>>,
    open_now: bool,
}

impl MemoryRaw {
    fn windows() -> Self {
        Self {
            windows_dialect: true,
            ..Self::default()
        }
    }
}

impl RawClipboard for MemoryRaw {
    fn open(&mut self) -> ClipboardResult<()> {
        assert!(!self.open_now, "nested raw open");
        self.open_now = true;
        Ok(())
    }

    fn close(&mut self) {
        assert!(self.open_now, "close without open");
        self.open_now = false;
    }

    fn register_format(&mut self, name: &str) -> ClipboardResult<FormatId> {
        if self.windows_dialect {
            assert_eq!(name, HTML_FORMAT_NAME);
            Ok(FormatId::windows(HTML_ID))
        } else {
            Ok(FormatId::mime(name))
        }
    }

    fn raw_list(&mut self) -> ClipboardResult<Vec<FormatId>> {
        if self.windows_dialect {
            assert!(self.open_now, "raw call outside session");
        }
        Ok(self.store.keys().cloned().collect())
    }

    fn raw_read(&mut self, id: &FormatId) -> ClipboardResult<Vec<u8>> {
        if self.windows_dialect {
            assert!(self.open_now, "raw call outside session");
        }
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| ClipboardError::Backend(format!("nothing stored under {id}")))
    }

    fn raw_write(&mut self, id: &FormatId, data: &[u8]) -> ClipboardResult<()> {
        if self.windows_dialect {
            assert!(self.open_now, "raw call outside session");
        }
        self.store.insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> ClipboardResult<()> {
        self.store.clear();
        Ok(())
    }
}

fn sample_image() -> image::DynamicImage {
    let mut img = image::RgbaImage::new(3, 2);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = image::Rgba([x as u8 * 40, y as u8 * 90, 200, 255]);
    }
    image::DynamicImage::ImageRgba8(img)
}

#[test]
fn test_sniffed_html_copy_on_wayland() {
    let mut clipboard = create_clipboard(Platform::Wayland, MemoryRaw::default()).unwrap();
    clipboard.copy(&ClipboardValue::from("<p>Hi</p>"), None).unwrap();

    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Html]);
    let value = clipboard.paste(ClipboardFormat::Html).unwrap();
    assert_eq!(value.as_text(), Some("<p>Hi</p>"));
}

#[test]
fn test_sniffer_falls_back_to_text_for_broken_markup() {
    let mut clipboard = create_clipboard(Platform::X11, MemoryRaw::default()).unwrap();
    clipboard.copy(&ClipboardValue::from("3 < 4 and <b>oops"), None).unwrap();

    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Text]);
}

#[test]
fn test_explicit_format_bypasses_sniffer() {
    let mut clipboard = create_clipboard(Platform::X11, MemoryRaw::default()).unwrap();
    // html-shaped content pinned to the text format
    clipboard
        .copy(&ClipboardValue::from("<p>Hi</p>"), Some(ClipboardFormat::Text))
        .unwrap();

    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Text]);
    assert_eq!(
        clipboard.paste(ClipboardFormat::Text).unwrap().as_text(),
        Some("<p>Hi</p>")
    );
}

#[test]
fn test_format_not_present_is_not_empty() {
    let mut clipboard = create_clipboard(Platform::Wayland, MemoryRaw::default()).unwrap();

    assert!(matches!(clipboard.paste(ClipboardFormat::Image), Err(ClipboardError::Empty)));

    clipboard.copy(&ClipboardValue::from("words"), None).unwrap();
    match clipboard.paste(ClipboardFormat::Image) {
        Err(ClipboardError::FormatNotPresent(ClipboardFormat::Image)) => {}
        other => panic!("expected FormatNotPresent(Image), got {other:?}"),
    }
}

#[test]
fn test_image_roundtrip_png_on_x11() {
    let img = sample_image();
    let mut clipboard = create_clipboard(Platform::X11, MemoryRaw::default()).unwrap();
    clipboard.copy(&ClipboardValue::Image(img.clone()), None).unwrap();

    let value = clipboard.paste(ClipboardFormat::Image).unwrap();
    let pasted = value.as_image().unwrap();
    assert_eq!(pasted.to_rgba8().into_raw(), img.to_rgba8().into_raw());
}

#[test]
fn test_bytes_value_sniffed_by_content() {
    let mut clipboard = create_clipboard(Platform::Wayland, MemoryRaw::default()).unwrap();

    // UTF-8 bytes that parse as markup land as html
    clipboard
        .copy(&ClipboardValue::Bytes(b"<i>x</i>".to_vec()), None)
        .unwrap();
    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Html]);

    // non-UTF-8 bytes are treated as an image payload
    let png = crossclip::codec::encode_png(&sample_image()).unwrap();
    clipboard.copy(&ClipboardValue::Bytes(png), None).unwrap();
    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Image]);
    assert!(clipboard.paste(ClipboardFormat::Image).is_ok());
}

#[test]
fn test_windows_html_copy_full_surface() {
    let mut clipboard = create_clipboard(Platform::Windows, MemoryRaw::windows()).unwrap();
    clipboard.copy(&ClipboardValue::from("<p>Hello <b>world</b></p>"), None).unwrap();

    let mut formats = clipboard.list_formats().unwrap();
    formats.sort();
    assert_eq!(formats, vec![ClipboardFormat::Text, ClipboardFormat::Html]);

    // fragment comes back byte-identical through the envelope
    assert_eq!(
        clipboard.paste(ClipboardFormat::Html).unwrap().as_text(),
        Some("<p>Hello <b>world</b></p>")
    );
    assert_eq!(
        clipboard.paste_html(HtmlPart::FullDocument).unwrap(),
        "<html><body><!--StartFragment--><p>Hello <b>world</b></p><!--EndFragment--></body></html>"
    );

    // companion plain-text write
    assert_eq!(
        clipboard.paste(ClipboardFormat::Text).unwrap().as_text(),
        Some("Hello world")
    );
}

#[test]
fn test_windows_envelope_offsets_are_byte_exact() {
    let fragment = "<p>caf\u{E9} \u{2014} r\u{E9}sum\u{E9}</p>";
    let mut clipboard = create_clipboard(Platform::Windows, MemoryRaw::windows()).unwrap();
    clipboard
        .copy(&ClipboardValue::from(fragment), Some(ClipboardFormat::Html))
        .unwrap();

    assert_eq!(clipboard.paste_html(HtmlPart::Fragment).unwrap(), fragment);

    // check the stored header fields directly
    let raw = clipboard.paste_html(HtmlPart::Raw).unwrap();
    assert!(raw.starts_with("Version:1.0\r\nStartHTML:"));
    for line in raw.lines().take(5).skip(1) {
        let (_, offset) = line.split_once(':').unwrap();
        assert_eq!(offset.len(), 9, "offset field must be 9 digits: {line}");
    }
}

#[test]
fn test_windows_image_travels_as_dib() {
    let img = sample_image();
    let mut clipboard = create_clipboard(Platform::Windows, MemoryRaw::windows()).unwrap();
    clipboard.copy(&ClipboardValue::Image(img.clone()), None).unwrap();

    let value = clipboard.paste(ClipboardFormat::Image).unwrap();
    assert_eq!(
        value.as_image().unwrap().to_rgba8().into_raw(),
        img.to_rgba8().into_raw()
    );
}

#[test]
fn test_windows_sessions_balance() {
    // MemoryRaw panics on a nested open or an unmatched close, so running a
    // mix of operations, including an error path, is the assertion.
    let mut clipboard = create_clipboard(Platform::Windows, MemoryRaw::windows()).unwrap();
    clipboard.copy(&ClipboardValue::from("one"), None).unwrap();
    let _ = clipboard.paste(ClipboardFormat::Text).unwrap();
    let _ = clipboard.list_formats().unwrap();
    let _ = clipboard.paste(ClipboardFormat::Image);
    assert_eq!(clipboard.platform(), Platform::Windows);
}

#[test]
fn test_copy_replaces_previous_content() {
    let mut clipboard = create_clipboard(Platform::Wayland, MemoryRaw::default()).unwrap();
    clipboard.copy(&ClipboardValue::Image(sample_image()), None).unwrap();
    clipboard.copy(&ClipboardValue::from("fresh"), None).unwrap();

    assert_eq!(clipboard.list_formats().unwrap(), vec![ClipboardFormat::Text]);
    assert!(matches!(
        clipboard.paste(ClipboardFormat::Image),
        Err(ClipboardError::FormatNotPresent(ClipboardFormat::Image))
    ));
}

#[test]
fn test_mime_wire_identifiers() {
    let mut clipboard = create_clipboard(Platform::Wayland, MemoryRaw::default()).unwrap();
    let table = clipboard.format_table();
    assert_eq!(table.id(ClipboardFormat::Text), Some(&FormatId::mime(MIME_TEXT)));
    assert_eq!(table.id(ClipboardFormat::Html), Some(&FormatId::mime(MIME_HTML)));
    assert_eq!(table.id(ClipboardFormat::Image), Some(&FormatId::mime(MIME_PNG)));
    clipboard.copy(&ClipboardValue::from("x"), None).unwrap();
}

#[test]
fn test_windows_wire_identifiers() {
    let clipboard = create_clipboard(Platform::Windows, MemoryRaw::windows()).unwrap();
    let table = clipboard.format_table();
    assert_eq!(table.id(ClipboardFormat::Text), Some(&FormatId::windows(CF_UNICODETEXT)));
    assert_eq!(table.id(ClipboardFormat::Image), Some(&FormatId::windows(CF_DIB)));
    assert_eq!(table.id(ClipboardFormat::Html), Some(&FormatId::windows(HTML_ID)));
}

#[test]
fn test_foreign_envelope_pastes_on_windows() {
    // envelope written by another producer: 0.9 version, no selection
    let document = "<html><body><!--StartFragment--><b>x</b><!--EndFragment--></body></html>";
    let fragment_start = document.find("<b>").unwrap();
    let fragment_end = document.find("<!--EndFragment-->").unwrap();

    let mut header = String::new();
    // two-pass: render once with zeroed offsets to learn the header length
    for _ in 0..2 {
        let base = header.len();
        header.clear();
        header.push_str("Version:0.9\r\n");
        header.push_str(&format!("StartHTML:{:09}\r\n", base));
        header.push_str(&format!("EndHTML:{:09}\r\n", base + document.len()));
        header.push_str(&format!("StartFragment:{:09}\r\n", base + fragment_start));
        header.push_str(&format!("EndFragment:{:09}\r\n", base + fragment_end));
    }
    let payload = format!("{header}{document}");

    let mut raw = MemoryRaw::windows();
    raw.store.insert(FormatId::windows(HTML_ID), payload.into_bytes());
    let mut clipboard = create_clipboard(Platform::Windows, raw).unwrap();

    assert_eq!(clipboard.paste_html(HtmlPart::Fragment).unwrap(), "<b>x</b>");
    assert_eq!(clipboard.paste_html(HtmlPart::FullDocument).unwrap(), document);
    assert!(matches!(
        clipboard.paste_html(HtmlPart::Selection),
        Err(ClipboardError::SelectionNotPresent)
    ));
}
