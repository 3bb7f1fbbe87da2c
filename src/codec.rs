//! Wire codecs between [`ClipboardValue`]s and backend bytes.
//!
//! Two dialects live here:
//!
//! - the **generic codec** ([`encode`]/[`decode`]) used by the MIME-speaking
//!   backends: text and html travel as UTF-8, images as a PNG container;
//! - the **Windows wire helpers**: CF_UNICODETEXT is UTF-16LE with a
//!   trailing NUL, CF_DIB is a BITMAPINFOHEADER plus BGRA pixel rows.
//!
//! Both directions are stateless. The generic path round-trips byte-exact
//! for text and pixel-exact for images.

use bytes::{BufMut, BytesMut};
use image::{DynamicImage, ImageFormat};

use crate::error::{ClipboardError, ClipboardResult};
use crate::formats::ClipboardFormat;
use crate::value::ClipboardValue;

/// BITMAPINFOHEADER size in bytes.
const DIB_HEADER_SIZE: usize = 40;

// =============================================================================
// Generic codec (MIME backends)
// =============================================================================

/// Encode `value` into the wire bytes for `format`.
///
/// Text and html values become UTF-8 bytes, images become a PNG container.
/// A byte blob passes through unchanged once it is consistent with the
/// format (UTF-8 for text/html, assumed pre-encoded container for images).
pub fn encode(value: &ClipboardValue, format: ClipboardFormat) -> ClipboardResult<Vec<u8>> {
    match format {
        ClipboardFormat::Text | ClipboardFormat::Html => Ok(value_text(value)?.as_bytes().to_vec()),
        ClipboardFormat::Image => match value {
            ClipboardValue::Image(img) => encode_png(img),
            ClipboardValue::Bytes(bytes) => Ok(bytes.clone()),
            ClipboardValue::Text(_) => Err(mismatch(value, format)),
        },
    }
}

/// Decode wire bytes for `format` into a [`ClipboardValue`].
pub fn decode(bytes: &[u8], format: ClipboardFormat) -> ClipboardResult<ClipboardValue> {
    match format {
        ClipboardFormat::Text | ClipboardFormat::Html => std::str::from_utf8(bytes)
            .map(|s| ClipboardValue::Text(s.to_string()))
            .map_err(|_| ClipboardError::InvalidUtf8),
        ClipboardFormat::Image => decode_image(bytes).map(ClipboardValue::Image),
    }
}

/// Serialize a raster image into a PNG container.
pub fn encode_png(image: &DynamicImage) -> ClipboardResult<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ClipboardError::ImageEncode(e.to_string()))?;
    Ok(png)
}

/// Parse an encoded image container (format detected from magic bytes).
pub fn decode_image(bytes: &[u8]) -> ClipboardResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| ClipboardError::ImageDecode(e.to_string()))
}

/// Borrow the UTF-8 text carried by `value`.
///
/// Byte blobs are accepted when they decode as UTF-8; image values are a
/// conversion error.
pub(crate) fn value_text(value: &ClipboardValue) -> ClipboardResult<&str> {
    match value {
        ClipboardValue::Text(s) => Ok(s),
        ClipboardValue::Bytes(bytes) => std::str::from_utf8(bytes).map_err(|_| ClipboardError::InvalidUtf8),
        ClipboardValue::Image(_) => Err(mismatch(value, ClipboardFormat::Text)),
    }
}

/// Borrow the raster image carried by `value`, decoding blobs on the fly.
pub(crate) fn value_image(value: &ClipboardValue) -> ClipboardResult<DynamicImage> {
    match value {
        ClipboardValue::Image(img) => Ok(img.clone()),
        ClipboardValue::Bytes(bytes) => decode_image(bytes),
        ClipboardValue::Text(_) => Err(mismatch(value, ClipboardFormat::Image)),
    }
}

fn mismatch(value: &ClipboardValue, format: ClipboardFormat) -> ClipboardError {
    ClipboardError::FormatConversion(format!("{} value cannot encode as {format}", value.kind()))
}

// =============================================================================
// Windows wire helpers: CF_UNICODETEXT
// =============================================================================

/// Encode text as UTF-16LE with the trailing NUL CF_UNICODETEXT requires.
pub fn text_to_utf16le(text: &str) -> Vec<u8> {
    let mut data: Vec<u8> = text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect();
    data.extend_from_slice(&[0, 0]);
    data
}

/// Decode CF_UNICODETEXT bytes, stripping trailing NUL padding.
pub fn utf16le_to_text(data: &[u8]) -> ClipboardResult<String> {
    if data.len() % 2 != 0 {
        return Err(ClipboardError::InvalidUtf16);
    }

    let mut units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }

    String::from_utf16(&units).map_err(|_| ClipboardError::InvalidUtf16)
}

// =============================================================================
// Windows wire helpers: CF_DIB
// =============================================================================

/// Encode a raster image as CF_DIB bytes.
///
/// Produces a 40-byte BITMAPINFOHEADER followed by 32-bit BGRA rows. The
/// height field is negative: top-down row order, no vertical flip needed on
/// either side.
pub fn image_to_dib(image: &DynamicImage) -> ClipboardResult<Vec<u8>> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let signed_width = i32::try_from(width).map_err(|_| ClipboardError::ImageEncode("image too wide for DIB".to_string()))?;
    let signed_height =
        i32::try_from(height).map_err(|_| ClipboardError::ImageEncode("image too tall for DIB".to_string()))?;
    let pixel_bytes =
        u32::try_from(rgba.len()).map_err(|_| ClipboardError::ImageEncode("image too large for DIB".to_string()))?;

    let mut dib = BytesMut::with_capacity(DIB_HEADER_SIZE + rgba.len());
    dib.put_u32_le(DIB_HEADER_SIZE as u32); // biSize
    dib.put_i32_le(signed_width); // biWidth
    dib.put_i32_le(-signed_height); // biHeight, negative = top-down
    dib.put_u16_le(1); // biPlanes
    dib.put_u16_le(32); // biBitCount
    dib.put_u32_le(0); // biCompression = BI_RGB
    dib.put_u32_le(pixel_bytes); // biSizeImage
    dib.put_i32_le(0); // biXPelsPerMeter
    dib.put_i32_le(0); // biYPelsPerMeter
    dib.put_u32_le(0); // biClrUsed
    dib.put_u32_le(0); // biClrImportant

    for pixel in rgba.pixels() {
        // RGBA -> BGRA
        dib.put_u8(pixel[2]);
        dib.put_u8(pixel[1]);
        dib.put_u8(pixel[0]);
        dib.put_u8(pixel[3]);
    }

    Ok(dib.to_vec())
}

/// Decode CF_DIB bytes into a raster image.
///
/// Accepts 32-bit BGRA and 24-bit BGR bitmaps, top-down or bottom-up,
/// uncompressed (BI_RGB) or BI_BITFIELDS with the standard masks.
pub fn dib_to_image(dib: &[u8]) -> ClipboardResult<DynamicImage> {
    if dib.len() < DIB_HEADER_SIZE {
        return Err(dib_error("DIB shorter than BITMAPINFOHEADER"));
    }

    let header_size = u32::from_le_bytes([dib[0], dib[1], dib[2], dib[3]]) as usize;
    if header_size < DIB_HEADER_SIZE || header_size > dib.len() {
        return Err(dib_error("invalid DIB header size"));
    }

    let width = i32::from_le_bytes([dib[4], dib[5], dib[6], dib[7]]).unsigned_abs();
    let height_raw = i32::from_le_bytes([dib[8], dib[9], dib[10], dib[11]]);
    let height = height_raw.unsigned_abs();
    let top_down = height_raw < 0;
    let bit_count = u16::from_le_bytes([dib[14], dib[15]]);
    let compression = u32::from_le_bytes([dib[16], dib[17], dib[18], dib[19]]);

    if !matches!(compression, 0 | 3) {
        return Err(dib_error("unsupported DIB compression"));
    }
    if width == 0 || height == 0 {
        return Err(dib_error("zero-sized DIB"));
    }

    // BI_BITFIELDS with the 40-byte header carries three masks after it
    let mask_bytes = if compression == 3 && header_size == DIB_HEADER_SIZE { 12 } else { 0 };
    let pixel_offset = header_size + mask_bytes;
    let pixels = dib.get(pixel_offset..).ok_or_else(|| dib_error("DIB pixel data missing"))?;

    match bit_count {
        32 => dib_rows_32(pixels, width, height, top_down),
        24 => dib_rows_24(pixels, width, height, top_down),
        other => Err(dib_error(format!("unsupported DIB bit depth: {other}"))),
    }
}

fn dib_error(msg: impl Into<String>) -> ClipboardError {
    ClipboardError::ImageDecode(msg.into())
}

fn dib_rows_32(pixels: &[u8], width: u32, height: u32, top_down: bool) -> ClipboardResult<DynamicImage> {
    let row_size = width as usize * 4;
    if pixels.len() < row_size * height as usize {
        return Err(dib_error("DIB pixel data truncated"));
    }

    let mut rgba = Vec::with_capacity(row_size * height as usize);
    for y in 0..height {
        let src_y = if top_down { y } else { height - 1 - y } as usize;
        let row = &pixels[src_y * row_size..][..row_size];
        for bgra in row.chunks_exact(4) {
            rgba.extend_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
        }
    }

    image::RgbaImage::from_raw(width, height, rgba)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| dib_error("DIB dimensions do not match pixel data"))
}

fn dib_rows_24(pixels: &[u8], width: u32, height: u32, top_down: bool) -> ClipboardResult<DynamicImage> {
    // 24-bit rows are padded to 4-byte boundaries
    let row_size = (width as usize * 3).div_ceil(4) * 4;
    if pixels.len() < row_size * height as usize {
        return Err(dib_error("DIB pixel data truncated"));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        let src_y = if top_down { y } else { height - 1 - y } as usize;
        let row = &pixels[src_y * row_size..][..width as usize * 3];
        for bgr in row.chunks_exact(3) {
            rgb.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
        }
    }

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| dib_error("DIB dimensions do not match pixel data"))
}
