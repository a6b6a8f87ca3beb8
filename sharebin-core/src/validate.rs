//! Media-type validation against magic-byte signatures.

/// Media types accepted for upload. Anything else is rejected before any
/// signature check runs.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &["text/plain", "image/jpeg", "image/png"];

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Check a declared media type against the actual content.
///
/// Pure function of its inputs. An empty byte slice fails both image
/// signature checks but is valid empty UTF-8 text.
pub fn is_valid_content(media_type: &str, bytes: &[u8]) -> bool {
    if !ALLOWED_MEDIA_TYPES.contains(&media_type) {
        return false;
    }

    match media_type {
        "image/png" => has_png_signature(bytes),
        "image/jpeg" => has_jpeg_signature(bytes),
        "text/plain" => std::str::from_utf8(bytes).is_ok(),
        _ => false,
    }
}

fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

fn has_jpeg_signature(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..2] == JPEG_SOI && bytes[bytes.len() - 2..] == JPEG_EOI
}
