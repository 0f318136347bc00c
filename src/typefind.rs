//! Content sniffing.
//!
//! Auxiliary streams arrive as raw bytes; the element classifies each data
//! unit through a [`TypeFind`] implementation before deciding whether it can
//! become a tag. [`MagicTypeFinder`] recognises common image signatures and
//! URI lists; hosts with a richer registry plug in their own implementation.

use crate::format::MediaType;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const BMP_MAGIC: &[u8] = b"BM";
const BMP_HEADER_LEN: usize = 14;

/// Classifies a data unit by content.
pub trait TypeFind: Send + Sync {
    /// Return the media type of `data`, or `None` if it is not recognised.
    fn sniff(&self, data: &[u8]) -> Option<MediaType>;
}

impl<F> TypeFind for F
where
    F: Fn(&[u8]) -> Option<MediaType> + Send + Sync,
{
    fn sniff(&self, data: &[u8]) -> Option<MediaType> {
        self(data)
    }
}

/// Signature-based type finder.
///
/// | Type | Detection |
/// |------|-----------|
/// | `image/jpeg` | SOI marker followed by a segment marker |
/// | `image/png` | 8-byte PNG signature |
/// | `image/gif` | `GIF87a` / `GIF89a` |
/// | `image/bmp` | `BM` with a complete file header |
/// | `text/uri-list` | UTF-8 text whose non-comment lines are all URIs |
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicTypeFinder;

impl MagicTypeFinder {
    /// Create a new type finder.
    pub fn new() -> Self {
        Self
    }
}

impl TypeFind for MagicTypeFinder {
    fn sniff(&self, data: &[u8]) -> Option<MediaType> {
        if data.starts_with(JPEG_MAGIC) {
            Some(MediaType::Jpeg)
        } else if data.starts_with(PNG_MAGIC) {
            Some(MediaType::Png)
        } else if data.starts_with(GIF87_MAGIC) || data.starts_with(GIF89_MAGIC) {
            Some(MediaType::Other("image/gif".into()))
        } else if data.starts_with(BMP_MAGIC) && data.len() >= BMP_HEADER_LEN {
            Some(MediaType::Other("image/bmp".into()))
        } else if is_uri_list(data) {
            Some(MediaType::UriList)
        } else {
            None
        }
    }
}

/// RFC 2483 list: `#` comments allowed, at least one URI, nothing else.
fn is_uri_list(data: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(data) else {
        return false;
    };

    let mut uris = 0usize;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !is_uri(line) {
            return false;
        }
        uris += 1;
    }
    uris > 0
}

fn is_uri(line: &str) -> bool {
    let Some((scheme, rest)) = line.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !line.chars().any(|c| c.is_whitespace() || c.is_control())
}
