//! Media types and capabilities.
//!
//! Caps describe which media types a pad accepts and may carry textual
//! fields declared by upstream (for example `image-type=back-cover` on an
//! auxiliary stream). They're used for:
//! - Restricting request pads to an allow-list of content types
//! - Carrying per-stream attributes that influence how content is tagged

use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// Media Type
// ============================================================================

/// A media type as produced by content sniffing or declared in caps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// JPEG image (`image/jpeg`).
    Jpeg,
    /// PNG image (`image/png`).
    Png,
    /// A list of URIs, one per line (`text/uri-list`).
    UriList,
    /// Any other media type, stored by name.
    Other(String),
}

impl MediaType {
    /// MIME name of this media type.
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::UriList => "text/uri-list",
            MediaType::Other(name) => name,
        }
    }

    /// Parse a MIME name, mapping well-known names onto their variants.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("image/jpeg") {
            MediaType::Jpeg
        } else if name.eq_ignore_ascii_case("image/png") {
            MediaType::Png
        } else if name.eq_ignore_ascii_case("text/uri-list") {
            MediaType::UriList
        } else {
            MediaType::Other(name.to_ascii_lowercase())
        }
    }

    /// Whether this is an image type.
    pub fn is_image(&self) -> bool {
        match self {
            MediaType::Jpeg | MediaType::Png => true,
            MediaType::UriList => false,
            MediaType::Other(name) => name.starts_with("image/"),
        }
    }

    /// Whether this is a URI list.
    pub fn is_uri_list(&self) -> bool {
        matches!(self, MediaType::UriList)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MediaType {
    fn from(name: &str) -> Self {
        MediaType::parse(name)
    }
}

// ============================================================================
// Caps
// ============================================================================

/// Capabilities: which media types a pad accepts, plus declared fields.
///
/// An empty media type set means "any".
///
/// # Examples
///
/// ```rust
/// use tagmux::format::{Caps, MediaType};
///
/// // Pad that accepts anything
/// let any = Caps::any();
/// assert!(any.accepts(&MediaType::Jpeg));
///
/// // Pad restricted to an allow-list
/// let images = Caps::many([MediaType::Jpeg, MediaType::Png]);
/// assert!(!images.accepts(&MediaType::UriList));
///
/// // Negotiated caps with an upstream-declared attribute
/// let caps = Caps::new(MediaType::Png).with_field("image-type", "back-cover");
/// assert_eq!(caps.field("image-type"), Some("back-cover"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caps {
    media_types: SmallVec<[MediaType; 3]>,
    fields: SmallVec<[(String, String); 2]>,
}

impl Caps {
    /// Create caps that accept any media type.
    pub fn any() -> Self {
        Self::default()
    }

    /// Create caps with a single media type.
    pub fn new(media_type: MediaType) -> Self {
        Self::many([media_type])
    }

    /// Create caps with multiple acceptable media types.
    ///
    /// The first media type is the preferred one.
    pub fn many(media_types: impl IntoIterator<Item = MediaType>) -> Self {
        Self {
            media_types: media_types.into_iter().collect(),
            fields: SmallVec::new(),
        }
    }

    /// Is this "any media type"?
    #[inline]
    pub fn is_any(&self) -> bool {
        self.media_types.is_empty()
    }

    /// Is this a single fixed media type?
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.media_types.len() == 1
    }

    /// Get the media types.
    #[inline]
    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    /// Get the preferred media type (first one).
    #[inline]
    pub fn preferred(&self) -> Option<&MediaType> {
        self.media_types.first()
    }

    /// Check whether a media type is acceptable.
    pub fn accepts(&self, media_type: &MediaType) -> bool {
        self.is_any() || self.media_types.contains(media_type)
    }

    /// Check if compatible with another caps.
    ///
    /// Two caps are compatible if at least one media type is shared.
    pub fn intersects(&self, other: &Caps) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }
        self.media_types.iter().any(|m| other.media_types.contains(m))
    }

    /// Add a field, replacing any previous value for the key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Set a field, replacing any previous value for the key.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Get a field value.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("ANY")?;
        } else {
            for (i, media_type) in self.media_types.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                f.write_str(media_type.as_str())?;
            }
        }
        for (key, value) in &self.fields {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

impl From<MediaType> for Caps {
    fn from(media_type: MediaType) -> Self {
        Caps::new(media_type)
    }
}
