//! Tag system for stream metadata.
//!
//! Tags are ordered name/value entries. A name may occur many times: two
//! cover images are two `image` entries, kept in the order they were added.
//!
//! # Common Tags
//!
//! | Tag Name | Type | Description |
//! |----------|------|-------------|
//! | `image` | Sample | Image (or image URI list) attached to the stream |
//! | `title` | String | Stream/track title |
//! | `comment` | String | Free-form comment |
//!
//! # Example
//!
//! ```rust
//! use tagmux::buffer::Buffer;
//! use tagmux::event::{ImageType, Sample, TagList, TagMergeMode};
//! use tagmux::format::{Caps, MediaType};
//!
//! let mut tags = TagList::new();
//! tags.add("title", "Live at the Roxy", TagMergeMode::Append);
//!
//! let cover = Sample::new(Buffer::from_static(b"\xFF\xD8\xFF"), Caps::new(MediaType::Jpeg))
//!     .with_image_type(Some(ImageType::FrontCover));
//! tags.add_image(cover);
//!
//! assert_eq!(tags.title(), Some("Live at the Roxy"));
//! assert_eq!(tags.images().count(), 1);
//! ```

use crate::buffer::Buffer;
use crate::format::{Caps, MediaType};
use std::mem;

// ============================================================================
// Image Type
// ============================================================================

/// Semantic role of an image tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageType {
    /// No role; the tag carries no image-type info.
    None,
    /// Role not covered by any other variant.
    Undefined,
    /// Front cover.
    #[default]
    FrontCover,
    /// Back cover.
    BackCover,
    /// Leaflet page.
    LeafletPage,
    /// Medium (e.g. label side of a disc).
    Medium,
    /// Lead artist or soloist.
    LeadArtist,
    /// Artist or performer.
    Artist,
    /// Conductor.
    Conductor,
    /// Band or orchestra.
    BandOrchestra,
    /// Composer.
    Composer,
    /// Lyricist or text writer.
    Lyricist,
    /// Recording location.
    RecordingLocation,
    /// Picture taken during recording.
    DuringRecording,
    /// Picture taken during performance.
    DuringPerformance,
    /// Movie or video screen capture.
    VideoCapture,
    /// A fish as funny as the ID3v2 spec.
    Fish,
    /// Illustration.
    Illustration,
    /// Band or artist logotype.
    BandLogo,
    /// Publisher or studio logotype.
    PublisherLogo,
}

impl ImageType {
    /// Every image type, in declaration order.
    pub const ALL: [ImageType; 20] = [
        ImageType::None,
        ImageType::Undefined,
        ImageType::FrontCover,
        ImageType::BackCover,
        ImageType::LeafletPage,
        ImageType::Medium,
        ImageType::LeadArtist,
        ImageType::Artist,
        ImageType::Conductor,
        ImageType::BandOrchestra,
        ImageType::Composer,
        ImageType::Lyricist,
        ImageType::RecordingLocation,
        ImageType::DuringRecording,
        ImageType::DuringPerformance,
        ImageType::VideoCapture,
        ImageType::Fish,
        ImageType::Illustration,
        ImageType::BandLogo,
        ImageType::PublisherLogo,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            ImageType::None => "none",
            ImageType::Undefined => "undefined",
            ImageType::FrontCover => "front-cover",
            ImageType::BackCover => "back-cover",
            ImageType::LeafletPage => "leaflet-page",
            ImageType::Medium => "medium",
            ImageType::LeadArtist => "lead-artist",
            ImageType::Artist => "artist",
            ImageType::Conductor => "conductor",
            ImageType::BandOrchestra => "band-orchestra",
            ImageType::Composer => "composer",
            ImageType::Lyricist => "lyricist",
            ImageType::RecordingLocation => "recording-location",
            ImageType::DuringRecording => "during-recording",
            ImageType::DuringPerformance => "during-performance",
            ImageType::VideoCapture => "video-capture",
            ImageType::Fish => "fish",
            ImageType::Illustration => "illustration",
            ImageType::BandLogo => "band-logo",
            ImageType::PublisherLogo => "publisher-logo",
        }
    }

    /// Short alias.
    pub fn alias(self) -> &'static str {
        match self {
            ImageType::None => "none",
            ImageType::Undefined => "other",
            ImageType::FrontCover => "front",
            ImageType::BackCover => "back",
            ImageType::LeafletPage => "leaflet",
            ImageType::Medium => "media",
            ImageType::LeadArtist => "lead",
            ImageType::Artist => "performer",
            ImageType::Conductor => "conductor",
            ImageType::BandOrchestra => "band",
            ImageType::Composer => "composer",
            ImageType::Lyricist => "lyricist",
            ImageType::RecordingLocation => "location",
            ImageType::DuringRecording => "recording",
            ImageType::DuringPerformance => "performance",
            ImageType::VideoCapture => "capture",
            ImageType::Fish => "fish",
            ImageType::Illustration => "illustration",
            ImageType::BandLogo => "logo",
            ImageType::PublisherLogo => "publisher",
        }
    }

    /// Resolve a canonical name or short alias, ignoring ASCII case.
    pub fn from_name(value: &str) -> Option<ImageType> {
        let value = value.trim();
        Self::ALL.into_iter().find(|t| {
            t.name().eq_ignore_ascii_case(value) || t.alias().eq_ignore_ascii_case(value)
        })
    }
}

// ============================================================================
// Sample
// ============================================================================

/// A buffer together with the caps describing it and optional image info.
///
/// This is how binary content (an image, a URI list) rides inside a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    buffer: Buffer,
    caps: Caps,
    image_type: Option<ImageType>,
}

impl Sample {
    /// Create a sample without image info.
    pub fn new(buffer: Buffer, caps: Caps) -> Self {
        Self {
            buffer,
            caps,
            image_type: None,
        }
    }

    /// Attach (or clear) the image type info.
    pub fn with_image_type(mut self, image_type: Option<ImageType>) -> Self {
        self.image_type = image_type;
        self
    }

    /// The payload.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Caps describing the payload.
    pub fn caps(&self) -> &Caps {
        &self.caps
    }

    /// Media type of the payload, if the caps are fixed.
    pub fn media_type(&self) -> Option<&MediaType> {
        self.caps.preferred()
    }

    /// Image role, if any.
    pub fn image_type(&self) -> Option<ImageType> {
        self.image_type
    }
}

// ============================================================================
// Tag Value
// ============================================================================

/// Value that can be stored in a tag list.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// String value.
    String(String),
    /// Unsigned integer.
    UInt(u64),
    /// Buffer with caps (images, attachments).
    Sample(Sample),
}

impl TagValue {
    /// Get as string if this is a String variant.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as sample if this is a Sample variant.
    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            TagValue::Sample(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::String(s)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::String(s.to_string())
    }
}

impl From<u64> for TagValue {
    fn from(n: u64) -> Self {
        TagValue::UInt(n)
    }
}

impl From<Sample> for TagValue {
    fn from(s: Sample) -> Self {
        TagValue::Sample(s)
    }
}

// ============================================================================
// Tag List
// ============================================================================

/// One entry of a [`TagList`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    name: String,
    value: TagValue,
}

impl Tag {
    /// Tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag value.
    pub fn value(&self) -> &TagValue {
        &self.value
    }
}

/// An ordered collection of stream metadata tags.
///
/// Insertion order is preserved and names may repeat; appending never
/// de-duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagList {
    tags: Vec<Tag>,
}

impl TagList {
    /// Create a new empty tag list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `name` according to `mode`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<TagValue>, mode: TagMergeMode) {
        let name = name.into();
        match mode {
            TagMergeMode::Append => {}
            TagMergeMode::Replace => self.tags.retain(|t| t.name != name),
            TagMergeMode::Keep => {
                if self.contains(&name) {
                    return;
                }
            }
        }
        self.tags.push(Tag {
            name,
            value: value.into(),
        });
    }

    /// Append an image sample under [`tag_names::IMAGE`].
    pub fn add_image(&mut self, sample: Sample) {
        self.add(tag_names::IMAGE, sample, TagMergeMode::Append);
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.iter().find(|t| t.name == name).map(|t| &t.value)
    }

    /// All values stored under `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TagValue> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.name == name)
            .map(|t| &t.value)
    }

    /// First value under `name` as a string.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TagValue::as_string)
    }

    /// All image samples, in insertion order.
    pub fn images(&self) -> impl Iterator<Item = &Sample> {
        self.get_all(tag_names::IMAGE)
            .filter_map(TagValue::as_sample)
    }

    /// The title tag.
    pub fn title(&self) -> Option<&str> {
        self.get_string(tag_names::TITLE)
    }

    /// Check if any value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Number of entries (a repeated name counts once per value).
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Move every entry out, leaving this list empty.
    pub fn take(&mut self) -> TagList {
        mem::take(self)
    }
}

impl IntoIterator for TagList {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

// ============================================================================
// Tag Merge Mode
// ============================================================================

/// How to merge tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagMergeMode {
    /// Drop existing values of the same name, then add.
    Replace,
    /// Add after existing values of the same name.
    #[default]
    Append,
    /// Add only if no value of the same name exists.
    Keep,
}

// ============================================================================
// Common Tag Constants
// ============================================================================

/// Common tag names as constants for convenience.
pub mod tag_names {
    /// Image attached to the stream (value is a sample).
    pub const IMAGE: &str = "image";
    /// Stream/track title.
    pub const TITLE: &str = "title";
    /// Free-form comment.
    pub const COMMENT: &str = "comment";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(byte: u8) -> Sample {
        Sample::new(
            Buffer::from_bytes(vec![0xFF, 0xD8, 0xFF, byte]),
            Caps::new(MediaType::Jpeg),
        )
    }

    #[test]
    fn test_image_type_names_unique() {
        for (i, a) in ImageType::ALL.iter().enumerate() {
            for b in &ImageType::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
                assert_ne!(a.alias(), b.alias());
                assert_ne!(a.name(), b.alias());
                assert_ne!(a.alias(), b.name());
            }
        }
    }

    #[test]
    fn test_image_type_from_name() {
        assert_eq!(ImageType::from_name("back-cover"), Some(ImageType::BackCover));
        assert_eq!(ImageType::from_name("back"), Some(ImageType::BackCover));
        assert_eq!(ImageType::from_name("Leaflet-Page"), Some(ImageType::LeafletPage));
        assert_eq!(ImageType::from_name("none"), Some(ImageType::None));
        assert_eq!(ImageType::from_name("sideways"), None);
        assert_eq!(ImageType::default(), ImageType::FrontCover);
    }

    #[test]
    fn test_tag_value_conversions() {
        let v: TagValue = "hello".into();
        assert_eq!(v.as_string(), Some("hello"));

        let v: TagValue = 42u64.into();
        assert_eq!(v, TagValue::UInt(42));
        assert!(v.as_sample().is_none());

        let v: TagValue = jpeg(1).into();
        assert_eq!(v.as_sample().and_then(Sample::media_type), Some(&MediaType::Jpeg));
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let mut tags = TagList::new();
        tags.add_image(jpeg(1).with_image_type(Some(ImageType::FrontCover)));
        tags.add_image(jpeg(2).with_image_type(Some(ImageType::FrontCover)));
        tags.add_image(jpeg(3));

        let payloads: Vec<u8> = tags.images().map(|s| s.buffer().as_bytes()[3]).collect();
        assert_eq!(payloads, vec![1, 2, 3]);
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_add_replace_and_keep() {
        let mut tags = TagList::new();
        tags.add("title", "first", TagMergeMode::Append);
        tags.add("title", "second", TagMergeMode::Append);
        assert_eq!(tags.get_all("title").count(), 2);

        tags.add("title", "only", TagMergeMode::Replace);
        assert_eq!(tags.get_all("title").count(), 1);
        assert_eq!(tags.title(), Some("only"));

        tags.add("title", "ignored", TagMergeMode::Keep);
        assert_eq!(tags.title(), Some("only"));

        tags.add("comment", "kept", TagMergeMode::Keep);
        assert_eq!(tags.get_string("comment"), Some("kept"));
    }

    #[test]
    fn test_get_outlives_lookup_key() {
        let mut tags = TagList::new();
        tags.add("comment", "first", TagMergeMode::Append);
        tags.add("comment", "second", TagMergeMode::Append);

        let value = {
            let key = String::from("comment");
            tags.get(&key)
        };
        assert_eq!(value.and_then(TagValue::as_string), Some("first"));
        assert!(tags.get("missing").is_none());
    }

    #[test]
    fn test_take_empties_list() {
        let mut tags = TagList::new();
        tags.add_image(jpeg(9));

        let taken = tags.take();
        assert!(tags.is_empty());
        assert_eq!(taken.len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let mut tags = TagList::new();
        tags.add("z", 1u64, TagMergeMode::Append);
        tags.add("a", 2u64, TagMergeMode::Append);

        let names: Vec<&str> = tags.iter().map(Tag::name).collect();
        assert_eq!(names, vec!["z", "a"]);

        let values: Vec<TagValue> = tags.into_iter().map(|t| t.value().clone()).collect();
        assert_eq!(values, vec![TagValue::UInt(1), TagValue::UInt(2)]);
    }
}
