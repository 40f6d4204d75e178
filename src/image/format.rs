//! Suffix-based media format dispatch.
//!
//! Matching compares only the trailing [`SUFFIX_WIDTH`] characters of the
//! path, case-sensitively. `photo.jpeg` matches through the `jpeg` entry, but
//! `scan.tiff` and `cat.JPG` are not recognized.

use std::path::Path;

/// Number of trailing characters compared against a [`SuffixSet`].
pub const SUFFIX_WIDTH: usize = 4;

/// What a path is treated as by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image, decoded through an [`ImageSource`](super::ImageSource).
    Image,
    /// Video container. Decoding is not implemented.
    Video,
}

/// A set of fixed-width path suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixSet {
    suffixes: Vec<String>,
}

impl SuffixSet {
    /// Build a set from the given suffixes.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Still image suffixes accepted for content and style.
    #[must_use]
    pub fn images() -> Self {
        Self::new([".tif", ".png", ".jpg", "jpeg"])
    }

    /// Video suffixes accepted (and skipped) for content.
    #[must_use]
    pub fn videos() -> Self {
        Self::new([".avi", ".mp4", ".mkv", ".wmv"])
    }

    /// Whether the set holds no suffixes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// The configured suffixes.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Whether the trailing characters of `path` are in the set.
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref().to_string_lossy();
        let tail = trailing_chars(&path, SUFFIX_WIDTH);
        self.suffixes.iter().any(|s| s == tail)
    }
}

/// Classify `path` against the image set first, then the video set.
pub fn classify<P: AsRef<Path>>(
    path: P,
    images: &SuffixSet,
    videos: &SuffixSet,
) -> Option<MediaKind> {
    let path = path.as_ref();
    if images.matches(path) {
        Some(MediaKind::Image)
    } else if videos.matches(path) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// The last `n` characters of `s`, or all of it when shorter.
fn trailing_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map_or(s, |(idx, _)| &s[idx..])
}
