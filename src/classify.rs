//! Media classification for slide badges.

use crate::markup::{MediaMarkup, SlideMarkup};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl MediaKind {
    /// Text shown on the badge
    pub fn badge_label(&self) -> &'static str {
        match self {
            MediaKind::Image => "IMG",
            MediaKind::Gif => "GIF",
            MediaKind::Video => "VIDEO",
        }
    }

    /// Value of the badge's `data-type` attribute
    pub fn data_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "img",
            MediaKind::Gif => "gif",
            MediaKind::Video => "video",
        }
    }
}

/// Decides whether an image is animated by looking for known markers
/// (hosts, extensions) in its resolved source URL.
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    gif_markers: Vec<String>,
}

impl MediaClassifier {
    pub fn new<I, S>(gif_markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MediaClassifier {
            gif_markers: gif_markers
                .into_iter()
                .map(|m| m.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, media: &MediaMarkup) -> MediaKind {
        match media {
            MediaMarkup::Video { .. } => MediaKind::Video,
            MediaMarkup::Image { src } => {
                let src = src.to_ascii_lowercase();
                if self.gif_markers.iter().any(|m| src.contains(m.as_str())) {
                    MediaKind::Gif
                } else {
                    MediaKind::Image
                }
            }
        }
    }

    /// `None` for slides without media; the badge is left alone then.
    pub fn classify_slide(&self, slide: &SlideMarkup) -> Option<MediaKind> {
        slide.media.as_ref().map(|m| self.classify(m))
    }
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self::new(["giphy.com", ".gif"])
    }
}
