//! Error types for the showreel controllers

use thiserror::Error;

/// Result type alias for showreel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, scanning or driving a page
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to load page markup
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Network error while fetching markup
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Markup could not be scanned
    #[error("Markup error: {0}")]
    MarkupError(String),

    /// A 1-based slide number outside the carousel's range
    #[error("Slide {slide} is out of range for carousel '{carousel}' ({len} slides)")]
    SlideOutOfRange {
        carousel: String,
        slide: usize,
        len: usize,
    },

    /// The host refused a play request (autoplay policy, decode failure)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The host exposes no fullscreen API
    #[error("Fullscreen API not available")]
    FullscreenUnsupported,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(feature = "fetch")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}
