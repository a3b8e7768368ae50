//! Showreel
//!
//! Client-side controllers for a portfolio page's media: rotating carousels
//! with dot indicators, custom video controls, media badges and keyboard
//! shortcuts. The page itself is reached through the traits in [`platform`],
//! so the same controllers run against a real host or headlessly.
//!
//! # Features
//!
//! - **Carousels**: wrap-around navigation, 4 s auto-advance paused on hover,
//!   every video paused on each slide change
//! - **Video controls**: play/pause, mute, fullscreen, seeking, one automatic
//!   reload on a load error before showing an error panel
//! - **Headless host**: [`platform::SimulatedPlatform`] for tests and the CLI
//!
//! # Example
//!
//! ```no_run
//! use showreel::platform::SimulatedPlatform;
//! use showreel::{markup, Direction, Page, ShowreelConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let html = std::fs::read_to_string("index.html")?;
//! let markup = markup::scan_document(&html, None)?;
//! let platform = SimulatedPlatform::new();
//!
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async {
//!         let page = Page::mount(&markup, &platform, &ShowreelConfig::default())?;
//!         page.change_slide("projects", Direction::Next);
//!         println!("{:?}", page.summary());
//!         Ok::<_, showreel::Error>(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod carousel;
pub mod classify;
pub mod input;
pub mod markup;
pub mod page;
pub mod platform;
pub mod registry;
pub mod video;

// Loading markup from disk or over HTTP
pub mod source;

pub use carousel::{Carousel, CarouselState, Direction, SharedCarousel};
pub use classify::{MediaClassifier, MediaKind};
pub use input::KeyEvent;
pub use page::{Page, PageSummary};
pub use registry::CarouselRegistry;
pub use video::{PlayerPhase, SharedPlayer, VideoPlayer};

/// Configuration for mounting a page
///
/// The defaults match what the page expects out of the box:
/// - slides advance every 4 seconds
/// - videos start muted so browsers allow autoplay
/// - a failed video load is retried once before giving up
///
/// # Examples
///
/// ```
/// let cfg = showreel::ShowreelConfig::default();
/// assert_eq!(cfg.auto_advance_ms, 4000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowreelConfig {
    /// Auto-advance period in milliseconds
    pub auto_advance_ms: u64,
    /// Automatic reloads after a media load error before the error panel
    pub media_retry_limit: u32,
    /// Substrings of an image URL that mark it as an animated GIF
    pub gif_markers: Vec<String>,
    /// Whether videos start muted
    pub start_muted: bool,
    /// Base URL for resolving relative media sources
    pub base_url: Option<String>,
    /// User agent sent when fetching markup over HTTP
    pub user_agent: String,
    /// Timeout for fetching markup in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for ShowreelConfig {
    fn default() -> Self {
        Self {
            auto_advance_ms: 4000,
            media_retry_limit: 1,
            gif_markers: vec!["giphy.com".to_string(), ".gif".to_string()],
            start_muted: true,
            base_url: None,
            user_agent: concat!("showreel/", env!("CARGO_PKG_VERSION")).to_string(),
            fetch_timeout_ms: 30000,
        }
    }
}

impl ShowreelConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auto_advance_ms == 0 {
            return Err(Error::ConfigError("auto_advance_ms must be greater than zero".into()));
        }
        if let Some(base) = &self.base_url {
            url::Url::parse(base).map_err(|e| Error::ConfigError(format!("base_url '{}': {}", base, e)))?;
        }
        Ok(())
    }

    pub fn auto_advance_interval(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShowreelConfig::default();
        assert_eq!(config.auto_advance_interval(), Duration::from_secs(4));
        assert_eq!(config.media_retry_limit, 1);
        assert!(config.start_muted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ShowreelConfig::from_json(r#"{ "auto_advance_ms": 2500, "gif_markers": ["tenor.com"] }"#).unwrap();
        assert_eq!(config.auto_advance_ms, 2500);
        assert_eq!(config.gif_markers, vec!["tenor.com".to_string()]);
        assert_eq!(config.media_retry_limit, 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ShowreelConfig::from_json(r#"{ "auto_advance_ms": 0 }"#),
            Err(Error::ConfigError(_))
        ));
        assert!(ShowreelConfig::from_json(r#"{ "base_url": "not a url" }"#).is_err());
        assert!(ShowreelConfig::from_json("[").is_err());
    }
}
