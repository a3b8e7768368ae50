//! Composition root: mounts controllers for scanned markup and routes the
//! page's UI events to them.

use crate::carousel::{Carousel, CarouselState, Direction, SharedCarousel, Slide};
use crate::classify::{MediaClassifier, MediaKind};
use crate::input::{arrow_direction, KeyEvent};
use crate::markup::{MediaMarkup, PageMarkup};
use crate::platform::{MediaEvent, PlatformApi};
use crate::registry::CarouselRegistry;
use crate::video::{PlayerPhase, SharedPlayer, VideoPlayer};
use crate::{Result, ShowreelConfig};
use log::{debug, info};
use serde::Serialize;
use std::rc::Rc;

/// A mounted page: the carousels, the video players and the registry the UI
/// handlers resolve carousel ids through.
#[derive(Debug)]
pub struct Page {
    carousels: Vec<SharedCarousel>,
    players: Vec<SharedPlayer>,
    registry: CarouselRegistry,
    hovered: Option<String>,
}

impl Page {
    /// Create every controller the markup calls for and start auto-advance.
    ///
    /// Must be called inside a `LocalSet`; timers and play requests are
    /// local tasks.
    pub fn mount(markup: &PageMarkup, platform: &dyn PlatformApi, config: &ShowreelConfig) -> Result<Page> {
        config.validate()?;
        let classifier = MediaClassifier::new(&config.gif_markers);
        let fullscreen = platform.fullscreen();

        let players: Vec<SharedPlayer> = markup
            .videos
            .iter()
            .map(|v| {
                VideoPlayer::new(
                    v.key.clone(),
                    platform.media_element(v),
                    platform.control_surface(v),
                    Rc::clone(&fullscreen),
                    config,
                )
                .shared()
            })
            .collect();
        let find_player = |key: &str| players.iter().find(|p| p.borrow().key() == key).cloned();

        let mut registry = CarouselRegistry::new();
        let mut carousels = Vec::with_capacity(markup.carousels.len());
        for cm in &markup.carousels {
            let slides = cm
                .slides
                .iter()
                .enumerate()
                .map(|(i, slide)| {
                    let kind = classifier.classify_slide(slide);
                    if let (Some(kind), true) = (kind, slide.has_badge) {
                        platform.badge_slot(&cm.id, i).set_badge(kind.badge_label(), kind.data_type());
                    }
                    let video = match &slide.media {
                        Some(MediaMarkup::Video { key }) => find_player(key),
                        _ => None,
                    };
                    Slide::new(kind, platform.slide_marker(&cm.id, i), video)
                })
                .collect();
            let dots = (0..cm.dot_count).map(|i| platform.dot_marker(&cm.id, i)).collect();
            let videos = markup
                .videos
                .iter()
                .filter(|v| v.carousel.as_deref() == Some(cm.id.as_str()))
                .filter_map(|v| find_player(&v.key))
                .collect();
            let initial = cm.slides.iter().position(|s| s.active).unwrap_or(0);

            let carousel = Carousel::mount(
                cm.id.clone(),
                slides,
                dots,
                videos,
                initial,
                config.auto_advance_interval(),
            )?;
            if registry.register(&carousel) {
                carousels.push(carousel);
            } else {
                carousel.borrow_mut().dispose();
            }
        }

        info!("Mounted {} carousel(s) and {} video(s)", carousels.len(), players.len());
        Ok(Page {
            carousels,
            players,
            registry,
            hovered: None,
        })
    }

    pub fn registry(&self) -> &CarouselRegistry {
        &self.registry
    }

    pub fn carousel(&self, id: &str) -> Option<SharedCarousel> {
        self.registry.get(id)
    }

    pub fn carousels(&self) -> &[SharedCarousel] {
        &self.carousels
    }

    pub fn player(&self, key: &str) -> Option<SharedPlayer> {
        self.players.iter().find(|p| p.borrow().key() == key).cloned()
    }

    pub fn players(&self) -> &[SharedPlayer] {
        &self.players
    }

    /// Next/previous buttons
    pub fn change_slide(&self, id: &str, direction: Direction) -> bool {
        self.registry.advance(id, direction)
    }

    /// `+1`/`-1` offsets from next/previous buttons. A zero offset does nothing.
    pub fn change_slide_by(&self, id: &str, offset: i32) -> bool {
        match Direction::from_offset(offset) {
            Some(direction) => self.change_slide(id, direction),
            None => false,
        }
    }

    /// Dot indicators (1-based)
    pub fn current_slide(&self, id: &str, slide_number: usize) -> Result<bool> {
        self.registry.jump_to(id, slide_number)
    }

    pub fn pointer_enter(&mut self, id: &str) {
        if self.registry.hover_enter(id) {
            self.hovered = Some(id.to_string());
        }
    }

    pub fn pointer_leave(&mut self, id: &str) {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        self.registry.hover_leave(id);
    }

    /// Carousel under the pointer, if any
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Page-level key handler: arrows move the hovered carousel.
    pub fn key_down(&self, event: &mut KeyEvent) -> bool {
        let Some(direction) = arrow_direction(event.key()) else {
            return false;
        };
        let Some(id) = self.hovered.as_deref() else {
            return false;
        };
        let handled = self.registry.advance(id, direction);
        if handled {
            event.prevent_default();
        }
        handled
    }

    /// Key handler of a focused video
    pub fn video_key_down(&self, key: &str, event: &mut KeyEvent) -> bool {
        self.with_player(key, |p| p.handle_key(event)).unwrap_or(false)
    }

    /// Play button of a video container
    pub fn toggle_play(&self, key: &str) -> bool {
        self.with_player(key, VideoPlayer::toggle_play).is_some()
    }

    /// Volume button of a video container
    pub fn toggle_mute(&self, key: &str) -> bool {
        self.with_player(key, VideoPlayer::toggle_mute).is_some()
    }

    /// Fullscreen button of a video container
    pub fn toggle_fullscreen(&self, key: &str) -> bool {
        self.with_player(key, VideoPlayer::toggle_fullscreen).is_some()
    }

    /// Click on a video's progress track
    pub fn seek_click(&self, key: &str, offset_x: f64, track_width: f64) -> bool {
        self.with_player(key, |p| p.seek_to_pointer(offset_x, track_width)).is_some()
    }

    fn with_player<R>(&self, key: &str, f: impl FnOnce(&mut VideoPlayer) -> R) -> Option<R> {
        let Some(player) = self.player(key) else {
            debug!("No video registered as '{}'", key);
            return None;
        };
        let mut guard = player.try_borrow_mut().ok()?;
        Some(f(&mut *guard))
    }

    /// Forward a host media notification to its player.
    pub fn media_event(&self, key: &str, event: &MediaEvent) -> bool {
        self.with_player(key, |p| p.handle_media_event(event)).is_some()
    }

    /// Explicit autoplay of the carousel's active slide
    pub fn play_active_video(&self, id: &str) -> bool {
        match self.registry.get(id) {
            Some(carousel) => {
                carousel.borrow().play_active_video();
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            carousels: self
                .carousels
                .iter()
                .map(|c| {
                    let c = c.borrow();
                    CarouselSummary {
                        id: c.id().to_string(),
                        active_index: c.active_index(),
                        state: c.state(),
                        media: c.slides().iter().map(Slide::kind).collect(),
                    }
                })
                .collect(),
            videos: self
                .players
                .iter()
                .map(|p| {
                    let p = p.borrow();
                    VideoSummary {
                        key: p.key().to_string(),
                        phase: p.phase(),
                        playing: p.is_playing(),
                        muted: p.is_muted(),
                        fullscreen: p.is_fullscreen(),
                        current_time: p.current_time(),
                        duration: p.duration(),
                    }
                })
                .collect(),
        }
    }

    /// Cancel every timer. The page stays usable for manual navigation.
    pub fn dispose(&mut self) {
        for carousel in &self.carousels {
            carousel.borrow_mut().dispose();
        }
        self.hovered = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub carousels: Vec<CarouselSummary>,
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselSummary {
    pub id: String,
    pub active_index: usize,
    pub state: CarouselState,
    pub media: Vec<Option<MediaKind>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub key: String,
    pub phase: PlayerPhase,
    pub playing: bool,
    pub muted: bool,
    pub fullscreen: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::scan_document;
    use crate::platform::SimulatedPlatform;
    use tokio::task::LocalSet;

    const PAGE: &str = r#"
<div class="media-carousel" data-carousel="c1">
  <div class="carousel-slide"><img src="a.png"><span class="media-type-badge"></span></div>
  <div class="carousel-slide active"><div class="video-container"><video id="v1" src="v1.mp4"></video></div><span class="media-type-badge"></span></div>
  <span class="dot"></span><span class="dot"></span>
</div>"#;

    #[tokio::test]
    async fn mount_applies_badges_and_markup_active_slide() {
        LocalSet::new()
            .run_until(async {
                let platform = SimulatedPlatform::new();
                let markup = scan_document(PAGE, None).unwrap();
                let page = Page::mount(&markup, &platform, &ShowreelConfig::default()).unwrap();

                assert_eq!(platform.badge("c1", 0).unwrap().label().as_deref(), Some("IMG"));
                assert_eq!(platform.badge("c1", 1).unwrap().data_type().as_deref(), Some("video"));
                assert_eq!(platform.active_slides("c1"), vec![1]);
                assert_eq!(platform.active_dots("c1"), vec![1]);

                let summary = page.summary();
                assert_eq!(summary.carousels[0].active_index, 1);
                assert_eq!(summary.carousels[0].media, vec![Some(MediaKind::Image), Some(MediaKind::Video)]);
                assert_eq!(summary.videos[0].key, "v1");
                assert!(summary.videos[0].muted);
            })
            .await;
    }

    #[tokio::test]
    async fn arrows_only_move_the_hovered_carousel() {
        LocalSet::new()
            .run_until(async {
                let platform = SimulatedPlatform::new();
                let markup = scan_document(PAGE, None).unwrap();
                let mut page = Page::mount(&markup, &platform, &ShowreelConfig::default()).unwrap();

                let mut ev = KeyEvent::new("ArrowRight");
                assert!(!page.key_down(&mut ev));
                assert!(!ev.default_prevented());

                page.pointer_enter("c1");
                assert_eq!(page.hovered(), Some("c1"));
                let mut ev = KeyEvent::new("ArrowRight");
                assert!(page.key_down(&mut ev));
                assert!(ev.default_prevented());
                assert_eq!(platform.active_slides("c1"), vec![0]);

                page.pointer_leave("c1");
                assert_eq!(page.hovered(), None);
                let mut ev = KeyEvent::new("ArrowLeft");
                assert!(!page.key_down(&mut ev));
            })
            .await;
    }

    #[tokio::test]
    async fn control_buttons_route_by_video_key() {
        LocalSet::new()
            .run_until(async {
                let platform = SimulatedPlatform::new();
                let markup = scan_document(PAGE, None).unwrap();
                let page = Page::mount(&markup, &platform, &ShowreelConfig::default()).unwrap();

                assert!(page.toggle_mute("v1"));
                assert!(!page.player("v1").unwrap().borrow().is_muted());
                assert!(page.toggle_fullscreen("v1"));
                assert!(page.player("v1").unwrap().borrow().is_fullscreen());

                platform.media("v1").unwrap().load_metadata(60.0);
                assert!(page.seek_click("v1", 50.0, 100.0));
                assert_eq!(page.player("v1").unwrap().borrow().current_time(), 30.0);

                assert!(!page.toggle_play("missing"));
                assert!(!page.media_event("missing", &MediaEvent::CanPlay));
            })
            .await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        LocalSet::new()
            .run_until(async {
                let platform = SimulatedPlatform::new();
                let config = ShowreelConfig { auto_advance_ms: 0, ..Default::default() };
                let res = Page::mount(&PageMarkup::default(), &platform, &config);
                assert!(res.is_err());
            })
            .await;
    }
}
