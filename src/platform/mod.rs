//! Host surface: media elements, control strips, active markers, badges and
//! fullscreen.
//!
//! The controllers only talk to the page through these traits. The simulated
//! implementations keep everything in memory so a page can be mounted and
//! driven headlessly, which is what the CLI and the tests do.

pub mod fullscreen;
pub mod media;
pub mod surface;

pub use fullscreen::{FullscreenApi, FullscreenVariant, VendorFullscreen};
pub use media::{AutoplayPolicy, MediaElement, MediaEvent, MediaState, SimulatedMedia};
pub use surface::{
    ActiveMarker, BadgeCell, BadgeSlot, ControlSurface, ErrorPanel, FullscreenIcon, MarkerCell,
    MuteIcon, PanelAction, PlayIcon, RecordingSurface, SurfaceState,
};

use crate::markup::VideoMarkup;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Factory for the host handles bound to scanned markup.
pub trait PlatformApi {
    fn media_element(&self, video: &VideoMarkup) -> Rc<dyn MediaElement>;
    fn control_surface(&self, video: &VideoMarkup) -> Rc<dyn ControlSurface>;
    fn slide_marker(&self, carousel: &str, index: usize) -> Rc<dyn ActiveMarker>;
    fn dot_marker(&self, carousel: &str, index: usize) -> Rc<dyn ActiveMarker>;
    fn badge_slot(&self, carousel: &str, index: usize) -> Rc<dyn BadgeSlot>;
    fn fullscreen(&self) -> Rc<dyn FullscreenApi>;
}

/// Headless platform. Every handle it hands out is kept so callers can look
/// at it afterwards.
pub struct SimulatedPlatform {
    policy: Cell<AutoplayPolicy>,
    fullscreen: Rc<VendorFullscreen>,
    media: RefCell<HashMap<String, SimulatedMedia>>,
    surfaces: RefCell<HashMap<String, Rc<RecordingSurface>>>,
    slides: RefCell<HashMap<(String, usize), Rc<MarkerCell>>>,
    dots: RefCell<HashMap<(String, usize), Rc<MarkerCell>>>,
    badges: RefCell<HashMap<(String, usize), Rc<BadgeCell>>>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::with_fullscreen(VendorFullscreen::default())
    }

    pub fn with_fullscreen(fullscreen: VendorFullscreen) -> Self {
        SimulatedPlatform {
            policy: Cell::new(AutoplayPolicy::MutedOnly),
            fullscreen: Rc::new(fullscreen),
            media: RefCell::new(HashMap::new()),
            surfaces: RefCell::new(HashMap::new()),
            slides: RefCell::new(HashMap::new()),
            dots: RefCell::new(HashMap::new()),
            badges: RefCell::new(HashMap::new()),
        }
    }

    /// Policy given to media elements created from now on
    pub fn set_autoplay_policy(&self, policy: AutoplayPolicy) {
        self.policy.set(policy);
    }

    pub fn media(&self, key: &str) -> Option<SimulatedMedia> {
        self.media.borrow().get(key).cloned()
    }

    pub fn surface(&self, key: &str) -> Option<Rc<RecordingSurface>> {
        self.surfaces.borrow().get(key).cloned()
    }

    pub fn slide(&self, carousel: &str, index: usize) -> Option<Rc<MarkerCell>> {
        self.slides.borrow().get(&(carousel.to_string(), index)).cloned()
    }

    pub fn dot(&self, carousel: &str, index: usize) -> Option<Rc<MarkerCell>> {
        self.dots.borrow().get(&(carousel.to_string(), index)).cloned()
    }

    pub fn badge(&self, carousel: &str, index: usize) -> Option<Rc<BadgeCell>> {
        self.badges.borrow().get(&(carousel.to_string(), index)).cloned()
    }

    pub fn fullscreen_state(&self) -> Rc<VendorFullscreen> {
        Rc::clone(&self.fullscreen)
    }

    /// Indices of the slides currently marked active
    pub fn active_slides(&self, carousel: &str) -> Vec<usize> {
        Self::active_in(&self.slides.borrow(), carousel)
    }

    /// Indices of the dots currently marked active
    pub fn active_dots(&self, carousel: &str) -> Vec<usize> {
        Self::active_in(&self.dots.borrow(), carousel)
    }

    fn active_in(cells: &HashMap<(String, usize), Rc<MarkerCell>>, carousel: &str) -> Vec<usize> {
        let mut active: Vec<usize> = cells
            .iter()
            .filter(|((id, _), cell)| id == carousel && cell.is_active())
            .map(|((_, index), _)| *index)
            .collect();
        active.sort_unstable();
        active
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for SimulatedPlatform {
    fn media_element(&self, video: &VideoMarkup) -> Rc<dyn MediaElement> {
        let media = self
            .media
            .borrow_mut()
            .entry(video.key.clone())
            .or_insert_with(|| {
                let m = SimulatedMedia::new(video.sources.first().cloned());
                m.set_policy(self.policy.get());
                m
            })
            .clone();
        Rc::new(media)
    }

    fn control_surface(&self, video: &VideoMarkup) -> Rc<dyn ControlSurface> {
        let surface = Rc::clone(
            self.surfaces
                .borrow_mut()
                .entry(video.key.clone())
                .or_insert_with(|| Rc::new(RecordingSurface::with_controls(video.controls))),
        );
        surface
    }

    fn slide_marker(&self, carousel: &str, index: usize) -> Rc<dyn ActiveMarker> {
        let cell = Rc::clone(
            self.slides
                .borrow_mut()
                .entry((carousel.to_string(), index))
                .or_insert_with(|| Rc::new(MarkerCell::new())),
        );
        cell
    }

    fn dot_marker(&self, carousel: &str, index: usize) -> Rc<dyn ActiveMarker> {
        let cell = Rc::clone(
            self.dots
                .borrow_mut()
                .entry((carousel.to_string(), index))
                .or_insert_with(|| Rc::new(MarkerCell::new())),
        );
        cell
    }

    fn badge_slot(&self, carousel: &str, index: usize) -> Rc<dyn BadgeSlot> {
        let cell = Rc::clone(
            self.badges
                .borrow_mut()
                .entry((carousel.to_string(), index))
                .or_insert_with(|| Rc::new(BadgeCell::new())),
        );
        cell
    }

    fn fullscreen(&self) -> Rc<dyn FullscreenApi> {
        let fs = Rc::clone(&self.fullscreen);
        fs
    }
}
