/// Visible page state the controllers write to: control icons, progress,
/// active markers and badges.

use crate::markup::VideoControls;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

impl PlayIcon {
    pub fn css_class(&self) -> &'static str {
        match self {
            PlayIcon::Play => "fas fa-play",
            PlayIcon::Pause => "fas fa-pause",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteIcon {
    Muted,
    Unmuted,
}

impl MuteIcon {
    pub fn css_class(&self) -> &'static str {
        match self {
            MuteIcon::Muted => "fas fa-volume-mute",
            MuteIcon::Unmuted => "fas fa-volume-up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenIcon {
    Expand,
    Compress,
}

impl FullscreenIcon {
    pub fn css_class(&self) -> &'static str {
        match self {
            FullscreenIcon::Expand => "fas fa-expand",
            FullscreenIcon::Compress => "fas fa-compress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    ReloadPage,
    FormatHelp,
}

impl PanelAction {
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::ReloadPage => "Reload page",
            PanelAction::FormatHelp => "Supported formats",
        }
    }
}

/// Static panel that replaces a video container after a terminal load failure
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPanel {
    pub title: String,
    pub message: String,
    pub actions: Vec<PanelAction>,
}

impl ErrorPanel {
    pub fn load_failed() -> Self {
        ErrorPanel {
            title: "Video failed to load".to_string(),
            message: "This video file could not be played".to_string(),
            actions: vec![PanelAction::ReloadPage, PanelAction::FormatHelp],
        }
    }
}

/// Control strip of one video container.
///
/// Hosts whose container lacks a given control simply ignore the call.
pub trait ControlSurface {
    fn set_play_icon(&self, icon: PlayIcon);
    fn set_mute_icon(&self, icon: MuteIcon);
    fn set_fullscreen_icon(&self, icon: FullscreenIcon);
    /// Progress fill in percent, already clamped to `[0, 100]`
    fn set_progress(&self, percent: f64);
    fn set_elapsed_text(&self, text: &str);
    fn set_duration_text(&self, text: &str);
    fn set_loading(&self, loading: bool);
    /// Replace the container's content with `panel`
    fn show_error_panel(&self, panel: &ErrorPanel);
}

/// The `active` class on a slide or a dot indicator
pub trait ActiveMarker {
    fn set_active(&self, active: bool);
    fn is_active(&self) -> bool;
}

/// Badge placeholder of a slide
pub trait BadgeSlot {
    fn set_badge(&self, label: &str, data_type: &str);
}

/// Last values written to a control surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub play_icon: PlayIcon,
    pub mute_icon: MuteIcon,
    pub fullscreen_icon: FullscreenIcon,
    pub progress: f64,
    pub elapsed: String,
    pub duration: String,
    pub loading: bool,
    pub error_panel: Option<ErrorPanel>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        SurfaceState {
            play_icon: PlayIcon::Play,
            mute_icon: MuteIcon::Unmuted,
            fullscreen_icon: FullscreenIcon::Expand,
            progress: 0.0,
            elapsed: "0:00".to_string(),
            duration: "0:00".to_string(),
            loading: false,
            error_panel: None,
        }
    }
}

/// Control surface that records what it was told.
///
/// Writes aimed at a control the container does not have are dropped, the
/// way a page without that element would drop them.
#[derive(Debug)]
pub struct RecordingSurface {
    controls: VideoControls,
    state: RefCell<SurfaceState>,
}

impl RecordingSurface {
    /// A surface with every control present
    pub fn new() -> Self {
        Self::with_controls(VideoControls::full())
    }

    pub fn with_controls(controls: VideoControls) -> Self {
        RecordingSurface {
            controls,
            state: RefCell::new(SurfaceState::default()),
        }
    }

    pub fn controls(&self) -> VideoControls {
        self.controls
    }

    pub fn snapshot(&self) -> SurfaceState {
        self.state.borrow().clone()
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSurface for RecordingSurface {
    fn set_play_icon(&self, icon: PlayIcon) {
        if self.controls.play_button {
            self.state.borrow_mut().play_icon = icon;
        }
    }

    fn set_mute_icon(&self, icon: MuteIcon) {
        if self.controls.mute_button {
            self.state.borrow_mut().mute_icon = icon;
        }
    }

    fn set_fullscreen_icon(&self, icon: FullscreenIcon) {
        if self.controls.fullscreen_button {
            self.state.borrow_mut().fullscreen_icon = icon;
        }
    }

    fn set_progress(&self, percent: f64) {
        if self.controls.progress {
            self.state.borrow_mut().progress = percent;
        }
    }

    fn set_elapsed_text(&self, text: &str) {
        if self.controls.elapsed {
            self.state.borrow_mut().elapsed = text.to_string();
        }
    }

    fn set_duration_text(&self, text: &str) {
        if self.controls.duration {
            self.state.borrow_mut().duration = text.to_string();
        }
    }

    fn set_loading(&self, loading: bool) {
        self.state.borrow_mut().loading = loading;
    }

    fn show_error_panel(&self, panel: &ErrorPanel) {
        let mut s = self.state.borrow_mut();
        s.loading = false;
        s.error_panel = Some(panel.clone());
    }
}

#[derive(Debug, Default)]
pub struct MarkerCell {
    active: Cell<bool>,
}

impl MarkerCell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActiveMarker for MarkerCell {
    fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[derive(Debug, Default)]
pub struct BadgeCell {
    badge: RefCell<Option<(String, String)>>,
}

impl BadgeCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> Option<String> {
        self.badge.borrow().as_ref().map(|(label, _)| label.clone())
    }

    pub fn data_type(&self) -> Option<String> {
        self.badge.borrow().as_ref().map(|(_, ty)| ty.clone())
    }
}

impl BadgeSlot for BadgeCell {
    fn set_badge(&self, label: &str, data_type: &str) {
        *self.badge.borrow_mut() = Some((label.to_string(), data_type.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_panel_replaces_loading_state() {
        let s = RecordingSurface::new();
        s.set_loading(true);
        s.show_error_panel(&ErrorPanel::load_failed());
        let snap = s.snapshot();
        assert!(!snap.loading);
        let panel = snap.error_panel.expect("panel shown");
        assert_eq!(panel.actions, vec![PanelAction::ReloadPage, PanelAction::FormatHelp]);
    }

    #[test]
    fn missing_controls_drop_their_writes() {
        let s = RecordingSurface::with_controls(VideoControls {
            play_button: true,
            ..Default::default()
        });
        s.set_play_icon(PlayIcon::Pause);
        s.set_progress(40.0);
        s.set_elapsed_text("0:12");
        s.set_mute_icon(MuteIcon::Muted);
        s.set_loading(true);

        let snap = s.snapshot();
        assert_eq!(snap.play_icon, PlayIcon::Pause);
        assert_eq!(snap.progress, 0.0);
        assert_eq!(snap.elapsed, "0:00");
        assert_eq!(snap.mute_icon, MuteIcon::Unmuted);
        assert!(snap.loading);
    }

    #[test]
    fn icon_classes() {
        assert_eq!(PlayIcon::Pause.css_class(), "fas fa-pause");
        assert_eq!(MuteIcon::Muted.css_class(), "fas fa-volume-mute");
        assert_eq!(FullscreenIcon::Compress.css_class(), "fas fa-compress");
    }
}
