//! Video playback controller: one video element plus its control strip.
//!
//! Play requests are fire-and-forget tasks spawned on the current
//! [`tokio::task::LocalSet`]; a rejected request is logged and never surfaced.
//! Whether a video is playing is always read back from the element itself.

use crate::input::{KeyEvent, VideoShortcut};
use crate::platform::{
    ControlSurface, ErrorPanel, FullscreenApi, FullscreenIcon, MediaElement, MediaEvent, MuteIcon,
    PlayIcon,
};
use crate::ShowreelConfig;
use log::{debug, error, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Load lifecycle of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPhase {
    Loading,
    Ready,
    /// A load error occurred and the source is being reloaded
    Recovering,
    /// Terminal: the container shows the error panel
    Failed,
}

pub type SharedPlayer = Rc<RefCell<VideoPlayer>>;

pub struct VideoPlayer {
    key: String,
    element: Rc<dyn MediaElement>,
    surface: Rc<dyn ControlSurface>,
    fullscreen: Rc<dyn FullscreenApi>,
    phase: PlayerPhase,
    start_muted: bool,
    retry_limit: u32,
    retries_left: u32,
}

impl VideoPlayer {
    pub fn new(
        key: impl Into<String>,
        element: Rc<dyn MediaElement>,
        surface: Rc<dyn ControlSurface>,
        fullscreen: Rc<dyn FullscreenApi>,
        config: &ShowreelConfig,
    ) -> Self {
        // Autoplay is only permitted for muted media
        element.set_muted(config.start_muted);
        element.set_plays_inline(true);

        surface.set_play_icon(if element.is_paused() { PlayIcon::Play } else { PlayIcon::Pause });
        surface.set_mute_icon(mute_icon(element.is_muted()));
        surface.set_fullscreen_icon(FullscreenIcon::Expand);

        VideoPlayer {
            key: key.into(),
            element,
            surface,
            fullscreen,
            phase: PlayerPhase::Loading,
            start_muted: config.start_muted,
            retry_limit: config.media_retry_limit,
            retries_left: config.media_retry_limit,
        }
    }

    pub fn shared(self) -> SharedPlayer {
        Rc::new(RefCell::new(self))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn is_failed(&self) -> bool {
        self.phase == PlayerPhase::Failed
    }

    pub fn is_playing(&self) -> bool {
        !self.element.is_paused()
    }

    pub fn is_muted(&self) -> bool {
        self.element.is_muted()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.fullscreen_element().as_deref() == Some(self.key.as_str())
    }

    pub fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    /// Duration in seconds once metadata is known
    pub fn duration(&self) -> Option<f64> {
        self.element.duration().filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Play when paused, pause when playing.
    ///
    /// Must run inside a `LocalSet`: the play request is spawned with
    /// `spawn_local`.
    pub fn toggle_play(&mut self) {
        if self.is_failed() {
            return;
        }
        if self.element.is_paused() {
            self.surface.set_play_icon(PlayIcon::Pause);
            self.spawn_play("play");
        } else {
            self.element.pause();
            self.surface.set_play_icon(PlayIcon::Play);
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.is_failed() {
            return;
        }
        let muted = !self.element.is_muted();
        self.element.set_muted(muted);
        self.surface.set_mute_icon(mute_icon(muted));
    }

    /// Enter fullscreen, or leave it when this video is the fullscreen
    /// element. Hosts without a fullscreen API make this a no-op.
    pub fn toggle_fullscreen(&mut self) {
        if self.is_failed() {
            return;
        }
        let leaving = self.is_fullscreen();
        let res = if leaving {
            self.fullscreen.exit_fullscreen()
        } else {
            self.fullscreen.request_fullscreen(&self.key)
        };
        match res {
            Ok(()) => self.surface.set_fullscreen_icon(if leaving {
                FullscreenIcon::Expand
            } else {
                FullscreenIcon::Compress
            }),
            Err(e) => debug!("Fullscreen toggle ignored for '{}': {}", self.key, e),
        }
    }

    /// Jump to `fraction` of the duration. No-op until the duration is known.
    pub fn seek(&mut self, fraction: f64) {
        if self.is_failed() || !fraction.is_finite() {
            return;
        }
        let Some(duration) = self.duration() else {
            debug!("Seek on '{}' ignored: duration not known yet", self.key);
            return;
        };
        self.element.set_current_time(fraction.clamp(0.0, 1.0) * duration);
        self.on_time_update();
    }

    /// Seek from a click on the progress track.
    pub fn seek_to_pointer(&mut self, offset_x: f64, track_width: f64) {
        if track_width > 0.0 {
            self.seek(offset_x / track_width);
        }
    }

    pub fn on_time_update(&mut self) {
        let current = self.element.current_time();
        let percent = match self.duration() {
            Some(d) => (current / d * 100.0).clamp(0.0, 100.0),
            None => 0.0,
        };
        self.surface.set_progress(percent);
        self.surface.set_elapsed_text(&format_clock(current));
    }

    /// Unconditional pause, used on every slide change.
    pub fn pause(&mut self) {
        if self.is_failed() {
            return;
        }
        self.element.pause();
        self.surface.set_play_icon(PlayIcon::Play);
    }

    /// Best-effort autoplay. A blocked request is logged and the video stays
    /// paused until the user starts it.
    pub fn play_if_active(&mut self) {
        if self.is_failed() || !self.element.is_paused() {
            return;
        }
        self.spawn_play("autoplay");
    }

    pub fn handle_media_event(&mut self, event: &MediaEvent) {
        if self.is_failed() {
            return;
        }
        match event {
            MediaEvent::LoadStart => {
                if self.phase != PlayerPhase::Recovering {
                    self.phase = PlayerPhase::Loading;
                }
                self.surface.set_loading(true);
            }
            MediaEvent::LoadedMetadata => {
                let text = self.duration().map(format_clock).unwrap_or_else(|| format_clock(f64::NAN));
                self.surface.set_duration_text(&text);
                if self.start_muted {
                    self.element.set_muted(true);
                    self.surface.set_mute_icon(MuteIcon::Muted);
                }
            }
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::CanPlay => {
                self.phase = PlayerPhase::Ready;
                self.retries_left = self.retry_limit;
                self.surface.set_loading(false);
            }
            MediaEvent::Play => self.surface.set_play_icon(PlayIcon::Pause),
            MediaEvent::Pause => self.surface.set_play_icon(PlayIcon::Play),
            MediaEvent::Error(reason) => self.on_error(reason),
        }
    }

    /// Shortcuts for a focused video. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: &mut KeyEvent) -> bool {
        if self.is_failed() {
            return false;
        }
        let Some(shortcut) = VideoShortcut::from_key(event.key()) else {
            return false;
        };
        event.prevent_default();
        match shortcut {
            VideoShortcut::TogglePlay => self.toggle_play(),
            VideoShortcut::ToggleMute => self.toggle_mute(),
            VideoShortcut::ToggleFullscreen => self.toggle_fullscreen(),
        }
        true
    }

    fn on_error(&mut self, reason: &str) {
        if self.retries_left > 0 {
            self.retries_left -= 1;
            self.phase = PlayerPhase::Recovering;
            warn!(
                "Video '{}' failed to load ({}); reloading {}",
                self.key,
                reason,
                self.element.source().unwrap_or_default()
            );
            self.element.reload();
            return;
        }

        error!("Video '{}' failed to load: {}", self.key, reason);
        self.phase = PlayerPhase::Failed;
        self.element.pause();
        self.surface.show_error_panel(&ErrorPanel::load_failed());
    }

    fn spawn_play(&self, what: &'static str) {
        let request = self.element.request_play();
        let element = Rc::clone(&self.element);
        let surface = Rc::clone(&self.surface);
        let key = self.key.clone();
        tokio::task::spawn_local(async move {
            if let Err(e) = request.await {
                warn!("Video '{}' {} prevented: {}", key, what, e);
                if element.is_paused() {
                    surface.set_play_icon(PlayIcon::Play);
                }
            }
        });
    }
}

impl fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("key", &self.key)
            .field("phase", &self.phase)
            .field("playing", &self.is_playing())
            .field("muted", &self.is_muted())
            .field("retries_left", &self.retries_left)
            .finish()
    }
}

fn mute_icon(muted: bool) -> MuteIcon {
    if muted {
        MuteIcon::Muted
    } else {
        MuteIcon::Unmuted
    }
}

/// `m:ss` clock text. Anything that is not a finite, non-negative number of
/// seconds renders as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
