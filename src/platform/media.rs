/// Media element hooks and the lifecycle events a host reports for them

use crate::{Error, Result};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Playing,
    Paused,
    Ended,
}

/// Notifications a host media element emits over its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadStart,
    LoadedMetadata,
    TimeUpdate,
    CanPlay,
    Play,
    Pause,
    Error(String),
}

/// One playable video element owned by the host.
///
/// Play requests are asynchronous and may be rejected by the host. The
/// returned future only reports the outcome of the request; the element's own
/// paused flag stays authoritative for the playback state. A `pause` or
/// `reload` issued before a request settles aborts it.
pub trait MediaElement {
    fn is_paused(&self) -> bool;
    fn request_play(&self) -> LocalBoxFuture<'static, Result<()>>;
    fn pause(&self);
    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn set_plays_inline(&self, inline: bool);
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;
    /// Re-run the resource selection for the current source
    fn reload(&self);
    fn source(&self) -> Option<String>;
}

/// How a simulated element answers play requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayPolicy {
    Allowed,
    /// Only muted playback starts without a user gesture
    MutedOnly,
    Blocked,
}

#[derive(Debug)]
struct SimulatedState {
    state: MediaState,
    muted: bool,
    plays_inline: bool,
    current_time: f64,
    duration: Option<f64>,
    policy: AutoplayPolicy,
    source: Option<String>,
    reloads: u32,
    play_requests: u32,
    /// Bumped by pause and reload; pending requests from an older generation abort
    generation: u64,
}

/// In-memory media element for headless runs and tests
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    inner: Rc<RefCell<SimulatedState>>,
}

impl SimulatedMedia {
    pub fn new(source: Option<String>) -> Self {
        SimulatedMedia {
            inner: Rc::new(RefCell::new(SimulatedState {
                state: MediaState::Paused,
                muted: false,
                plays_inline: false,
                current_time: 0.0,
                duration: None,
                policy: AutoplayPolicy::MutedOnly,
                source,
                reloads: 0,
                play_requests: 0,
                generation: 0,
            })),
        }
    }

    pub fn set_policy(&self, policy: AutoplayPolicy) {
        self.inner.borrow_mut().policy = policy;
    }

    /// Pretend the metadata arrived with the given duration in seconds.
    pub fn load_metadata(&self, duration: f64) {
        self.inner.borrow_mut().duration = Some(duration);
    }

    /// Move the playhead as if playback ran for `seconds`.
    pub fn advance_time(&self, seconds: f64) {
        let mut s = self.inner.borrow_mut();
        let next = s.current_time + seconds;
        s.current_time = match s.duration {
            Some(d) => next.clamp(0.0, d),
            None => next.max(0.0),
        };
        if s.duration == Some(s.current_time) && s.state == MediaState::Playing {
            s.state = MediaState::Ended;
        }
    }

    pub fn state(&self) -> MediaState {
        self.inner.borrow().state
    }

    pub fn plays_inline(&self) -> bool {
        self.inner.borrow().plays_inline
    }

    pub fn reload_count(&self) -> u32 {
        self.inner.borrow().reloads
    }

    pub fn play_request_count(&self) -> u32 {
        self.inner.borrow().play_requests
    }
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MediaElement for SimulatedMedia {
    fn is_paused(&self) -> bool {
        self.inner.borrow().state != MediaState::Playing
    }

    fn request_play(&self) -> LocalBoxFuture<'static, Result<()>> {
        let issued = {
            let mut s = self.inner.borrow_mut();
            s.play_requests += 1;
            s.generation
        };
        let inner = Rc::clone(&self.inner);
        async move {
            let mut s = inner.borrow_mut();
            if s.generation != issued {
                return Err(Error::PlaybackRejected(
                    "AbortError: the play() request was interrupted by a call to pause()".to_string(),
                ));
            }
            let allowed = match s.policy {
                AutoplayPolicy::Allowed => true,
                AutoplayPolicy::MutedOnly => s.muted,
                AutoplayPolicy::Blocked => false,
            };
            if !allowed {
                return Err(Error::PlaybackRejected(
                    "NotAllowedError: play() failed because the user didn't interact with the document first"
                        .to_string(),
                ));
            }
            s.state = MediaState::Playing;
            Ok(())
        }
        .boxed_local()
    }

    fn pause(&self) {
        let mut s = self.inner.borrow_mut();
        s.generation += 1;
        if s.state == MediaState::Playing {
            s.state = MediaState::Paused;
        }
    }

    fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    fn set_muted(&self, muted: bool) {
        self.inner.borrow_mut().muted = muted;
    }

    fn set_plays_inline(&self, inline: bool) {
        self.inner.borrow_mut().plays_inline = inline;
    }

    fn current_time(&self) -> f64 {
        self.inner.borrow().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        let mut s = self.inner.borrow_mut();
        s.current_time = match s.duration {
            Some(d) => seconds.clamp(0.0, d),
            None => seconds.max(0.0),
        };
    }

    fn duration(&self) -> Option<f64> {
        self.inner.borrow().duration
    }

    fn reload(&self) {
        let mut s = self.inner.borrow_mut();
        s.reloads += 1;
        s.generation += 1;
        s.state = MediaState::Paused;
        s.current_time = 0.0;
        s.duration = None;
    }

    fn source(&self) -> Option<String> {
        self.inner.borrow().source.clone()
    }
}
