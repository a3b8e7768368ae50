//! Carousel controller: active slide, dot indicators and the auto-advance
//! timer.
//!
//! A carousel owns at most one timer task at a time. Every transition between
//! running and paused goes through [`Carousel::set_running`], which aborts the
//! previous task before spawning a new one.

use crate::classify::MediaKind;
use crate::platform::ActiveMarker;
use crate::video::SharedPlayer;
use crate::{Error, Result};
use log::debug;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }

    /// `+1`/`-1` style offsets as used by next/previous buttons
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset.signum() {
            1 => Some(Direction::Next),
            -1 => Some(Direction::Previous),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselState {
    Running,
    Paused,
}

/// One item of the rotation
pub struct Slide {
    kind: Option<MediaKind>,
    marker: Rc<dyn ActiveMarker>,
    video: Option<SharedPlayer>,
}

impl Slide {
    pub fn new(kind: Option<MediaKind>, marker: Rc<dyn ActiveMarker>, video: Option<SharedPlayer>) -> Self {
        Slide { kind, marker, video }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.kind
    }

    pub fn video(&self) -> Option<&SharedPlayer> {
        self.video.as_ref()
    }
}

pub type SharedCarousel = Rc<RefCell<Carousel>>;

pub struct Carousel {
    id: String,
    slides: Vec<Slide>,
    dots: Vec<Rc<dyn ActiveMarker>>,
    /// Every video inside the carousel, paused on each transition
    videos: Vec<SharedPlayer>,
    active: usize,
    interval: Duration,
    state: CarouselState,
    timer: Option<JoinHandle<()>>,
    disposed: bool,
    this: Weak<RefCell<Carousel>>,
}

impl Carousel {
    /// Build a carousel, normalize its markers so only `initial` is active and
    /// start auto-advancing.
    ///
    /// Must be called inside a `LocalSet`.
    pub fn mount(
        id: impl Into<String>,
        slides: Vec<Slide>,
        dots: Vec<Rc<dyn ActiveMarker>>,
        videos: Vec<SharedPlayer>,
        initial: usize,
        interval: Duration,
    ) -> Result<SharedCarousel> {
        let id = id.into();
        if slides.is_empty() {
            return Err(Error::MarkupError(format!("carousel '{}' has no slides", id)));
        }
        if interval.is_zero() {
            return Err(Error::ConfigError("auto-advance interval must be positive".into()));
        }
        let active = if initial < slides.len() { initial } else { 0 };

        let carousel = Rc::new_cyclic(|this| {
            RefCell::new(Carousel {
                id,
                slides,
                dots,
                videos,
                active,
                interval,
                state: CarouselState::Paused,
                timer: None,
                disposed: false,
                this: this.clone(),
            })
        });

        {
            let mut c = carousel.borrow_mut();
            c.deactivate_all();
            c.mark(c.active, true);
            c.set_running(true);
        }
        Ok(carousel)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn videos(&self) -> &[SharedPlayer] {
        &self.videos
    }

    /// Whether an auto-advance task is currently scheduled
    pub fn is_timer_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Move one slide forward or back, wrapping at both ends.
    pub fn advance(&mut self, direction: Direction) {
        let len = self.slides.len() as isize;
        let next = (self.active as isize + direction.offset()).rem_euclid(len) as usize;

        self.mark(self.active, false);
        self.active = next;
        self.mark(next, true);
        self.pause_all_videos();
    }

    /// Show the slide with the given 1-based number.
    pub fn jump_to(&mut self, slide_number: usize) -> Result<()> {
        if slide_number == 0 || slide_number > self.slides.len() {
            return Err(Error::SlideOutOfRange {
                carousel: self.id.clone(),
                slide: slide_number,
                len: self.slides.len(),
            });
        }

        self.deactivate_all();
        self.active = slide_number - 1;
        self.mark(self.active, true);
        self.pause_all_videos();
        Ok(())
    }

    /// Cancel the current timer, then schedule a fresh one when `running`.
    pub fn set_running(&mut self, running: bool) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if running && !self.disposed {
            self.timer = Some(self.spawn_timer());
            self.state = CarouselState::Running;
        } else {
            self.state = CarouselState::Paused;
        }
    }

    pub fn hover_enter(&mut self) {
        self.set_running(false);
    }

    pub fn hover_leave(&mut self) {
        self.set_running(true);
    }

    /// Stop auto-advancing for good.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.set_running(false);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Best-effort autoplay of the active slide's video. Slide changes never
    /// do this on their own.
    pub fn play_active_video(&self) {
        if let Some(video) = self.slides[self.active].video() {
            match video.try_borrow_mut() {
                Ok(mut player) => player.play_if_active(),
                Err(_) => debug!("Video of carousel '{}' busy; skipping autoplay", self.id),
            }
        }
    }

    fn pause_all_videos(&self) {
        for video in &self.videos {
            match video.try_borrow_mut() {
                Ok(mut player) => player.pause(),
                Err(_) => debug!("Video of carousel '{}' busy; not paused", self.id),
            }
        }
    }

    fn deactivate_all(&self) {
        for slide in &self.slides {
            slide.marker.set_active(false);
        }
        for dot in &self.dots {
            dot.set_active(false);
        }
    }

    fn mark(&self, index: usize, active: bool) {
        self.slides[index].marker.set_active(active);
        match self.dots.get(index) {
            Some(dot) => dot.set_active(active),
            None => debug!("Carousel '{}' has no dot for slide {}", self.id, index),
        }
    }

    fn spawn_timer(&self) -> JoinHandle<()> {
        let this = self.this.clone();
        let period = self.interval;
        let id = self.id.clone();
        tokio::task::spawn_local(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(carousel) = this.upgrade() else {
                    break;
                };
                match carousel.try_borrow_mut() {
                    Ok(mut c) => c.advance(Direction::Next),
                    Err(_) => debug!("Carousel '{}' busy; skipping auto-advance tick", id),
                };
            }
        })
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl fmt::Debug for Carousel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("id", &self.id)
            .field("slides", &self.slides.len())
            .field("dots", &self.dots.len())
            .field("active", &self.active)
            .field("state", &self.state)
            .field("timer_armed", &self.is_timer_armed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MarkerCell;
    use tokio::task::LocalSet;

    struct Fixture {
        carousel: SharedCarousel,
        slides: Vec<Rc<MarkerCell>>,
        dots: Vec<Rc<MarkerCell>>,
    }

    fn build(n: usize, dot_count: usize) -> Fixture {
        let slides: Vec<Rc<MarkerCell>> = (0..n).map(|_| Rc::new(MarkerCell::new())).collect();
        let dots: Vec<Rc<MarkerCell>> = (0..dot_count).map(|_| Rc::new(MarkerCell::new())).collect();
        let carousel = Carousel::mount(
            "c",
            slides
                .iter()
                .map(|m| Slide::new(Some(MediaKind::Image), m.clone(), None))
                .collect(),
            dots.iter().map(|d| d.clone() as Rc<dyn ActiveMarker>).collect(),
            Vec::new(),
            0,
            Duration::from_millis(4000),
        )
        .unwrap();
        Fixture { carousel, slides, dots }
    }

    fn active(cells: &[Rc<MarkerCell>]) -> Vec<usize> {
        cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    #[tokio::test]
    async fn advancing_n_times_returns_to_start() {
        LocalSet::new()
            .run_until(async {
                for n in 1..=5 {
                    let f = build(n, n);
                    let mut c = f.carousel.borrow_mut();
                    for _ in 0..n {
                        c.advance(Direction::Next);
                        assert_eq!(active(&f.slides).len(), 1);
                        assert_eq!(active(&f.dots).len(), 1);
                    }
                    assert_eq!(c.active_index(), 0);
                }
            })
            .await;
    }

    #[tokio::test]
    async fn previous_from_first_wraps_to_last() {
        LocalSet::new()
            .run_until(async {
                let f = build(4, 4);
                f.carousel.borrow_mut().advance(Direction::Previous);
                assert_eq!(f.carousel.borrow().active_index(), 3);
                assert_eq!(active(&f.slides), vec![3]);
                assert_eq!(active(&f.dots), vec![3]);
            })
            .await;
    }

    #[tokio::test]
    async fn single_slide_cycles_onto_itself() {
        LocalSet::new()
            .run_until(async {
                let f = build(1, 1);
                let mut c = f.carousel.borrow_mut();
                c.advance(Direction::Next);
                c.advance(Direction::Previous);
                assert_eq!(c.active_index(), 0);
                assert_eq!(active(&f.slides), vec![0]);
            })
            .await;
    }

    #[tokio::test]
    async fn jump_to_is_one_based_and_checked() {
        LocalSet::new()
            .run_until(async {
                let f = build(3, 3);
                let mut c = f.carousel.borrow_mut();
                c.jump_to(3).unwrap();
                assert_eq!(c.active_index(), 2);
                assert_eq!(active(&f.dots), vec![2]);

                let err = c.jump_to(4).unwrap_err();
                assert!(matches!(err, Error::SlideOutOfRange { slide: 4, len: 3, .. }));
                assert!(c.jump_to(0).is_err());
                assert_eq!(c.active_index(), 2);
                assert_eq!(active(&f.slides), vec![2]);
            })
            .await;
    }

    #[tokio::test]
    async fn missing_dots_are_skipped() {
        LocalSet::new()
            .run_until(async {
                let f = build(3, 1);
                let mut c = f.carousel.borrow_mut();
                c.advance(Direction::Next);
                assert_eq!(active(&f.slides), vec![1]);
                assert!(active(&f.dots).is_empty());
                c.jump_to(1).unwrap();
                assert_eq!(active(&f.dots), vec![0]);
            })
            .await;
    }

    #[tokio::test]
    async fn mount_normalizes_markers_and_starts_running() {
        LocalSet::new()
            .run_until(async {
                let slides: Vec<Rc<MarkerCell>> = (0..3).map(|_| Rc::new(MarkerCell::new())).collect();
                slides[0].set_active(true);
                slides[2].set_active(true);
                let carousel = Carousel::mount(
                    "m",
                    slides.iter().map(|m| Slide::new(None, m.clone(), None)).collect(),
                    Vec::new(),
                    Vec::new(),
                    1,
                    Duration::from_secs(4),
                )
                .unwrap();
                assert_eq!(active(&slides), vec![1]);
                let c = carousel.borrow();
                assert_eq!(c.state(), CarouselState::Running);
                assert!(c.is_timer_armed());
            })
            .await;
    }

    #[test]
    fn mount_rejects_empty_carousel() {
        let res = Carousel::mount("e", Vec::new(), Vec::new(), Vec::new(), 0, Duration::from_secs(4));
        assert!(matches!(res, Err(Error::MarkupError(_))));
    }

    #[test]
    fn direction_from_offset() {
        assert_eq!(Direction::from_offset(1), Some(Direction::Next));
        assert_eq!(Direction::from_offset(-1), Some(Direction::Previous));
        assert_eq!(Direction::from_offset(0), None);
    }
}
