//! Document scan: finds the carousels, slides, dots and video containers a
//! page declares and turns them into plain descriptors the controllers are
//! mounted from.

use crate::{Error, Result};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Everything the controllers need from a page's markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMarkup {
    pub carousels: Vec<CarouselMarkup>,
    /// Every video on the page, in document order
    pub videos: Vec<VideoMarkup>,
}

impl PageMarkup {
    pub fn carousel(&self, id: &str) -> Option<&CarouselMarkup> {
        self.carousels.iter().find(|c| c.id == id)
    }

    pub fn video(&self, key: &str) -> Option<&VideoMarkup> {
        self.videos.iter().find(|v| v.key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselMarkup {
    pub id: String,
    pub slides: Vec<SlideMarkup>,
    pub dot_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideMarkup {
    pub active: bool,
    pub has_badge: bool,
    pub media: Option<MediaMarkup>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaMarkup {
    /// Still or animated image, with its resolved source
    Image { src: String },
    /// Video element, referenced by its key in [`PageMarkup::videos`]
    Video { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoMarkup {
    pub key: String,
    pub sources: Vec<String>,
    /// Id of the carousel the video sits in, if any
    pub carousel: Option<String>,
    pub controls: VideoControls,
}

/// Which controls the surrounding `.video-container` provides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoControls {
    pub play_button: bool,
    pub progress: bool,
    pub elapsed: bool,
    pub duration: bool,
    pub mute_button: bool,
    pub fullscreen_button: bool,
}

impl VideoControls {
    /// A container with every control
    pub fn full() -> Self {
        VideoControls {
            play_button: true,
            progress: true,
            elapsed: true,
            duration: true,
            mute_button: true,
            fullscreen_button: true,
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::MarkupError(format!("invalid selector '{}': {:?}", css, e)))
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn closest<'a>(el: &ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| has_class(a, class))
}

fn unique_key(base: &str, declared: &HashSet<&str>, taken: &HashSet<String>) -> String {
    let free = |key: &str| !declared.contains(key) && !taken.contains(key);
    if free(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|key| free(key.as_str()))
        .unwrap_or_else(|| base.to_string())
}

fn resolve(src: &str, base: Option<&Url>) -> String {
    match base.map(|b| b.join(src)) {
        Some(Ok(url)) => url.to_string(),
        Some(Err(e)) => {
            debug!("Keeping unresolvable source '{}': {}", src, e);
            src.to_string()
        }
        None => src.to_string(),
    }
}

struct Selectors {
    carousel: Selector,
    slide: Selector,
    dot: Selector,
    badge: Selector,
    img: Selector,
    video: Selector,
    source: Selector,
    play: Selector,
    progress: Selector,
    elapsed: Selector,
    duration: Selector,
    mute: Selector,
    fullscreen: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Selectors {
            carousel: selector(".media-carousel")?,
            slide: selector(".carousel-slide")?,
            dot: selector(".dot")?,
            badge: selector(".media-type-badge")?,
            img: selector("img")?,
            video: selector("video")?,
            source: selector("source[src]")?,
            play: selector(".video-play-btn")?,
            progress: selector(".video-progress")?,
            elapsed: selector(".current-time")?,
            duration: selector(".duration")?,
            mute: selector(".video-volume-btn")?,
            fullscreen: selector(".video-fullscreen-btn")?,
        })
    }
}

/// Scan `html` for carousels and videos. Relative media sources are resolved
/// against `base` when one is given.
///
/// Malformed pieces of markup are skipped with a warning rather than failing
/// the scan, since the page is outside our control.
pub fn scan_document(html: &str, base: Option<&Url>) -> Result<PageMarkup> {
    let sel = Selectors::new()?;
    let document = Html::parse_document(html);

    // Generated keys must not shadow a real id further down the page
    let declared: HashSet<&str> = document.select(&sel.video).filter_map(|v| v.value().id()).collect();
    let mut taken: HashSet<String> = HashSet::new();

    let mut videos = Vec::new();
    let mut video_nodes = Vec::new();
    for (ordinal, video) in document.select(&sel.video).enumerate() {
        let key = match video.value().id() {
            Some(id) if taken.contains(id) => {
                let key = unique_key(id, &declared, &taken);
                warn!("Duplicate video id '{}'; keyed as '{}'", id, key);
                key
            }
            Some(id) => id.to_string(),
            None => unique_key(&format!("video-{}", ordinal), &declared, &taken),
        };
        taken.insert(key.clone());

        let mut sources = Vec::new();
        if let Some(src) = video.value().attr("src") {
            sources.push(resolve(src, base));
        }
        for source in video.select(&sel.source) {
            if let Some(src) = source.value().attr("src") {
                sources.push(resolve(src, base));
            }
        }

        let carousel = closest(&video, "media-carousel")
            .and_then(|c| c.value().attr("data-carousel").map(str::to_string));

        let controls = closest(&video, "video-container")
            .map(|container| VideoControls {
                play_button: container.select(&sel.play).next().is_some(),
                progress: container.select(&sel.progress).next().is_some(),
                elapsed: container.select(&sel.elapsed).next().is_some(),
                duration: container.select(&sel.duration).next().is_some(),
                mute_button: container.select(&sel.mute).next().is_some(),
                fullscreen_button: container.select(&sel.fullscreen).next().is_some(),
            })
            .unwrap_or_default();

        video_nodes.push((video.id(), key.clone()));
        videos.push(VideoMarkup { key, sources, carousel, controls });
    }

    let mut carousels: Vec<CarouselMarkup> = Vec::new();
    for container in document.select(&sel.carousel) {
        let Some(id) = container.value().attr("data-carousel") else {
            warn!("Skipping carousel container without a data-carousel id");
            continue;
        };
        if carousels.iter().any(|c| c.id == id) {
            warn!("Duplicate carousel id '{}'; keeping the first", id);
            continue;
        }

        let slides: Vec<SlideMarkup> = container
            .select(&sel.slide)
            .map(|slide| {
                let media = if let Some(img) = slide.select(&sel.img).next() {
                    img.value()
                        .attr("src")
                        .map(|src| MediaMarkup::Image { src: resolve(src, base) })
                } else {
                    slide.select(&sel.video).next().and_then(|v| {
                        video_nodes
                            .iter()
                            .find(|(node, _)| *node == v.id())
                            .map(|(_, key)| MediaMarkup::Video { key: key.clone() })
                    })
                };
                SlideMarkup {
                    active: has_class(&slide, "active"),
                    has_badge: slide.select(&sel.badge).next().is_some(),
                    media,
                }
            })
            .collect();

        if slides.is_empty() {
            warn!("Skipping carousel '{}' without slides", id);
            continue;
        }

        let dot_count = container.select(&sel.dot).count();
        if dot_count != slides.len() {
            debug!(
                "Carousel '{}' has {} slides but {} dots",
                id,
                slides.len(),
                dot_count
            );
        }

        carousels.push(CarouselMarkup { id: id.to_string(), slides, dot_count });
    }

    Ok(PageMarkup { carousels, videos })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="media-carousel" data-carousel="c1">
  <div class="carousel-slide active"><img src="shots/one.png"><span class="media-type-badge"></span></div>
  <div class="carousel-slide">
    <div class="video-container">
      <video id="demo"><source src="demo.webm"><source src="demo.mp4"></video>
      <button class="video-play-btn"><i class="fas fa-play"></i></button>
      <div class="video-progress"><div class="video-progress-filled"></div></div>
      <span class="current-time">0:00</span><span class="duration">0:00</span>
      <button class="video-volume-btn"></button>
    </div>
    <span class="media-type-badge"></span>
  </div>
  <div class="carousel-slide"><img src="https://media.giphy.com/x/loop.gif"></div>
  <span class="dot active"></span><span class="dot"></span><span class="dot"></span>
</div>
<div class="media-carousel"><div class="carousel-slide"></div></div>
<div class="media-carousel" data-carousel="empty"></div>
<video src="/hero.mp4"></video>
</body></html>"#;

    #[test]
    fn scans_carousels_slides_and_dots() {
        let base = Url::parse("https://folio.example/work/").unwrap();
        let page = scan_document(PAGE, Some(&base)).unwrap();

        assert_eq!(page.carousels.len(), 1);
        let c1 = page.carousel("c1").unwrap();
        assert_eq!(c1.slides.len(), 3);
        assert_eq!(c1.dot_count, 3);
        assert!(c1.slides[0].active);
        assert!(c1.slides[0].has_badge);
        assert!(!c1.slides[2].has_badge);
        assert_eq!(
            c1.slides[0].media,
            Some(MediaMarkup::Image { src: "https://folio.example/work/shots/one.png".into() })
        );
        assert_eq!(c1.slides[1].media, Some(MediaMarkup::Video { key: "demo".into() }));
    }

    #[test]
    fn scans_videos_with_sources_and_controls() {
        let base = Url::parse("https://folio.example/work/").unwrap();
        let page = scan_document(PAGE, Some(&base)).unwrap();

        assert_eq!(page.videos.len(), 2);
        let demo = page.video("demo").unwrap();
        assert_eq!(demo.carousel.as_deref(), Some("c1"));
        assert_eq!(
            demo.sources,
            vec![
                "https://folio.example/work/demo.webm".to_string(),
                "https://folio.example/work/demo.mp4".to_string()
            ]
        );
        assert!(demo.controls.play_button && demo.controls.mute_button);
        assert!(!demo.controls.fullscreen_button);

        let hero = page.video("video-1").unwrap();
        assert_eq!(hero.carousel, None);
        assert_eq!(hero.sources, vec!["https://folio.example/hero.mp4".to_string()]);
        assert_eq!(hero.controls, VideoControls::default());
    }

    #[test]
    fn video_keys_stay_unique() {
        let html = r#"<video src="a.mp4"></video>
<video id="video-0" src="b.mp4"></video>
<video id="clip" src="c.mp4"></video>
<video id="clip" src="d.mp4"></video>"#;
        let page = scan_document(html, None).unwrap();

        let keys: Vec<&str> = page.videos.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["video-0-1", "video-0", "clip", "clip-1"]);
        assert_eq!(page.video("video-0").unwrap().sources, vec!["b.mp4".to_string()]);
        assert_eq!(page.video("video-0-1").unwrap().sources, vec!["a.mp4".to_string()]);
        assert_eq!(page.video("clip-1").unwrap().sources, vec!["d.mp4".to_string()]);
    }

    #[test]
    fn keeps_raw_sources_without_base() {
        let page = scan_document(PAGE, None).unwrap();
        let c1 = page.carousel("c1").unwrap();
        assert_eq!(c1.slides[0].media, Some(MediaMarkup::Image { src: "shots/one.png".into() }));
    }

    #[test]
    fn empty_document_has_nothing() {
        let page = scan_document("<html><body><p>hi</p></body></html>", None).unwrap();
        assert!(page.carousels.is_empty());
        assert!(page.videos.is_empty());
    }
}
