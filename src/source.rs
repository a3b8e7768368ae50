//! Page markup sources: a local file or, with the `fetch` feature, an
//! http(s) URL fetched with a blocking client.
//!
//! Loading is blocking; call it before entering the async runtime.

use crate::markup::{scan_document, PageMarkup};
use crate::{Error, Result, ShowreelConfig};
use log::debug;
use std::path::Path;
use url::Url;

/// Raw markup plus the URL relative sources resolve against
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub html: String,
    pub base: Option<Url>,
}

impl LoadedPage {
    pub fn scan(&self) -> Result<PageMarkup> {
        scan_document(&self.html, self.base.as_ref())
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Load markup from `location`. `config.base_url`, when set, overrides the
/// base derived from the location.
pub fn load_markup(location: &str, config: &ShowreelConfig) -> Result<LoadedPage> {
    let base_override = config
        .base_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .map_err(|e| Error::ConfigError(format!("base_url: {}", e)))?;

    if is_remote(location) {
        let html = fetch(location, config)?;
        let base = base_override.or_else(|| Url::parse(location).ok());
        return Ok(LoadedPage { html, base });
    }

    let path = Path::new(location);
    let html = std::fs::read_to_string(path)
        .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))?;
    let base = base_override.or_else(|| {
        path.canonicalize()
            .ok()
            .and_then(|p| Url::from_file_path(p).ok())
    });
    debug!("Loaded {} bytes from {}", html.len(), path.display());
    Ok(LoadedPage { html, base })
}

#[cfg(feature = "fetch")]
fn fetch(url: &str, config: &ShowreelConfig) -> Result<String> {
    use std::time::Duration;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(config.fetch_timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| Error::LoadError(format!("Failed to build HTTP client: {}", e)))?;

    let res = client.get(url).send()?;
    let status = res.status();
    if !status.is_success() {
        return Err(Error::LoadError(format!("GET {} returned {}", url, status)));
    }
    let body = res
        .text()
        .map_err(|e| Error::LoadError(format!("Failed to read response body: {}", e)))?;
    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

#[cfg(not(feature = "fetch"))]
fn fetch(url: &str, _config: &ShowreelConfig) -> Result<String> {
    Err(Error::LoadError(format!(
        "cannot fetch {}: built without the `fetch` feature",
        url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_file_with_file_base() {
        let dir = std::env::temp_dir().join(format!("showreel-src-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("index.html");
        std::fs::write(
            &file,
            r#"<div class="media-carousel" data-carousel="w"><div class="carousel-slide"><img src="img/a.gif"></div></div>"#,
        )
        .unwrap();

        let page = load_markup(file.to_str().unwrap(), &ShowreelConfig::default()).unwrap();
        let base = page.base.clone().expect("file base");
        assert_eq!(base.scheme(), "file");

        let markup = page.scan().unwrap();
        let slide = &markup.carousel("w").unwrap().slides[0];
        match &slide.media {
            Some(crate::markup::MediaMarkup::Image { src }) => {
                assert!(src.starts_with("file://"));
                assert!(src.ends_with("/img/a.gif"));
            }
            other => panic!("unexpected media {:?}", other),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn base_url_override_wins() {
        let dir = std::env::temp_dir().join(format!("showreel-base-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("page.html");
        std::fs::write(&file, "<html></html>").unwrap();

        let config = ShowreelConfig {
            base_url: Some("https://cdn.example/site/".into()),
            ..Default::default()
        };
        let page = load_markup(file.to_str().unwrap(), &config).unwrap();
        assert_eq!(page.base.unwrap().as_str(), "https://cdn.example/site/");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_load_error() {
        let res = load_markup("/definitely/not/here.html", &ShowreelConfig::default());
        assert!(matches!(res, Err(Error::LoadError(_))));
    }
}
