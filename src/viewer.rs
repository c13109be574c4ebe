//! Fetch-cycle coordinator.
//!
//! Owns the gallery, the HTTP client, and the ready flag. One call to
//! [`Viewer::fire_load`] runs the whole cycle: download the gallery page,
//! extract and resolve wallpaper links, fetch and decode every image
//! concurrently, and append each one to the gallery as it completes.

use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

use crate::assets::{self, FailedAsset};
use crate::client::HttpClient;
use crate::config::Config;
use crate::dom;
use crate::error::ScrapeResult;
use crate::extract;
use crate::gallery::Gallery;

/// Summary of one completed fetch cycle.
#[derive(Debug)]
pub struct LoadReport {
    /// Resolved wallpaper links found on the page.
    pub links_found: usize,
    /// Images decoded and appended to the gallery.
    pub images_loaded: usize,
    /// Per-asset failures. These never abort the cycle.
    pub failures: Vec<FailedAsset>,
}

/// Coordinates scrape cycles over one gallery page.
pub struct Viewer {
    client: HttpClient,
    page_url: Url,
    gallery: Gallery,
    ready: watch::Sender<bool>,
}

impl Viewer {
    pub fn new(config: &Config) -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            client: HttpClient::new(config.timeout),
            page_url: config.page_url.clone(),
            gallery: Gallery::new(),
            ready,
        }
    }

    /// The observable image collection.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Whether a new cycle can start right now.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Subscribe to ready-state changes. The flag is `false` for the whole
    /// duration of a cycle and `true` otherwise; the consuming layer uses it
    /// to enable or disable the trigger.
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    /// Clear the gallery. Subscribers see a reset event and drop any
    /// pending reveal bookkeeping. In-flight work cannot outlive this call:
    /// every per-URL task is owned by the `fire_load` future, so abandoning
    /// that future is the cancellation path.
    pub fn reset(&mut self) {
        self.gallery.reset();
    }

    /// Run one fetch cycle.
    ///
    /// Returns `Ok(None)` when a cycle is already in flight and the trigger
    /// is ignored. Otherwise the ready flag stays off for the whole cycle
    /// and is restored on every exit path, success or failure. Page-level
    /// fetch and parse errors abort the cycle before any asset is touched.
    pub async fn fire_load(&mut self) -> ScrapeResult<Option<LoadReport>> {
        let Some(_guard) = ReadyGuard::acquire(&self.ready) else {
            debug!("load trigger ignored: cycle already in flight");
            return Ok(None);
        };

        info!("fetching gallery page {}", self.page_url);
        let body = self.client.get_bytes(&self.page_url).await?;
        let document = dom::parse(&body)?;
        let urls: Vec<Url> = extract::resolved_image_links(&document, &self.page_url).collect();
        drop(document);

        let links_found = urls.len();
        info!("extracted {links_found} wallpaper links");

        let gallery = &mut self.gallery;
        let report = assets::fetch_all(&self.client, urls, |asset| {
            let index = gallery.push(asset);
            debug!("gallery index {index} filled");
        })
        .await;

        info!(
            "cycle complete: {} loaded, {} failed",
            report.completed,
            report.failures.len()
        );
        Ok(Some(LoadReport {
            links_found,
            images_loaded: report.completed,
            failures: report.failures,
        }))
    }
}

/// Holds the ready flag down for the duration of a cycle.
///
/// Dropping the guard restores readiness, so success, error, and panic
/// paths all re-enable the trigger.
struct ReadyGuard<'a> {
    ready: &'a watch::Sender<bool>,
}

impl<'a> ReadyGuard<'a> {
    fn acquire(ready: &'a watch::Sender<bool>) -> Option<Self> {
        if !*ready.borrow() {
            return None;
        }
        ready.send_replace(false);
        Some(Self { ready })
    }
}

impl Drop for ReadyGuard<'_> {
    fn drop(&mut self) {
        self.ready.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unroutable_config() -> Config {
        Config {
            page_url: Url::parse("http://127.0.0.1:1/wallpaper/").unwrap(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_viewer_starts_ready() {
        let viewer = Viewer::new(&unroutable_config());
        assert!(viewer.is_ready());
        assert!(viewer.gallery().is_empty());
    }

    #[test]
    fn test_ready_guard_is_exclusive_and_restores() {
        let (ready, _rx) = watch::channel(true);

        let guard = ReadyGuard::acquire(&ready).unwrap();
        assert!(!*ready.borrow());
        assert!(ReadyGuard::acquire(&ready).is_none());

        drop(guard);
        assert!(*ready.borrow());
        assert!(ReadyGuard::acquire(&ready).is_some());
    }

    #[tokio::test]
    async fn test_page_fetch_failure_restores_ready() {
        let mut viewer = Viewer::new(&unroutable_config());
        let result = viewer.fire_load().await;
        assert!(result.is_err());
        assert!(viewer.is_ready());
        assert!(viewer.gallery().is_empty());
    }
}
