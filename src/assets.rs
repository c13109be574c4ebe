//! Concurrent image fetch and decode pipeline.
//!
//! Every resolved URL becomes one fetch-and-decode unit: the body downloads
//! on the async scheduler, then the bytes move to a dedicated throwaway
//! thread for decoding. All units run concurrently and are drained jointly
//! in whatever order they complete; a failing unit never takes its siblings
//! down with it.

use futures::stream::{self, StreamExt};
use image::ImageFormat;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

use crate::client::HttpClient;
use crate::error::{ScrapeError, ScrapeResult};

/// A decoded image. Immutable after construction and safe to share across
/// tasks and threads.
#[derive(Debug)]
pub struct ImageAsset {
    url: Url,
    width: u32,
    height: u32,
    pixels: image::RgbaImage,
}

impl ImageAsset {
    /// Wrap an already-decoded pixel buffer.
    pub fn new(url: Url, pixels: image::RgbaImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            url,
            pixels,
        }
    }

    /// Source URL the image was fetched from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The decoded RGBA pixel buffer.
    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

/// One URL whose fetch or decode failed.
#[derive(Debug)]
pub struct FailedAsset {
    pub url: Url,
    pub error: ScrapeError,
}

/// Outcome of a joint fetch over a set of URLs.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Number of successfully decoded images.
    pub completed: usize,
    /// URLs that failed, with their errors.
    pub failures: Vec<FailedAsset>,
}

/// Select a decoder from the URL's file extension: `.jpg` means JPEG,
/// everything else is treated as PNG. A deliberate two-way dispatch; the
/// gallery serves only these two formats.
fn format_for(url: &Url) -> ImageFormat {
    if url.path().ends_with(".jpg") {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Png
    }
}

/// Decode the first frame into an RGBA buffer.
fn decode_frame(url: &Url, bytes: &[u8]) -> ScrapeResult<ImageAsset> {
    let frame = image::load_from_memory_with_format(bytes, format_for(url))?;
    Ok(ImageAsset::new(url.clone(), frame.to_rgba8()))
}

/// Decode image bytes on a dedicated, short-lived worker thread.
///
/// The worker exists for exactly one frame: decoder state never touches the
/// async scheduler or any shared pool, and the thread is gone as soon as the
/// result has been handed back over the channel.
async fn decode_isolated(url: Url, bytes: Vec<u8>) -> ScrapeResult<ImageAsset> {
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name("image-decode".to_string())
        .spawn(move || {
            let _ = tx.send(decode_frame(&url, &bytes));
        })?;

    rx.await.map_err(|_| ScrapeError::WorkerGone)?
}

/// Fetch and decode a single image.
pub async fn fetch_and_decode(client: &HttpClient, url: Url) -> ScrapeResult<ImageAsset> {
    let bytes = client.get_bytes(&url).await?;
    debug!("downloaded {} ({} bytes)", url, bytes.len());
    decode_isolated(url, bytes).await
}

/// Fetch and decode every URL concurrently, handing each finished image to
/// `on_ready` on the calling task, in completion order.
///
/// Launch order follows the input; completion order is whatever the network
/// and decoders produce. The joint wait always runs to the end: failures are
/// collected into the report instead of aborting sibling units.
pub async fn fetch_all<F>(client: &HttpClient, urls: Vec<Url>, mut on_ready: F) -> FetchReport
where
    F: FnMut(ImageAsset),
{
    let concurrency = urls.len().max(1);
    let mut units = stream::iter(urls.into_iter().map(|url| {
        let client = client.clone();
        async move {
            let result = fetch_and_decode(&client, url.clone()).await;
            (url, result)
        }
    }))
    .buffer_unordered(concurrency);

    let mut report = FetchReport::default();
    while let Some((url, result)) = units.next().await {
        match result {
            Ok(asset) => {
                report.completed += 1;
                on_ready(asset);
            }
            Err(error) => {
                warn!("asset {url} failed: {error}");
                report.failures.push(FailedAsset { url, error });
            }
        }
    }

    report
}
