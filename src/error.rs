//! Error types for the scrape-and-reveal pipeline.

/// Errors that can occur while scraping the gallery or loading images.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// Network or transport failure reaching the page or an asset.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page body could not be parsed into an element tree.
    #[error("parse error: {0}")]
    Parse(String),

    /// Asset bytes could not be decoded by the selected decoder.
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// IO error, e.g. spawning a decode worker failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A decode worker exited without handing back a result.
    #[error("decode worker exited without a result")]
    WorkerGone,
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
