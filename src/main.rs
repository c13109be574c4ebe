//! wallgrab CLI entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use url::Url;

use wallgrab::client::HttpClient;
use wallgrab::config::{self, Config};
use wallgrab::dom;
use wallgrab::extract;
use wallgrab::reveal::{self, ItemAnimation, RevealBatcher, RevealSurface};
use wallgrab::viewer::{LoadReport, Viewer};

#[derive(Parser)]
#[command(
    name = "wallgrab",
    about = "Scrape a wallpaper gallery and reveal the images as they arrive",
    version
)]
struct Cli {
    /// Gallery page URL (overrides WALLGRAB_URL and the built-in default).
    #[arg(long, global = true)]
    url: Option<String>,

    /// HTTP timeout in milliseconds.
    #[arg(long, global = true, default_value = "10000")]
    timeout_ms: u64,

    /// Print a JSON report instead of human-readable lines.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the page, download and decode every image, reveal as they land.
    Fetch,
    /// Extract and resolve image links without downloading anything.
    Links,
}

/// Surface that narrates the reveal schedule to the log.
struct LogSurface;

impl RevealSurface for LogSurface {
    fn animate(&mut self, animation: ItemAnimation) {
        info!(
            "revealing item {} after {:.1}s: fade {:.0}->{:.0}, slide {:.0}->{:.0} over {:.1}s",
            animation.index,
            animation.delay.as_secs_f64(),
            animation.fade.from,
            animation.fade.to,
            animation.slide.from,
            animation.slide.to,
            animation.fade.duration.as_secs_f64(),
        );
    }
}

#[derive(Serialize)]
struct Summary {
    page: String,
    links_found: usize,
    images_loaded: usize,
    images: Vec<ImageSummary>,
    failures: Vec<FailureSummary>,
}

#[derive(Serialize)]
struct ImageSummary {
    url: String,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct FailureSummary {
    url: String,
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let page_url = config::resolve_page_url(cli.url.as_deref());
    let page_url =
        Url::parse(&page_url).with_context(|| format!("invalid page URL: {page_url}"))?;
    let config = Config {
        page_url,
        timeout: Duration::from_millis(cli.timeout_ms),
    };

    match cli.command.unwrap_or(Commands::Fetch) {
        Commands::Fetch => run_fetch(config, cli.json).await,
        Commands::Links => run_links(config, cli.json).await,
    }
}

async fn run_fetch(config: Config, json: bool) -> Result<()> {
    let mut viewer = Viewer::new(&config);
    let reveal_driver = tokio::spawn(reveal::run(
        viewer.gallery().subscribe(),
        LogSurface,
        RevealBatcher::default(),
    ));

    let Some(report) = viewer.fire_load().await? else {
        anyhow::bail!("a load cycle is already running");
    };

    let summary = summarize(&config, &viewer, &report);

    // Dropping the viewer closes the event stream; the reveal driver drains
    // whatever is still queued and exits.
    drop(viewer);
    let _ = reveal_driver.await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} links, {} images loaded, {} failed",
            summary.page,
            summary.links_found,
            summary.images_loaded,
            summary.failures.len()
        );
        for failure in &summary.failures {
            println!("  failed {}: {}", failure.url, failure.error);
        }
    }
    Ok(())
}

async fn run_links(config: Config, json: bool) -> Result<()> {
    let client = HttpClient::new(config.timeout);
    let body = client.get_bytes(&config.page_url).await?;
    let document = dom::parse(&body)?;
    let links: Vec<String> = extract::resolved_image_links(&document, &config.page_url)
        .map(|url| url.to_string())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        for link in &links {
            println!("{link}");
        }
    }
    Ok(())
}

fn summarize(config: &Config, viewer: &Viewer, report: &LoadReport) -> Summary {
    Summary {
        page: config.page_url.to_string(),
        links_found: report.links_found,
        images_loaded: report.images_loaded,
        images: viewer
            .gallery()
            .items()
            .iter()
            .map(|image| ImageSummary {
                url: image.url().to_string(),
                width: image.width(),
                height: image.height(),
            })
            .collect(),
        failures: report
            .failures
            .iter()
            .map(|failure| FailureSummary {
                url: failure.url.to_string(),
                error: failure.error.to_string(),
            })
            .collect(),
    }
}
