//! Runtime configuration for the scrape cycle.

use std::time::Duration;

use url::Url;

/// Wallpaper gallery page scraped by default. Doubles as the base URL when
/// resolving relative image links found on the page.
pub const DEFAULT_PAGE_URL: &str = "http://pronama.azurewebsites.net/pronama/wallpaper/";

/// Default timeout applied to every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one viewer instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gallery page URL; also the base for relative hrefs.
    pub page_url: Url,
    /// Timeout for page and asset requests.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url: Url::parse(DEFAULT_PAGE_URL).expect("default page URL is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Resolve the gallery page URL: explicit flag > `WALLGRAB_URL` env var >
/// built-in default.
pub fn resolve_page_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if let Ok(env_url) = std::env::var("WALLGRAB_URL") {
        return env_url;
    }

    DEFAULT_PAGE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        let url = resolve_page_url(Some("http://localhost:8080/gallery/"));
        assert_eq!(url, "http://localhost:8080/gallery/");
    }

    #[test]
    fn test_default_config_parses() {
        let config = Config::default();
        assert_eq!(config.page_url.as_str(), DEFAULT_PAGE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
