use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};
use ureq::ResponseExt;

use crate::config::FetchSettings;
use crate::error::{BenchError, Result};

/// A page ready for extraction
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Final URL after redirects, or the file path for local pages
    pub url: String,
    /// Raw HTML content
    pub html: String,
}

/// Check that a benchmark target is an http(s) URL
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BenchError::UnsupportedScheme(other.to_string())),
    }
}

/// Download a page, refusing bodies larger than the configured limit
pub fn fetch_page(url: &str, settings: &FetchSettings) -> Result<PageContent> {
    let target = validate_url(url)?;

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
        .build()
        .into();

    debug!(url = %target, "fetching page");
    let response = agent
        .get(target.as_str())
        .header("User-Agent", &settings.user_agent)
        .call()?;

    let final_url = response.get_uri().to_string();
    let bytes = response
        .into_body()
        .with_config()
        .limit(settings.max_body_bytes)
        .read_to_vec()
        .map_err(|e| match e {
            ureq::Error::BodyExceedsLimit(_) => BenchError::PayloadTooLarge {
                limit: settings.max_body_bytes,
            },
            other => BenchError::HttpError(other),
        })?;
    // Latin-1 menus are common; bad bytes become U+FFFD instead of failing
    let html = String::from_utf8_lossy(&bytes).into_owned();

    info!(url = %final_url, bytes = html.len(), "page fetched");
    Ok(PageContent { url: final_url, html })
}

/// Read a saved page from disk under the same size limit
pub fn read_page_file(path: &Path, settings: &FetchSettings) -> Result<PageContent> {
    let size = std::fs::metadata(path)?.len();
    if size > settings.max_body_bytes {
        return Err(BenchError::PayloadTooLarge {
            limit: settings.max_body_bytes,
        });
    }

    let bytes = std::fs::read(path)?;
    Ok(PageContent {
        url: path.display().to_string(),
        html: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
