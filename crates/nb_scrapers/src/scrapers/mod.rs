use async_trait::async_trait;
use nb_core::{ArticleExtractor, Error, ExtractedArticle, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub mod generic;
pub mod jsonld;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; NotuciasBot/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a page over HTTP and runs the generic article parser on it.
/// One attempt per call; failures are returned, never retried.
#[derive(Debug, Clone)]
pub struct WebExtractor {
    client: Client,
}

impl WebExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scraping(format!("HTTP {} fetching {}", status, url)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ArticleExtractor for WebExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedArticle> {
        let parsed = utils::parse_url(url)?;

        let html = self.fetch_html(parsed.as_str()).await.map_err(|e| {
            warn!("Failed to fetch {}: {}", url, e);
            e
        })?;
        debug!("Fetched {} bytes from {}", html.len(), url);

        let page = generic::parse_article(&html);
        ExtractedArticle::new(
            url,
            page.title.unwrap_or_default(),
            page.body.unwrap_or_default(),
        )
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use scraper::{Html, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(Error::InvalidUrl(format!("unsupported scheme {} in {}", other, url))),
        }
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn select_first_text(document: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    }
}
