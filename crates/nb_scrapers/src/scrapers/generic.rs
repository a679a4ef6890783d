//! Generic article extraction for arbitrary news pages.
//!
//! There is no per-site scraper: the title comes from page metadata and the
//! body from the first container that looks like the article text.

use scraper::{ElementRef, Html, Selector};

use super::jsonld;
use super::utils::{collapse_whitespace, select_first_text};

/// Containers that usually hold the article text, most specific first.
const BODY_CONTAINERS: &[&str] = &[
    "[itemprop='articleBody']",
    "[data-testid='body-text']",
    ".body-nota",
    ".article-body",
    ".entry-content",
    ".post-content",
    "article",
    "main",
    "[role='main']",
];

/// Width used when falling back to a plain-text rendering of the page.
const TEXT_WIDTH: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub body: Option<String>,
}

pub fn parse_article(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        body: extract_body(&document).or_else(|| plain_text(html)),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    jsonld::extract_headline(document)
        .or_else(|| meta_content(document, "meta[property='og:title']"))
        .or_else(|| select_first_text(document, "h1"))
        .or_else(|| select_first_text(document, "title"))
        .map(|t| collapse_whitespace(&t))
        .filter(|t| !t.is_empty())
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
}

fn extract_body(document: &Html) -> Option<String> {
    for container in BODY_CONTAINERS {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        if let Some(body) = document.select(&selector).find_map(container_text) {
            return Some(body);
        }
    }

    // No known container: every paragraph on the page.
    let p = Selector::parse("p").ok()?;
    join_paragraphs(document.select(&p))
}

fn container_text(container: ElementRef<'_>) -> Option<String> {
    let p = Selector::parse("p").ok()?;
    join_paragraphs(container.select(&p)).or_else(|| {
        let text = collapse_whitespace(&container.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    })
}

fn join_paragraphs<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    let paragraphs: Vec<String> = elements
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
}

fn plain_text(html: &str) -> Option<String> {
    let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH);
    let text = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}
