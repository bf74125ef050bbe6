//! Web-based sector classification
//!
//! Fallback used when the registry's NAF code gives no answer. Resolves the
//! company's probable website through web search, fetches the homepage, and
//! classifies it in two stages:
//! - link signatures: outbound links to known third-party platforms
//!   (code hosting, medical booking, restaurant platforms) are near-certain
//!   evidence of the business type and bypass keyword scoring
//! - keyword scoring: visible text (title, headings, meta descriptions) is
//!   tokenized and scored against each sector's keyword list
//!
//! Every failure in here degrades to "no sector" - the row already has a
//! successful registry lookup behind it and must not be marked failed.

use crate::config::{FetcherConfig, HttpConfig};
use crate::search;
use crate::sector::SectorCatalog;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Signals extracted from a fetched homepage
#[derive(Debug, Clone, Default)]
pub struct PageSignals {
    /// Outbound hyperlink targets (href values), as found
    pub links: Vec<String>,
    /// Visible text: title, h1/h2 headings, meta descriptions
    pub text: String,
}

/// Web fallback classifier: search, fetch, signature match, keyword score
#[derive(Debug, Clone)]
pub struct WebClassifier {
    client: reqwest::Client,
    search_endpoint: String,
    search_hint: String,
}

impl WebClassifier {
    pub fn new(fetcher: &FetcherConfig, http: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&http.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetcher.timeout_secs))
            .user_agent(&http.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build fetcher HTTP client")?;

        Ok(Self {
            client,
            search_endpoint: fetcher.search_endpoint.clone(),
            search_hint: fetcher.search_hint.clone(),
        })
    }

    /// Classify a company by its website. Returns the sector label, or `None`
    /// when the site cannot be resolved, fetched, or matched.
    pub async fn classify(&self, catalog: &SectorCatalog, company_name: &str) -> Option<String> {
        let url = match search::resolve_website(
            &self.client,
            &self.search_endpoint,
            company_name,
            &self.search_hint,
        )
        .await
        {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("No website found for {}", company_name);
                return None;
            }
            Err(e) => {
                debug!("Website resolution failed for {}: {}", company_name, e);
                return None;
            }
        };

        let html = match self.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                debug!("Site fetch failed for {} ({}): {}", company_name, url, e);
                return None;
            }
        };

        let signals = extract_signals(&html);
        classify_signals(catalog, &signals).map(String::from)
    }

    /// Fetch a homepage with the bounded fetcher timeout
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Non-success status {} for {}", response.status(), url);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }
}

/// Run the two web stages in order: signatures first, then keyword scoring
pub fn classify_signals<'a>(catalog: &'a SectorCatalog, signals: &PageSignals) -> Option<&'a str> {
    if let Some(label) = match_signature(catalog, &signals.links) {
        debug!("Link signature matched: {}", label);
        return Some(label);
    }
    if let Some((label, score)) = score_keywords(catalog, &signals.text) {
        debug!("Keyword scoring matched: {} (score {})", label, score);
        return Some(label);
    }
    None
}

/// Extract outbound links and visible text from homepage HTML
pub fn extract_signals(html: &str) -> PageSignals {
    static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
    static TEXT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title, h1, h2").unwrap());
    static OG_DESC_SEL: Lazy<Selector> =
        Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
    static META_DESC_SEL: Lazy<Selector> =
        Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());

    let document = Html::parse_document(html);

    let links = document
        .select(&LINK_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    let mut text = String::new();
    for sel in [&*OG_DESC_SEL, &*META_DESC_SEL] {
        for element in document.select(sel) {
            if let Some(content) = element.value().attr("content") {
                text.push_str(content);
                text.push(' ');
            }
        }
    }
    for element in document.select(&TEXT_SEL) {
        text.push_str(&element.text().collect::<String>());
        text.push(' ');
    }

    PageSignals { links, text }
}

/// Match outbound links against the signature rules, in priority order.
/// Marker comparison is a lowercase substring search over all hrefs.
pub fn match_signature<'a>(catalog: &'a SectorCatalog, links: &[String]) -> Option<&'a str> {
    if links.is_empty() {
        return None;
    }
    let haystack = links.join(" ").to_lowercase();

    for rule in catalog.signatures() {
        if rule.markers.iter().any(|m| haystack.contains(m.as_str())) {
            return Some(&rule.sector);
        }
    }
    None
}

/// Score page text against each sector's keyword list and return the best
/// strictly-positive scorer. Keywords match whole tokens only; ties keep the
/// earlier catalog sector.
pub fn score_keywords<'a>(catalog: &'a SectorCatalog, text: &str) -> Option<(&'a str, u32)> {
    static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for word in cleaned.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut best: Option<(&str, u32)> = None;
    for rule in catalog.rules() {
        let score: u32 = rule
            .keywords
            .iter()
            .filter_map(|kw| counts.get(kw.as_str()))
            .sum();
        // Strictly greater: catalog order breaks ties deterministically
        if score > best.map(|(_, s)| s).unwrap_or(0) {
            best = Some((&rule.label, score));
        }
    }
    best
}
