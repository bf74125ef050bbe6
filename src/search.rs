//! Website resolution through a web-search provider
//!
//! Given a company name, queries an HTML search endpoint (DuckDuckGo-style)
//! with a locale hint and takes the first organic result as the probable
//! official website. Provider unavailability and empty result pages both
//! resolve to `None` - the caller degrades, it never fails the row.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Resolve a company name to a candidate website URL.
///
/// Returns `Ok(None)` for zero results; `Err` only for transport failures,
/// which callers fold into the same degraded outcome.
pub async fn resolve_website(
    client: &reqwest::Client,
    search_endpoint: &str,
    company_name: &str,
    hint: &str,
) -> Result<Option<String>> {
    let query = if hint.is_empty() {
        company_name.to_string()
    } else {
        format!("{} {}", company_name, hint)
    };
    debug!("Resolving website via search: {}", query);

    let response = client
        .get(search_endpoint)
        .query(&[("q", query.as_str())])
        .send()
        .await
        .with_context(|| format!("Search provider unreachable for '{}'", company_name))?;

    if !response.status().is_success() {
        debug!("Search provider returned status {} for '{}'", response.status(), company_name);
        return Ok(None);
    }

    let body = response.text().await.context("Failed to read search response body")?;
    Ok(first_result_url(&body))
}

/// Extract the first organic result link from a search result page
fn first_result_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.result__a, a.result-link").ok()?;

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = normalize_result_href(href) {
                return Some(url);
            }
        }
    }
    None
}

/// Unwrap provider redirect links ("/l/?uddg=<encoded>") to the target URL
fn normalize_result_href(href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    // Redirect-wrapped results carry the destination in the uddg parameter
    if href.contains("uddg=") {
        let absolute = if href.starts_with("//") {
            format!("https:{}", href)
        } else {
            format!("https://duckduckgo.com{}", href)
        };
        if let Ok(url) = Url::parse(&absolute) {
            for (key, value) in url.query_pairs() {
                if key == "uddg" && (value.starts_with("http://") || value.starts_with("https://")) {
                    return Some(value.into_owned());
                }
            }
        }
    }

    None
}
