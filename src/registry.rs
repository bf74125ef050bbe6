//! Business registry client
//!
//! Queries the French company registry (recherche-entreprises) by name and
//! returns at most the single best-matching record: official name, SIREN
//! identifier, postal code, employee bracket, and the NAF activity code the
//! classifier runs on. Records are fetched fresh per query - no caching.

use crate::config::{HttpConfig, RegistryConfig};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The best-matching registry record for one query
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryRecord {
    /// Official registered company name
    pub nom_complet: Option<String>,
    /// SIREN entity identifier, used to build the public directory link
    pub siren: Option<String>,
    /// Employee-count bracket code ("NC" when not communicated)
    pub tranche_effectif_salarie: Option<String>,
    /// Principal activity (NAF) code, e.g. "62.02Z"
    pub activite_principale: Option<String>,
    /// Head-office fields (postal code lives here)
    #[serde(default)]
    pub siege: Siege,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Siege {
    pub code_postal: Option<String>,
}

impl RegistryRecord {
    /// Coarse region derived from the postal code's department digits
    pub fn region(&self) -> Option<String> {
        let cp = self.siege.code_postal.as_deref()?;
        let dept = cp.get(..2)?;
        Some(format!("Dep. {}", dept))
    }

    /// Public directory page for this entity
    pub fn directory_link(&self, directory_base: &str) -> Option<String> {
        let siren = self.siren.as_deref()?;
        Some(format!("{}/{}", directory_base.trim_end_matches('/'), siren))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RegistryRecord>,
}

/// Client for the registry search endpoint
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    endpoint: String,
    directory_url: String,
}

impl RegistryClient {
    pub fn new(registry: &RegistryConfig, http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(registry.timeout_secs))
            .user_agent(&http.user_agent)
            .build()
            .context("Failed to build registry HTTP client")?;

        Ok(Self {
            client,
            endpoint: registry.endpoint.clone(),
            directory_url: registry.directory_url.clone(),
        })
    }

    pub fn directory_url(&self) -> &str {
        &self.directory_url
    }

    /// Look up the best-matching record for a normalized company query.
    ///
    /// Returns `Ok(None)` when the registry answers with an empty result set.
    /// Network errors and non-success statuses surface as `Err` - the caller
    /// treats both the same way as an empty match (per-row lookup failure).
    pub async fn search(&self, query: &str) -> Result<Option<RegistryRecord>> {
        debug!("Registry lookup: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("per_page", "1")])
            .send()
            .await
            .with_context(|| format!("Registry unreachable for query '{}'", query))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Registry returned status {} for query '{}'",
                response.status(),
                query
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .with_context(|| format!("Malformed registry response for query '{}'", query))?;

        Ok(body.results.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cp: Option<&str>, siren: Option<&str>) -> RegistryRecord {
        RegistryRecord {
            nom_complet: Some("ACME SAS".to_string()),
            siren: siren.map(String::from),
            tranche_effectif_salarie: Some("12".to_string()),
            activite_principale: Some("62.02Z".to_string()),
            siege: Siege { code_postal: cp.map(String::from) },
        }
    }

    #[test]
    fn test_region_from_postal_code() {
        assert_eq!(record(Some("75008"), None).region(), Some("Dep. 75".to_string()));
        assert_eq!(record(Some("13001"), None).region(), Some("Dep. 13".to_string()));
    }

    #[test]
    fn test_region_missing_or_short() {
        assert_eq!(record(None, None).region(), None);
        assert_eq!(record(Some("7"), None).region(), None);
    }

    #[test]
    fn test_directory_link() {
        let rec = record(None, Some("123456789"));
        assert_eq!(
            rec.directory_link("https://annuaire-entreprises.data.gouv.fr/entreprise"),
            Some("https://annuaire-entreprises.data.gouv.fr/entreprise/123456789".to_string())
        );
        assert_eq!(record(None, None).directory_link("https://example.org"), None);
    }

    #[test]
    fn test_search_response_parses_optional_fields() {
        let json = r#"{"results": [{"nom_complet": "ACME", "siren": "123456789"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let rec = &parsed.results[0];
        assert_eq!(rec.nom_complet.as_deref(), Some("ACME"));
        assert!(rec.activite_principale.is_none());
        assert!(rec.siege.code_postal.is_none());
    }

    #[test]
    fn test_search_response_empty_results() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(parsed.results.is_empty());
    }
}
