//! Result assembly: the per-input enrichment pipeline
//!
//! Each raw identifier runs through one pipeline: normalize, registry lookup,
//! NAF-code classification, then the web fallback when the code gives no
//! answer. A lookup failure terminates the row with a failure status; a
//! fallback failure never does - the registry lookup already succeeded, so
//! the row degrades to a low-confidence "Unidentified" sector instead.
//!
//! Inputs are independent. One row's failure never aborts the batch, and the
//! output always holds exactly one row per input.

use crate::config::AppConfig;
use crate::input::{normalize_query, InputEntry};
use crate::registry::RegistryClient;
use crate::sector::{Confidence, SectorCatalog};
use crate::web_sector::WebClassifier;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Sentinel for fields with no value (mirrors the exported table)
pub const UNKNOWN: &str = "-";

/// Sector assigned when no signal matched or the fallback could not run
pub const UNIDENTIFIED: &str = "Unidentified";

/// Per-row outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Registry matched and the row was fully assembled
    Success,
    /// Registry matched but the record was missing its official name or
    /// identifier; classification still ran on what was present
    Partial,
    /// Registry unreachable, malformed response, or no match at all
    Failure,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "success"),
            RowStatus::Partial => write!(f, "partial"),
            RowStatus::Failure => write!(f, "failure"),
        }
    }
}

/// One enrichment row, produced exactly once per input and immutable after
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentResult {
    pub status: RowStatus,
    /// The raw identifier as supplied
    pub input: String,
    pub official_name: String,
    pub sector: String,
    pub confidence: Confidence,
    pub region: String,
    pub employees: String,
    pub directory_link: String,
    /// Human-readable cause, set on failure rows only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichmentResult {
    /// A failure row: lookup never produced a record, sector fields stay unknown
    fn failed(input: &str, cause: String) -> Self {
        Self {
            status: RowStatus::Failure,
            input: input.to_string(),
            official_name: UNKNOWN.to_string(),
            sector: UNKNOWN.to_string(),
            confidence: Confidence::Low,
            region: UNKNOWN.to_string(),
            employees: UNKNOWN.to_string(),
            directory_link: UNKNOWN.to_string(),
            error: Some(cause),
        }
    }
}

/// Shared enrichment engine: one instance serves all workers
#[derive(Clone)]
pub struct Enricher {
    registry: RegistryClient,
    web: WebClassifier,
    catalog: Arc<SectorCatalog>,
}

impl Enricher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            registry: RegistryClient::new(&config.registry, &config.http)?,
            web: WebClassifier::new(&config.fetcher, &config.http)?,
            catalog: SectorCatalog::from_config(config),
        })
    }

    pub fn catalog(&self) -> &SectorCatalog {
        &self.catalog
    }

    /// Run the full pipeline for one raw identifier. Never returns an error:
    /// every failure mode folds into the row itself.
    pub async fn enrich_one(&self, raw_input: &str) -> EnrichmentResult {
        let query = normalize_query(raw_input);
        debug!("Enriching '{}' (query: '{}')", raw_input, query);

        let record = match self.registry.search(&query).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No registry match for '{}'", query);
                return EnrichmentResult::failed(raw_input, format!("No registry match for '{}'", query));
            }
            Err(e) => {
                warn!("Registry lookup failed for '{}': {:#}", query, e);
                return EnrichmentResult::failed(raw_input, format!("{:#}", e));
            }
        };

        // A best match without a name or identifier is still usable, but the
        // row is flagged so downstream consumers know fields are incomplete
        let status = if record.nom_complet.is_some() && record.siren.is_some() {
            RowStatus::Success
        } else {
            RowStatus::Partial
        };

        let official_name = record.nom_complet.clone().unwrap_or_else(|| UNKNOWN.to_string());
        let naf_code = record.activite_principale.as_deref().unwrap_or("");

        let (sector, confidence) = match self.catalog.classify_code(naf_code) {
            Some(rule) => (rule.label.clone(), Confidence::High),
            None => {
                // Absent, blacklisted, or unmatched code: try the web.
                // Search against the official name when we have one - it is
                // cleaner evidence than the raw input.
                let web_name = if official_name == UNKNOWN { &query } else { &official_name };
                match self.web.classify(&self.catalog, web_name).await {
                    Some(label) => (label, Confidence::Medium),
                    None => (UNIDENTIFIED.to_string(), Confidence::Low),
                }
            }
        };

        EnrichmentResult {
            status,
            input: raw_input.to_string(),
            official_name,
            sector,
            confidence,
            region: record.region().unwrap_or_else(|| UNKNOWN.to_string()),
            employees: record
                .tranche_effectif_salarie
                .clone()
                .unwrap_or_else(|| "NC".to_string()),
            directory_link: record
                .directory_link(self.registry.directory_url())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            error: None,
        }
    }

    /// Run the pipeline over all inputs with a bounded worker pool.
    ///
    /// Completion order is irrelevant; each row carries its input index so
    /// the output lines up with the input order regardless of which lookup
    /// finished first. Always returns exactly one row per input. `on_row`
    /// fires as each row completes (progress reporting).
    pub async fn enrich_all(
        &self,
        inputs: Vec<InputEntry>,
        workers: usize,
        on_row: &(dyn Fn(usize, &EnrichmentResult) + Sync),
    ) -> Vec<EnrichmentResult> {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));

        let row_stream = stream::iter(inputs.into_iter().enumerate().map(|(index, entry)| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                let result = self.enrich_one(&entry.raw).await;
                on_row(index, &result);
                (index, result)
            }
        }));

        let mut indexed: Vec<(usize, EnrichmentResult)> =
            row_stream.buffer_unordered(workers.max(1)).collect().await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}
