//! Sector catalog and NAF-code classification
//!
//! The catalog is an immutable value built once from configuration and shared
//! read-only across workers. Classification order is deterministic: sectors
//! are checked in catalog order and the first matching NAF prefix wins, so a
//! given code always maps to the same sector across runs.

use crate::config::{AppConfig, SectorConfig, SignatureConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How authoritative a sector assignment is.
///
/// High is only ever produced by the NAF-code path, Medium only by the
/// web-derived paths (link signature or keyword score), Low when every
/// signal missed or the fallback fetch itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Star rendering for the console table, matching the export legend:
    /// three stars = official registry code, two = web evidence, one = none.
    pub fn stars(&self) -> &'static str {
        match self {
            Confidence::High => "⭐⭐⭐",
            Confidence::Medium => "⭐⭐",
            Confidence::Low => "⭐",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// One sector rule: a unique label, ordered NAF prefixes, fallback keywords
#[derive(Debug, Clone)]
pub struct SectorRule {
    pub label: String,
    pub naf_prefixes: Vec<String>,
    pub keywords: Vec<String>,
}

/// An outbound-link signature: any marker substring implies the sector
#[derive(Debug, Clone)]
pub struct SignatureRule {
    pub markers: Vec<String>,
    pub sector: String,
}

/// Immutable sector catalog shared by all enrichment workers
#[derive(Debug, Clone)]
pub struct SectorCatalog {
    rules: Vec<SectorRule>,
    signatures: Vec<SignatureRule>,
    /// Blacklisted codes, stored dot-stripped for comparison
    blacklist: Vec<String>,
}

/// Strip separator punctuation from a NAF code ("62.02Z" -> "6202Z")
fn clean_code(code: &str) -> String {
    code.trim().replace('.', "")
}

impl SectorCatalog {
    pub fn new(
        sectors: &[SectorConfig],
        signatures: &[SignatureConfig],
        naf_blacklist: &[String],
    ) -> Self {
        let rules = sectors
            .iter()
            .map(|s| SectorRule {
                label: s.label.clone(),
                naf_prefixes: s.naf_prefixes.clone(),
                keywords: s.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();

        let signatures = signatures
            .iter()
            .map(|s| SignatureRule {
                markers: s.markers.iter().map(|m| m.to_lowercase()).collect(),
                sector: s.sector.clone(),
            })
            .collect();

        let blacklist = naf_blacklist.iter().map(|c| clean_code(c)).collect();

        Self { rules, signatures, blacklist }
    }

    /// Build the shared catalog from a validated configuration
    pub fn from_config(config: &AppConfig) -> Arc<Self> {
        Arc::new(Self::new(
            &config.sectors,
            &config.signatures,
            &config.analysis.naf_blacklist,
        ))
    }

    /// Sector rules in catalog order
    pub fn rules(&self) -> &[SectorRule] {
        &self.rules
    }

    /// Signature rules in priority order
    pub fn signatures(&self) -> &[SignatureRule] {
        &self.signatures
    }

    /// Whether a NAF code is blacklisted (dot-insensitive comparison).
    /// Blacklisted codes denote passive holding entities whose nominal code
    /// misrepresents the operating business, so web evidence is used instead.
    pub fn is_blacklisted(&self, code: &str) -> bool {
        let cleaned = clean_code(code);
        self.blacklist.iter().any(|b| *b == cleaned)
    }

    /// Classify a raw NAF code against the catalog.
    ///
    /// Returns the first catalog-order sector with a matching prefix, or
    /// `None` for an empty, blacklisted, or unmatched code. Callers treat a
    /// hit as High confidence - the code comes from the official registry.
    pub fn classify_code(&self, raw_code: &str) -> Option<&SectorRule> {
        let code = clean_code(raw_code);
        if code.is_empty() {
            return None;
        }
        if self.is_blacklisted(&code) {
            debug!("NAF code {} is blacklisted, forcing web fallback", code);
            return None;
        }

        for rule in &self.rules {
            for prefix in &rule.naf_prefixes {
                if code.starts_with(prefix.as_str()) {
                    debug!("NAF code {} matched prefix {} -> {}", code, prefix, rule.label);
                    return Some(rule);
                }
            }
        }

        debug!("NAF code {} matched no sector prefix", code);
        None
    }
}
