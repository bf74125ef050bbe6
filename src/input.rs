//! Batch input handling: raw identifier parsing and query normalization
//!
//! Supports:
//! - Plain text files with one identifier per line (names or emails)
//! - CSV files with identifiers in the first column or a "company" column
//! - Comment (#) and blank-line skipping
//! - Error resilience (malformed lines are skipped, not fatal)

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// One raw identifier from the batch input, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct InputEntry {
    /// The raw identifier as supplied (bare name or email address)
    pub raw: String,
}

impl InputEntry {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// Turn a raw identifier into a registry lookup term.
///
/// For email addresses this takes the domain label between '@' and the first
/// following dot - "contact@acme.fr" becomes "acme". The label usually
/// approximates the company name; this is best-effort and intentionally
/// lossy. Malformed email-like strings (no dot after '@') fall back to the
/// trimmed original.
pub fn normalize_query(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((_, after_at)) = trimmed.split_once('@') {
        if let Some((label, _)) = after_at.split_once('.') {
            if !label.is_empty() {
                return label.to_string();
            }
        }
        return trimmed.to_string();
    }
    trimmed.to_string()
}

/// Input format for batch files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    /// CSV file, identifiers in the first column or a "company" column
    Csv,
    /// Plain text, one identifier per line
    Text,
}

impl InputFormat {
    /// Detect format from file extension; anything but .csv is plain text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
            Some("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

/// Parse the identifier list from a file (format detected from extension)
pub fn parse_input_file(path: &Path) -> Result<Vec<InputEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    match InputFormat::from_path(path) {
        InputFormat::Csv => parse_csv_inputs(&content),
        InputFormat::Text => Ok(parse_text_inputs(&content)),
    }
}

/// Parse identifiers from newline-delimited text
pub fn parse_text_inputs(content: &str) -> Vec<InputEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(InputEntry::new)
        .collect()
}

/// Parse identifiers from CSV content.
///
/// Two accepted shapes:
/// 1. A header row containing a "company" column (case-insensitive)
/// 2. No header - the first column of every row is the identifier
pub fn parse_csv_inputs(content: &str) -> Result<Vec<InputEntry>> {
    let mut entries = Vec::new();

    let first_line = content.lines().next().unwrap_or("").to_lowercase();
    let has_header = first_line
        .split(',')
        .any(|h| h.trim().trim_matches('"') == "company");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(content.as_bytes());

    let company_idx = if has_header {
        let headers = reader.headers().context("Failed to read CSV headers")?;
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("company"))
            .unwrap_or(0)
    } else {
        0
    };

    for result in reader.records() {
        let record = result.context("Failed to parse CSV record")?;
        let raw = record
            .get(company_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with('#'));
        if let Some(raw) = raw {
            entries.push(InputEntry::new(raw));
        }
    }

    Ok(entries)
}
