//! Result export: CSV, JSON, and the console summary table

use crate::enrich::{EnrichmentResult, RowStatus};
use crate::sector::Confidence;
use anyhow::Result;
use chrono::Utc;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

pub fn export_csv(results: &[EnrichmentResult], output_path: &str) -> Result<()> {
    debug!("Exporting {} rows to CSV: {}", results.len(), output_path);

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record([
        "Status",
        "Input",
        "Official Name",
        "Sector",
        "Confidence",
        "Region",
        "Employees",
        "Directory Link",
        "Error",
    ])?;

    for row in results {
        let status = row.status.to_string();
        let confidence = row.confidence.to_string();
        wtr.write_record([
            status.as_str(),
            row.input.as_str(),
            row.official_name.as_str(),
            row.sector.as_str(),
            confidence.as_str(),
            row.region.as_str(),
            row.employees.as_str(),
            row.directory_link.as_str(),
            row.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    info!("Successfully exported {} rows to CSV: {}", results.len(), output_path);

    Ok(())
}

pub fn export_json(results: &[EnrichmentResult], output_path: &str) -> Result<()> {
    debug!("Exporting {} rows to JSON: {}", results.len(), output_path);

    let json_output = JsonExport {
        summary: ExportSummary {
            total_rows: results.len(),
            successful: results.iter().filter(|r| r.status == RowStatus::Success).count(),
            partial: results.iter().filter(|r| r.status == RowStatus::Partial).count(),
            failed: results.iter().filter(|r| r.status == RowStatus::Failure).count(),
            high_confidence: results.iter().filter(|r| r.confidence == Confidence::High).count(),
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        },
        results: results.to_vec(),
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;

    let mut file = File::create(output_path)?;
    file.write_all(json_string.as_bytes())?;

    info!("Successfully exported {} rows to JSON: {}", results.len(), output_path);

    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport {
    summary: ExportSummary,
    results: Vec<EnrichmentResult>,
}

#[derive(serde::Serialize)]
struct ExportSummary {
    total_rows: usize,
    successful: usize,
    partial: usize,
    failed: usize,
    high_confidence: usize,
    generated_at: String,
}

/// Print the result table and a summary block to the console
pub fn print_results(results: &[EnrichmentResult]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    println!();
    for row in results {
        let marker = match row.status {
            RowStatus::Success => "✅",
            RowStatus::Partial => "⚠️",
            RowStatus::Failure => "❌",
        };
        match &row.error {
            Some(cause) => println!("{} {:<30} {}", marker, row.input, cause),
            None => println!(
                "{} {:<30} {:<35} {:<32} {}",
                marker, row.input, row.official_name, row.sector, row.confidence.stars()
            ),
        }
    }

    let successful = results.iter().filter(|r| r.status == RowStatus::Success).count();
    let partial = results.iter().filter(|r| r.status == RowStatus::Partial).count();
    let failed = results.iter().filter(|r| r.status == RowStatus::Failure).count();
    let high = results.iter().filter(|r| r.confidence == Confidence::High).count();
    let medium = results.iter().filter(|r| r.confidence == Confidence::Medium).count();

    println!("\n=== Enrichment Summary ===");
    println!("Total inputs:      {}", results.len());
    println!("Successful:        {}", successful);
    if partial > 0 {
        println!("Partial:           {}", partial);
    }
    println!("Failed:            {}", failed);
    println!("High confidence:   {} (registry code)", high);
    println!("Medium confidence: {} (web evidence)", medium);
    println!("==========================\n");
}
