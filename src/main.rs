use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use sirenrich::cli::Cli;
use sirenrich::config::{self, AppConfig};
use sirenrich::enrich::{Enricher, EnrichmentResult};
use sirenrich::export;
use sirenrich::input::{self, InputEntry};
use sirenrich::logger::{EnrichLogger, VerbosityLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // Handle --init before any other processing
    if cli.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run sirenrich again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(config::ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!("✅ Created default configuration file at: {}", created_path.display());
                    println!("   Edit this file to customize settings, then run sirenrich again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("❌ Configuration file not found at: {}", path.display());
                    eprintln!("   Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let verbosity = VerbosityLevel::from_verbose_count(cli.verbose);
    init_tracing(verbosity);

    let inputs = gather_inputs(&cli)?;
    if inputs.is_empty() {
        eprintln!("❌ No identifiers to process.");
        std::process::exit(1);
    }

    let workers = cli.workers.unwrap_or(app_config.analysis.workers);
    let logger = EnrichLogger::new(verbosity);
    let enricher = Enricher::new(&app_config)?;

    logger.info(&format!(
        "Enriching {} identifier(s) with {} worker(s)...",
        inputs.len(),
        workers
    ));

    let start = Instant::now();
    let results = run_batch(&enricher, &logger, inputs, workers).await;
    let elapsed = start.elapsed().as_secs_f64();

    export::print_results(&results);
    logger.info(&format!("Completed in {:.1}s", elapsed));

    if !cli.no_export {
        let output_path = cli.get_output_path();
        match cli.output_format.as_str() {
            "json" => export::export_json(&results, &output_path)?,
            _ => export::export_csv(&results, &output_path)?,
        }
        println!("📥 Results written to: {}", output_path);
    }

    Ok(())
}

fn init_tracing(verbosity: VerbosityLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.env_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Collect the raw identifiers from --query or --input-file
fn gather_inputs(cli: &Cli) -> Result<Vec<InputEntry>> {
    if let Some(query) = &cli.query {
        return Ok(vec![InputEntry::new(query.trim())]);
    }
    if let Some(file) = &cli.input_file {
        return input::parse_input_file(std::path::Path::new(file));
    }
    Ok(Vec::new())
}

/// Drive the library's worker pool with progress reporting
async fn run_batch(
    enricher: &Enricher,
    logger: &EnrichLogger,
    inputs: Vec<InputEntry>,
    workers: usize,
) -> Vec<EnrichmentResult> {
    let total = inputs.len();
    logger.start_progress(total as u64);

    let on_row = |index: usize, result: &EnrichmentResult| {
        logger.detail(&format!(
            "[{}/{}] {} -> {} ({})",
            index + 1,
            total,
            result.input,
            result.sector,
            result.confidence
        ));
        logger.tick(&result.input);
    };

    let results = enricher.enrich_all(inputs, workers, &on_row).await;
    logger.finish_progress();
    results
}
