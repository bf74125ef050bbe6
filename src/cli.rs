use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sirenrich")]
#[command(about = "Enrich company names or emails with sector classification from the French business registry")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/sirenrich.toml
    #[arg(long)]
    pub init: bool,

    /// A single company name or email to enrich
    #[arg(short, long, conflicts_with = "input_file")]
    pub query: Option<String>,

    /// Path to a text or CSV file of identifiers (one per line, or first
    /// column / "company" column for CSV)
    #[arg(short, long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Output format: 'csv' (default) or 'json'
    #[arg(short = 'f', long, default_value = "csv")]
    pub output_format: String,

    /// Output directory for the results file (defaults to Desktop)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Output filename (extension follows the format if not provided)
    #[arg(short, long, default_value = "enrichment")]
    pub output: String,

    /// Number of concurrent enrichment workers (overrides config)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Verbose logging (-v for per-row detail, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Skip exporting to a file, print the table only
    #[arg(long)]
    pub no_export: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if !self.init && self.query.is_none() && self.input_file.is_none() {
            return Err("Provide --query or --input-file (or --init to create a config)".to_string());
        }

        if let Some(q) = &self.query {
            if q.trim().is_empty() {
                return Err("Query cannot be empty".to_string());
            }
        }

        if !["csv", "json"].contains(&self.output_format.as_str()) {
            return Err("Output format must be 'csv' or 'json'".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Workers must be greater than 0".to_string());
            }
            if workers > 20 {
                return Err("Workers cannot exceed 20 to avoid search-provider blocks".to_string());
            }
        }

        Ok(())
    }

    pub fn get_default_output_dir() -> String {
        if let Some(desktop_dir) = dirs::desktop_dir() {
            desktop_dir.to_string_lossy().to_string()
        } else {
            ".".to_string()
        }
    }

    pub fn get_output_path(&self) -> String {
        let dir = self
            .output_dir
            .clone()
            .unwrap_or_else(Self::get_default_output_dir);
        let filename = if self.output.contains('.') {
            self.output.clone()
        } else {
            format!("{}.{}", self.output, self.output_format)
        };
        std::path::Path::new(&dir)
            .join(filename)
            .to_string_lossy()
            .to_string()
    }
}
