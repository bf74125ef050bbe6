//! Configuration management for sirenrich
//!
//! All configuration is loaded from `./config/sirenrich.toml`. No hardcoded
//! defaults exist in source code - all defaults are in the config template,
//! including the sector catalog, the NAF-code blacklist, and the outbound-link
//! signature rules.

use serde::Deserialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::fs;
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/sirenrich.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/sirenrich.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Duplicate sector label in catalog: {0}")]
    DuplicateSector(String),

    #[error("Signature rule references unknown sector '{sector}' (markers: {markers:?})")]
    UnknownSignatureSector { sector: String, markers: Vec<String> },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub registry: RegistryConfig,
    pub fetcher: FetcherConfig,
    pub analysis: AnalysisConfig,
    pub sectors: Vec<SectorConfig>,
    pub signatures: Vec<SignatureConfig>,
}

/// HTTP client configuration shared by the registry client and the fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
}

/// Business registry endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub endpoint: String,
    pub directory_url: String,
    pub timeout_secs: u64,
}

/// Web fallback fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    pub search_endpoint: String,
    pub search_hint: String,
    pub timeout_secs: u64,
}

/// Enrichment pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Concurrent enrichment pipelines
    pub workers: usize,
    /// NAF codes that always fall through to the web fallback
    pub naf_blacklist: Vec<String>,
}

/// One catalog sector: label, NAF prefixes, fallback keywords.
/// Catalog order is the order of `[[sectors]]` entries in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct SectorConfig {
    pub label: String,
    pub naf_prefixes: Vec<String>,
    pub keywords: Vec<String>,
}

/// One outbound-link signature rule, checked in file order
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureConfig {
    pub markers: Vec<String>,
    pub sector: String,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }

        for (field, url) in [
            ("registry.endpoint", &self.registry.endpoint),
            ("registry.directory_url", &self.registry.directory_url),
            ("fetcher.search_endpoint", &self.fetcher.search_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: url.clone(),
                });
            }
        }

        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "registry.timeout_secs".to_string(),
            });
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "fetcher.timeout_secs".to_string(),
            });
        }
        if self.analysis.workers == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "analysis.workers".to_string(),
            });
        }

        if self.sectors.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "sectors".to_string(),
            });
        }

        // Labels are the catalog keys; duplicates would make results ambiguous
        let mut seen = std::collections::HashSet::new();
        for sector in &self.sectors {
            if sector.label.trim().is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: "sectors.label".to_string(),
                });
            }
            if !seen.insert(sector.label.as_str()) {
                return Err(ConfigError::DuplicateSector(sector.label.clone()));
            }
        }

        // Every signature rule must point at a catalog sector
        for sig in &self.signatures {
            if sig.markers.is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: "signatures.markers".to_string(),
                });
            }
            if !seen.contains(sig.sector.as_str()) {
                return Err(ConfigError::UnknownSignatureSector {
                    sector: sig.sector.clone(),
                    markers: sig.markers.clone(),
                });
            }
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::from_toml(DEFAULT_CONFIG);
        assert!(config.is_ok(), "Default config should parse: {:?}", config.err());
    }

    #[test]
    fn test_default_config_catalog() {
        let config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert!(config.sectors.len() >= 20, "Default catalog should cover the full sector set");
        assert_eq!(config.analysis.naf_blacklist, vec!["7010Z", "6420Z"]);
        assert_eq!(config.signatures.len(), 3);
        // First signature rule must be the code-hosting one - priority order
        assert!(config.signatures[0].markers.contains(&"github.com".to_string()));
    }

    #[test]
    fn test_duplicate_sector_rejected() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        let first = config.sectors[0].clone();
        config.sectors.push(first);
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateSector(_))));
    }

    #[test]
    fn test_unknown_signature_sector_rejected() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        config.signatures.push(SignatureConfig {
            markers: vec!["example.com".to_string()],
            sector: "No Such Sector".to_string(),
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownSignatureSector { .. })
        ));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        config.registry.endpoint = "not-a-url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        config.analysis.workers = 0;
        assert!(config.validate().is_err());
    }
}
