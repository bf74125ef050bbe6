pub mod wiremock_helpers;

use sirenrich::config::{AppConfig, DEFAULT_CONFIG};

/// Default config with the registry and search endpoints pointed at mock servers
pub fn test_config(registry_uri: &str, search_uri: &str) -> AppConfig {
    let mut config = AppConfig::from_toml(DEFAULT_CONFIG).expect("default config should parse");
    config.registry.endpoint = format!("{}/search", registry_uri);
    config.registry.timeout_secs = 2;
    config.fetcher.search_endpoint = search_uri.to_string();
    config.fetcher.timeout_secs = 2;
    config.validate().expect("test config should validate");
    config
}
