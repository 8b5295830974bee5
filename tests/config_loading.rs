//! Integration test: Configuration utilities
//!
//! Tests config path resolution and YAML loading.

use std::io::Write;
use ticker_chart::bin_common::{load_config_from_env, AppConfig, ConfigSource, ConfigType};
use ticker_chart::chart::{ConfigError, HeightMode, TimeStepMode};

#[test]
fn test_chart_config_default_path() {
    // Clear env var to test default
    std::env::remove_var("CHART_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::Chart);
    assert_eq!(config_path.to_str().unwrap(), "config/chart.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_config_type_env_var_names() {
    assert_eq!(ConfigType::Chart.env_var_name(), "CHART_CONFIG_PATH");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let (config, source) = AppConfig::load(&path).unwrap();

    assert_eq!(source, ConfigSource::Defaults(path.clone()));
    assert!(source.to_string().ends_with("not found, using defaults"));
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.chart.line_caching, 50);
    assert_eq!(config.feed.placeholder_price, "120000");
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "line_caching: 3\ntime_step: fixed\nheight_mode: price\nfeed:\n  stream: ethusdt@trade\n"
    )
    .unwrap();

    let (config, source) = AppConfig::load(file.path()).unwrap();
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    assert_eq!(config.chart.line_caching, 3);
    assert_eq!(config.chart.time_step, TimeStepMode::Fixed);
    assert_eq!(config.chart.height_mode, HeightMode::Price);
    assert_eq!(
        config.feed.url(),
        "wss://stream.binance.com:9443/stream?streams=ethusdt@trade"
    );
}

#[test]
fn test_invalid_values_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "line_caching: 0").unwrap();

    let result = AppConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_malformed_yaml_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "line_caching: [not, a, number]").unwrap();

    let result = AppConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::YamlError(_))));
}

#[test]
fn test_shipped_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/chart.yaml");
    let (config, source) = AppConfig::load(&path).unwrap();
    assert!(matches!(source, ConfigSource::File(_)));
    assert_eq!(config, AppConfig::default());
}
