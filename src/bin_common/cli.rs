//! CLI utilities for binaries
//!
//! Resolves the configuration path from the command line or environment.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Chart configuration (config/chart.yaml)
    Chart,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Chart => "config/chart.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "CHART_CONFIG_PATH"
    }

    /// First positional argument as a custom path, otherwise the chart default
    pub fn from_args(args: &[String]) -> Self {
        args.first()
            .map(|path| ConfigType::Custom(path.clone()))
            .unwrap_or(ConfigType::Chart)
    }
}

/// Load configuration path from environment or use default.
///
/// A custom path always wins over the environment.
///
/// # Examples
/// ```
/// use ticker_chart::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("demo.yaml".into()));
/// assert_eq!(path.to_str(), Some("demo.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Chart.default_path(), "config/chart.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_from_args() {
        assert!(matches!(ConfigType::from_args(&[]), ConfigType::Chart));

        let args = vec!["other.yaml".to_string(), "ignored".to_string()];
        match ConfigType::from_args(&args) {
            ConfigType::Custom(path) => assert_eq!(path, "other.yaml"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
