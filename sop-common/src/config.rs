//! Configuration loading and config file resolution
//!
//! Resolution priority for the config file:
//! 1. Command-line argument (highest priority)
//! 2. `SOP_AUDIT_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/sop-audit/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or broken file found through 2 or 3 never stops the tool: a
//! warning is logged and the compiled defaults are used. A file named
//! explicitly on the command line must load.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "SOP_AUDIT_CONFIG";

/// Directory name under the platform config dir
const APP_DIR_NAME: &str = "sop-audit";

/// Config file name inside [`APP_DIR_NAME`]
const CONFIG_FILE_NAME: &str = "config.toml";

/// Full TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub enrichment: EnrichmentConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset (e.g. "info", "sop_audit=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[analysis]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Central-tendency strategy for the time-based index ("median" or "average")
    pub strategy: String,
    /// Weight applied to the referring-domains quartile in the composite score
    pub rd_weight: f64,
    /// Weight applied to the traffic quartile in the composite score
    pub traffic_weight: f64,
    /// Number of rows reported as top performers
    pub top_n: usize,
    /// Out/underperformer threshold for time-based queries
    pub threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategy: "median".to_string(),
            rd_weight: 1.0,
            traffic_weight: 1.0,
            top_n: 10,
            threshold: 1.0,
        }
    }
}

/// `[enrichment]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Whether undated records are enriched before time-based analysis
    ///
    /// Off by default: the bundled lookup only simulates dates.
    pub enabled: bool,
    /// Delay between publish-date lookups in milliseconds
    pub delay_ms: u64,
    /// JSON file persisting the url → publish date cache between runs
    pub cache_file: Option<PathBuf>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 500,
            cache_file: None,
        }
    }
}

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformDefault(PathBuf),
    CompiledDefaults,
}

/// Resolves and loads the configuration file following the priority order
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Determine which config file (if any) applies, without reading it
    pub fn resolve_source(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        match default_config_path() {
            Some(path) if path.exists() => ConfigSource::PlatformDefault(path),
            _ => ConfigSource::CompiledDefaults,
        }
    }

    /// Load the resolved configuration
    ///
    /// Only a file named on the command line can produce an error here.
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve_source() {
            ConfigSource::CommandLine(path) => {
                let config = load_toml_config(&path)?;
                info!("Configuration loaded from {}", path.display());
                Ok(config)
            }
            ConfigSource::Environment(path) | ConfigSource::PlatformDefault(path) => {
                match load_toml_config(&path) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        Ok(config)
                    }
                    Err(e) => {
                        warn!("{}; using compiled defaults", e);
                        Ok(TomlConfig::default())
                    }
                }
            }
            ConfigSource::CompiledDefaults => {
                debug!("No config file found; using compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform config file location (`~/.config/sop-audit/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Write the compiled defaults to `path` as a starting config file
///
/// An existing file is only replaced when `overwrite` is set.
pub fn init_config(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(Error::Config(format!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    write_toml_config(&TomlConfig::default(), path)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.analysis.strategy, "median");
        assert_eq!(config.analysis.rd_weight, 1.0);
        assert_eq!(config.analysis.traffic_weight, 1.0);
        assert_eq!(config.analysis.top_n, 10);
        assert!(!config.enrichment.enabled);
        assert_eq!(config.enrichment.delay_ms, 500);
        assert!(config.enrichment.cache_file.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [analysis]
            strategy = "average"

            [enrichment]
            delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.strategy, "average");
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.enrichment.delay_ms, 0);
        assert!(!config.enrichment.enabled);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_cli_path_wins() {
        let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/explicit.toml")));
        assert_eq!(
            resolver.resolve_source(),
            ConfigSource::CommandLine(PathBuf::from("/tmp/explicit.toml"))
        );
    }
}
