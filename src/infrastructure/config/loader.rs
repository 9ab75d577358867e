use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

/// Project-local config file picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = ".itersearch.yaml";

/// Prefix of environment variable overrides (`ITERSEARCH_SEARCH__THREADS=8`).
pub const ENV_PREFIX: &str = "ITERSEARCH_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid threads: {0}. Must be at least 1")]
    InvalidThreads(u32),

    #[error("Invalid max_rounds: {0}. Must be at least 1")]
    InvalidMaxRounds(u32),

    #[error("Invalid min_percent_increase: {0}. Must be a finite, non-negative number")]
    InvalidPercentIncrease(f64),

    #[error("Invalid sensitivity: {0}. Must be positive")]
    InvalidSensitivity(f64),

    #[error("Output basename cannot be empty")]
    EmptyBasename,

    #[error("Path to the {0} executable cannot be empty")]
    EmptyToolPath(&'static str),

    #[error("Invalid region of interest: start ({0}) is after end ({1})")]
    InvalidRegion(u32, u32),

    #[error("Filtering is enabled but no reference sequences were given")]
    MissingFilterRefs,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, compact, json")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `.itersearch.yaml` in the working directory (optional)
    /// 3. `explicit` config file (`--config`)
    /// 4. Environment variables (`ITERSEARCH_*` prefix)
    ///
    /// Command line flags are applied by the caller afterwards, so the
    /// result is not validated here.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(LOCAL_CONFIG_FILE));

        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")
    }

    /// Validate the fully merged configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.search.threads == 0 {
            return Err(ConfigError::InvalidThreads(config.search.threads));
        }

        if config.search.sensitivity <= 0.0 || !config.search.sensitivity.is_finite() {
            return Err(ConfigError::InvalidSensitivity(config.search.sensitivity));
        }

        if config.convergence.max_rounds == 0 {
            return Err(ConfigError::InvalidMaxRounds(config.convergence.max_rounds));
        }

        let percent = config.convergence.min_percent_increase;
        if percent < 0.0 || !percent.is_finite() {
            return Err(ConfigError::InvalidPercentIncrease(percent));
        }

        if config.output.basename.trim().is_empty() {
            return Err(ConfigError::EmptyBasename);
        }

        let tools = [
            ("mmseqs", &config.tools.mmseqs),
            ("grep_ids", &config.tools.grep_ids),
            ("anti_grep_ids", &config.tools.anti_grep_ids),
        ];
        for (name, path) in tools {
            if path.is_empty() {
                return Err(ConfigError::EmptyToolPath(name));
            }
        }

        let filter = &config.filter;
        if filter.enabled {
            if filter.exe.is_empty() {
                return Err(ConfigError::EmptyToolPath("filter"));
            }
            if filter.refs.is_none() {
                return Err(ConfigError::MissingFilterRefs);
            }
            if filter.roi_start > filter.roi_end {
                return Err(ConfigError::InvalidRegion(filter.roi_start, filter.roi_end));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.search.threads, 1);
        assert_eq!(config.convergence.max_rounds, 10);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_load_explicit_file() {
        let file = yaml_file(
            "output:\n  basename: rnr\nsearch:\n  threads: 6\n  sensitivity: 7.5\nconvergence:\n  max_rounds: 4\n",
        );

        let config = ConfigLoader::load(Some(file.path())).unwrap();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.output.basename, "rnr");
        assert_eq!(config.search.threads, 6);
        assert!((config.search.sensitivity - 7.5).abs() < f64::EPSILON);
        assert_eq!(config.convergence.max_rounds, 4);
        assert!((config.convergence.min_percent_increase - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_file_with_invalid_values_fails_validation() {
        let file = yaml_file("search:\n  threads: 0\n");
        let config = ConfigLoader::load(Some(file.path())).unwrap();
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert_eq!(err, ConfigError::InvalidThreads(0));
        assert!(err.to_string().contains("Invalid threads"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = yaml_file("search:\n  threads: 2\nlogging:\n  level: warn\n");

        temp_env::with_vars(
            [
                ("ITERSEARCH_SEARCH__THREADS", Some("12")),
                ("ITERSEARCH_CONVERGENCE__MIN_PERCENT_INCREASE", Some("2.5")),
            ],
            || {
                let config = ConfigLoader::load(Some(file.path())).unwrap();
                assert_eq!(config.search.threads, 12, "Environment should win");
                assert!((config.convergence.min_percent_increase - 2.5).abs() < f64::EPSILON);
                assert_eq!(config.logging.level, "warn", "File value should persist");
            },
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/itersearch.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_zero_threads() {
        let mut config = Config::default();
        config.search.threads = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThreads(0))
        );
    }

    #[test]
    fn test_validate_zero_max_rounds() {
        let mut config = Config::default();
        config.convergence.max_rounds = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxRounds(0))
        );
    }

    #[test]
    fn test_validate_percent_increase() {
        let mut config = Config::default();
        config.convergence.min_percent_increase = -1.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPercentIncrease(_))
        ));

        config.convergence.min_percent_increase = f64::NAN;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPercentIncrease(_))
        ));

        config.convergence.min_percent_increase = 0.0;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_sensitivity() {
        let mut config = Config::default();
        config.search.sensitivity = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidSensitivity(_))
        ));
    }

    #[test]
    fn test_validate_empty_basename_and_tools() {
        let mut config = Config::default();
        config.output.basename = "  ".to_string();
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::EmptyBasename));

        let mut config = Config::default();
        config.tools.anti_grep_ids = String::new();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyToolPath("anti_grep_ids"))
        );
    }

    #[test]
    fn test_validate_filter() {
        let mut config = Config::default();
        config.filter.enabled = true;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::MissingFilterRefs)
        );

        config.filter.refs = Some(PathBuf::from("refs.fa"));
        config.filter.roi_start = 700;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRegion(700, 625))
        );

        config.filter.roi_start = 437;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_disabled_filter_is_not_checked() {
        let mut config = Config::default();
        config.filter.roi_start = 900;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel("verbose".to_string()))
        );

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat("xml".to_string()))
        );
    }
}
