use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{BenchError, BenchResult};

/// Configuration for a benchmark trial.
///
/// Every tunable constant of the harness lives here and is passed explicitly into
/// fixture construction and strategy invocation.
///
/// # Configuration Locations
///
/// Values are layered from these locations, later entries taking precedence:
/// 1. Global `$HOME/.config/rulebench/config.yaml`
/// 2. Local `.rulebench.yaml` in the current directory
/// 3. Custom config file specified via `--config` flag
///
/// # Configuration Format
///
/// ```yaml
/// # Number of non-matching patterns placed before the matching one
/// pattern_count: 50000
///
/// # Workers in each per-invocation executor pool
/// pool_size: 8
///
/// # Workers in the long-lived pool created at setup
/// shared_pool_size: 16
///
/// # Subject string every pattern is matched against
/// target: "456789"
///
/// # Pattern repeated pattern_count times, must not match the target
/// miss_pattern: "^123.*"
///
/// # Pattern appended last, must match the target
/// hit_pattern: "^456.*"
///
/// # Harness iterations used by the CLI runner
/// warmup_iterations: 2
/// measurement_iterations: 20
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of copies of the non-matching pattern in the fixture
    #[serde(default = "default_pattern_count")]
    pub pattern_count: u64,

    /// Size of the pool each executor strategy creates per invocation
    #[serde(default = "default_pool_size")]
    pub pool_size: NonZeroUsize,

    /// Size of the long-lived pool created once per setup
    #[serde(default = "default_shared_pool_size")]
    pub shared_pool_size: NonZeroUsize,

    /// The string every pattern is matched against
    #[serde(default = "default_target")]
    pub target: String,

    /// Source of the pattern that fills the fixture
    #[serde(default = "default_miss_pattern")]
    pub miss_pattern: String,

    /// Source of the single pattern appended at the end of the fixture
    #[serde(default = "default_hit_pattern")]
    pub hit_pattern: String,

    /// Unmeasured invocations per strategy before sampling starts
    #[serde(default = "default_warmup_iterations")]
    pub warmup_iterations: usize,

    /// Measured invocations per strategy
    #[serde(default = "default_measurement_iterations")]
    pub measurement_iterations: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_pattern_count() -> u64 {
    50_000
}

fn default_pool_size() -> NonZeroUsize {
    NonZeroUsize::new(8).unwrap()
}

fn default_shared_pool_size() -> NonZeroUsize {
    NonZeroUsize::new(16).unwrap()
}

fn default_target() -> String {
    "456789".to_string()
}

fn default_miss_pattern() -> String {
    "^123.*".to_string()
}

fn default_hit_pattern() -> String {
    "^456.*".to_string()
}

fn default_warmup_iterations() -> usize {
    2
}

fn default_measurement_iterations() -> usize {
    20
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            pattern_count: default_pattern_count(),
            pool_size: default_pool_size(),
            shared_pool_size: default_shared_pool_size(),
            target: default_target(),
            miss_pattern: default_miss_pattern(),
            hit_pattern: default_hit_pattern(),
            warmup_iterations: default_warmup_iterations(),
            measurement_iterations: default_measurement_iterations(),
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub pattern_count: Option<u64>,
    pub pool_size: Option<NonZeroUsize>,
    pub target: Option<String>,
    pub warmup_iterations: Option<usize>,
    pub measurement_iterations: Option<usize>,
    pub log_level: Option<String>,
}

impl BenchConfig {
    /// Loads configuration, layering an explicit file over the default locations.
    ///
    /// The explicit file is required to exist; the default locations are optional.
    pub fn load_from(config_path: Option<&Path>) -> BenchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("rulebench/config.yaml")),
            Some(PathBuf::from(".rulebench.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of file values
    pub fn merge_with_cli(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(count) = overrides.pattern_count {
            self.pattern_count = count;
        }
        if let Some(size) = overrides.pool_size {
            self.pool_size = size;
        }
        if let Some(target) = overrides.target {
            self.target = target;
        }
        if let Some(warmup) = overrides.warmup_iterations {
            self.warmup_iterations = warmup;
        }
        if let Some(iterations) = overrides.measurement_iterations {
            self.measurement_iterations = iterations;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> BenchResult<()> {
        if self.target.is_empty() {
            return Err(BenchError::config_error("target must not be empty"));
        }
        if self.miss_pattern.is_empty() || self.hit_pattern.is_empty() {
            return Err(BenchError::config_error(
                "miss_pattern and hit_pattern must not be empty",
            ));
        }
        if self.measurement_iterations == 0 {
            return Err(BenchError::config_error(
                "measurement_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            pattern_count: 1000
            pool_size: 4
            shared_pool_size: 2
            target: "abc"
            miss_pattern: "^x"
            hit_pattern: "^a"
            warmup_iterations: 1
            measurement_iterations: 5
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = BenchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.pattern_count, 1000);
        assert_eq!(config.pool_size, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.shared_pool_size, NonZeroUsize::new(2).unwrap());
        assert_eq!(config.target, "abc");
        assert_eq!(config.miss_pattern, "^x");
        assert_eq!(config.hit_pattern, "^a");
        assert_eq!(config.warmup_iterations, 1);
        assert_eq!(config.measurement_iterations, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"pattern_count: 10\n").unwrap();

        let config = BenchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.pattern_count, 10);
        assert_eq!(config.pool_size, NonZeroUsize::new(8).unwrap());
        assert_eq!(config.shared_pool_size, NonZeroUsize::new(16).unwrap());
        assert_eq!(config.target, "456789");
        assert_eq!(config.miss_pattern, "^123.*");
        assert_eq!(config.hit_pattern, "^456.*");
        assert_eq!(config.warmup_iterations, 2);
        assert_eq!(config.measurement_iterations, 20);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_builtin_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.pattern_count, 50_000);
        assert_eq!(config.pool_size.get(), 8);
        assert_eq!(config.shared_pool_size.get(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = BenchConfig {
            pattern_count: 100,
            log_level: "info".to_string(),
            ..Default::default()
        };

        let merged = file_config.merge_with_cli(ConfigOverrides {
            pattern_count: Some(3),
            pool_size: Some(NonZeroUsize::new(2).unwrap()),
            measurement_iterations: Some(7),
            ..Default::default()
        });

        assert_eq!(merged.pattern_count, 3); // CLI value
        assert_eq!(merged.pool_size.get(), 2); // CLI value
        assert_eq!(merged.measurement_iterations, 7); // CLI value
        assert_eq!(merged.warmup_iterations, 2); // File value (CLI None)
        assert_eq!(merged.log_level, "info"); // File value (CLI None)
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            pattern_count: "many"  # Should be number
            pool_size: 0  # Must be non-zero
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = BenchConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let config = BenchConfig {
            target: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BenchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = BenchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
