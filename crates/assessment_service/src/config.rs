//! Engine configuration
//!
//! Configuration is layered: built-in defaults, then an optional file, then
//! `FRAUD__`-prefixed environment variables, e.g.
//!
//! ```bash
//! FRAUD_CONFIG_FILE=fraud.toml FRAUD__NETWORK__RADIUS=3 FRAUD__TIMEOUTS__PATTERN_MS=2000
//! ```
//!
//! Every section is validated before an engine is built, so a bad weight or
//! threshold fails at startup and never in the middle of a run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use domain_network::NetworkConfig;
use domain_signals::{
    InconsistencyConfig, PatternConfig, PhotoConfig, ScoringConfig, SeverityThresholds,
    SignalCategory,
};

use crate::error::AssessmentError;

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "FRAUD_CONFIG_FILE";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "FRAUD";

/// Per-evaluator time limits, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorTimeouts {
    pub inconsistency_ms: u64,
    pub pattern_ms: u64,
    pub photo_ms: u64,
}

impl Default for EvaluatorTimeouts {
    fn default() -> Self {
        Self {
            inconsistency_ms: 5_000,
            pattern_ms: 5_000,
            photo_ms: 5_000,
        }
    }
}

impl EvaluatorTimeouts {
    pub fn millis(&self, category: SignalCategory) -> u64 {
        match category {
            SignalCategory::Inconsistency => self.inconsistency_ms,
            SignalCategory::PatternMatch => self.pattern_ms,
            SignalCategory::PhotoAuthenticity => self.photo_ms,
        }
    }

    pub fn for_category(&self, category: SignalCategory) -> Duration {
        Duration::from_millis(self.millis(category))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for category in SignalCategory::ALL {
            if self.millis(category) == 0 {
                return Err(CoreError::configuration(format!(
                    "{} evaluator timeout must be greater than zero",
                    category
                )));
            }
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub severity: SeverityThresholds,
    pub scoring: ScoringConfig,
    pub inconsistency: InconsistencyConfig,
    pub pattern: PatternConfig,
    pub photo: PhotoConfig,
    pub network: NetworkConfig,
    pub timeouts: EvaluatorTimeouts,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            severity: SeverityThresholds::default(),
            scoring: ScoringConfig::default(),
            inconsistency: InconsistencyConfig::default(),
            pattern: PatternConfig::default(),
            photo: PhotoConfig::default(),
            network: NetworkConfig::default(),
            timeouts: EvaluatorTimeouts::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl AssessmentConfig {
    /// Loads configuration from defaults, an optional file and the environment.
    ///
    /// Without an explicit `path` the file named by `FRAUD_CONFIG_FILE` is
    /// used if that variable is set. A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::ConfigSource` when a source cannot be read or
    /// deserialized and `AssessmentError::Configuration` when a value is out
    /// of range.
    pub fn load(path: Option<&Path>) -> Result<Self, AssessmentError> {
        dotenvy::dotenv().ok();

        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));
        let file = path.map(|p| config::File::from(p).required(true));

        let config = Self::layered(file)?;
        tracing::debug!(?config, "Loaded assessment configuration");
        Ok(config)
    }

    /// Loads configuration from a TOML document layered over the defaults
    pub fn from_toml(toml: &str) -> Result<Self, AssessmentError> {
        Self::layered(Some(config::File::from_str(toml, config::FileFormat::Toml)))
    }

    fn layered<S>(file: Option<S>) -> Result<Self, AssessmentError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AssessmentConfig::default())?);
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        let config: AssessmentConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates every section
    pub fn validate(&self) -> Result<(), CoreError> {
        self.severity.validate()?;
        self.scoring.validate()?;
        self.inconsistency.validate()?;
        self.pattern.validate()?;
        self.photo.validate()?;
        self.network.validate()?;
        self.timeouts.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AssessmentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AssessmentConfig {
            timeouts: EvaluatorTimeouts {
                pattern_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("pattern_match"));
    }

    #[test]
    fn test_toml_overrides_only_named_values() {
        let config = AssessmentConfig::from_toml(
            r#"
            log_level = "debug"

            [network]
            radius = 3

            [timeouts]
            pattern_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.network.radius, 3);
        assert_eq!(config.network.min_claimants, 3);
        assert_eq!(config.timeouts.pattern_ms, 1500);
        assert_eq!(config.timeouts.photo_ms, 5000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_invalid_file_values_fail_fast() {
        let result = AssessmentConfig::from_toml(
            r#"
            [severity]
            medium = 0.9
            high = 0.6
            critical = 0.85
            "#,
        );
        assert!(matches!(result, Err(AssessmentError::Configuration(_))));
    }

    #[test]
    fn test_misspelled_ceiling_category_fails_fast() {
        let result = AssessmentConfig::from_toml(
            r#"
            [inconsistency.category_ceilings]
            auto_colision = "30000"
            "#,
        );
        match result {
            Err(AssessmentError::Configuration(message)) => assert!(message.contains("auto_colision")),
            other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_timeout_lookup_by_category() {
        let timeouts = EvaluatorTimeouts {
            photo_ms: 250,
            ..Default::default()
        };
        assert_eq!(
            timeouts.for_category(SignalCategory::PhotoAuthenticity),
            Duration::from_millis(250)
        );
    }
}
