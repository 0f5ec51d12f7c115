//! Harness configuration loaded from `harness.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::HarnessError;
use crate::simulation::signal_calculations::PathLossParameters;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "harness.toml";

/// Run-wide settings. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HarnessConfig {
    /// Seed every run's link-model RNG starts from.
    pub seed: u64,
    /// Directory receiving one JSON export per sweep.
    pub output_dir: Option<PathBuf>,
    /// JSON scenario replacing the built-in reference topology.
    pub scenario_file: Option<PathBuf>,
    /// Write the gnuplot script to stdout.
    pub stdout: bool,
    /// Link model shared by every variant.
    pub channel: PathLossParameters,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            output_dir: None,
            scenario_file: None,
            stdout: true,
            channel: PathLossParameters::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(HarnessConfig)` if the file was read and parsed
    /// * `Err(HarnessError)` naming the failing step otherwise
    pub fn load(config_path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| HarnessError::FileReadError(format!("{}: {}", config_path.display(), e)))?;

        toml::from_str(&content).map_err(|e| HarnessError::ParseError(format!("{}: {}", config_path.display(), e)))
    }

    /// Load `config_path` when it exists, defaults otherwise.
    pub fn load_or_default(config_path: &Path) -> Result<Self, HarnessError> {
        if config_path.exists() {
            log::info!("Loading configuration from {}", config_path.display());
            Self::load(config_path)
        } else {
            log::debug!("{} not found, using defaults", config_path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: HarnessConfig = toml::from_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn keys_are_kebab_case() {
        let config: HarnessConfig = toml::from_str(
            r#"
            seed = 42
            output-dir = "out"
            scenario-file = "scenes/reference.json"
            stdout = false

            [channel]
            shadowing_sigma = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.scenario_file, Some(PathBuf::from("scenes/reference.json")));
        assert!(!config.stdout);
        assert_eq!(config.channel.shadowing_sigma, 4.0);
        assert_eq!(config.channel.path_loss_exponent, 3.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = HarnessConfig::load_or_default(Path::new("/definitely/not/harness.toml")).unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("harness-{}.toml", std::process::id()));
        std::fs::write(&path, "seed = \"not a number\"").unwrap();
        let result = HarnessConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(HarnessError::ParseError(_))));
    }
}
