use crate::core::transcoder::{MAX_MAX_DIMENSION, MIN_MAX_DIMENSION};
use crate::utils::error::{Result, SwapError};
use crate::utils::validation::{validate_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub paths: PathsConfig,
    pub image: ImageConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub cards_dir: Option<PathBuf>,
    pub game_dir: Option<PathBuf>,
    pub alt_dir: Option<PathBuf>,
    pub last_dir_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_dimension: Option<u32>,
    pub downscale: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dry_run: Option<bool>,
    pub monitor: Option<bool>,
    pub report: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SwapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SwapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GAME_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        for (field, value) in [
            ("paths.cards_dir", &self.paths.cards_dir),
            ("paths.game_dir", &self.paths.game_dir),
            ("paths.alt_dir", &self.paths.alt_dir),
            ("paths.last_dir_file", &self.paths.last_dir_file),
        ] {
            if let Some(path) = value {
                validate_path(field, path)?;
            }
        }

        if let Some(max) = self.image.max_dimension {
            validate_range("image.max_dimension", max, MIN_MAX_DIMENSION, MAX_MAX_DIMENSION)?;
        }

        if let Some(report) = &self.run.report {
            let valid_formats = ["text", "json"];
            if !valid_formats.contains(&report.as_str()) {
                return Err(SwapError::InvalidConfigValueError {
                    field: "run.report".to_string(),
                    value: report.clone(),
                    reason: format!(
                        "Unsupported report format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[paths]
game_dir = "/games/OPTCGSim"
alt_dir = "data_arts"

[image]
max_dimension = 2048
downscale = true

[run]
dry_run = true
report = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.paths.game_dir, Some(PathBuf::from("/games/OPTCGSim")));
        assert_eq!(config.paths.cards_dir, None);
        assert_eq!(config.image.max_dimension, Some(2048));
        assert_eq!(config.run.dry_run, Some(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.paths.alt_dir.is_none());
        assert!(config.image.max_dimension.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ALT_ART_SWAP_TEST_CARDS", "/tmp/cards");

        let toml_content = r#"
[paths]
cards_dir = "${ALT_ART_SWAP_TEST_CARDS}"
alt_dir = "${ALT_ART_SWAP_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.paths.cards_dir, Some(PathBuf::from("/tmp/cards")));
        assert_eq!(
            config.paths.alt_dir,
            Some(PathBuf::from("${ALT_ART_SWAP_TEST_UNSET_VAR}"))
        );

        std::env::remove_var("ALT_ART_SWAP_TEST_CARDS");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[image]\nmax_dimension = 4\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[run]\nreport = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[image\nmax_dimension = ").unwrap_err();
        assert!(matches!(err, SwapError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[paths]\ncards_dir = \"cards\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.paths.cards_dir, Some(PathBuf::from("cards")));
    }
}
