#[cfg(feature = "cli")]
pub mod cli;
pub mod last_dir;
pub mod toml_config;

use crate::core::transcoder::{DEFAULT_MAX_DIMENSION, MAX_MAX_DIMENSION, MIN_MAX_DIMENSION};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SwapError};
use crate::utils::validation::{validate_existing_dir, validate_range, Validate};
use last_dir::{LastDirectoryStore, DEFAULT_LAST_DIR_FILE};
use std::path::{Path, PathBuf};
use toml_config::TomlConfig;

pub const DEFAULT_ALT_DIR: &str = "data_arts";

/// 遊戲安裝目錄下的卡圖位置
pub const GAME_CARDS_SUBPATH: [&str; 3] = ["OPTCGSim_Data", "StreamingAssets", "Cards"];

pub fn cards_dir_from_game_dir(game_dir: &Path) -> PathBuf {
    GAME_CARDS_SUBPATH
        .iter()
        .fold(game_dir.to_path_buf(), |path, part| path.join(part))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardsDirSource {
    CommandLine,
    ConfigFile,
    LastDirectory,
}

/// 命令列提供的覆蓋值，優先於設定檔
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cards_dir: Option<PathBuf>,
    pub game_dir: Option<PathBuf>,
    pub alt_dir: Option<PathBuf>,
    pub last_dir_file: Option<PathBuf>,
    pub max_dimension: Option<u32>,
    pub no_downscale: bool,
    pub dry_run: bool,
    pub monitor: bool,
    pub json_report: bool,
}

/// 合併命令列、設定檔、上次目錄與預設值後的執行設定
#[derive(Debug, Clone)]
pub struct Settings {
    pub cards_dir: PathBuf,
    pub cards_dir_source: CardsDirSource,
    pub alt_dir: PathBuf,
    pub last_dir_file: PathBuf,
    pub max_dimension: Option<u32>,
    pub dry_run: bool,
    pub monitor: bool,
    pub report: ReportFormat,
}

impl Settings {
    pub fn resolve(overrides: &Overrides, file: &TomlConfig) -> Result<Self> {
        let last_dir_file = overrides
            .last_dir_file
            .clone()
            .or_else(|| file.paths.last_dir_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LAST_DIR_FILE));

        let (cards_dir, cards_dir_source) =
            Self::resolve_cards_dir(overrides, file, &LastDirectoryStore::new(&last_dir_file))?;

        let alt_dir = overrides
            .alt_dir
            .clone()
            .or_else(|| file.paths.alt_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ALT_DIR));

        let downscale = !overrides.no_downscale && file.image.downscale.unwrap_or(true);
        let max_dimension = downscale.then(|| {
            overrides
                .max_dimension
                .or(file.image.max_dimension)
                .unwrap_or(DEFAULT_MAX_DIMENSION)
        });

        let report = if overrides.json_report || file.run.report.as_deref() == Some("json") {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        };

        Ok(Self {
            cards_dir,
            cards_dir_source,
            alt_dir,
            last_dir_file,
            max_dimension,
            dry_run: overrides.dry_run || file.run.dry_run.unwrap_or(false),
            monitor: overrides.monitor || file.run.monitor.unwrap_or(false),
            report,
        })
    }

    fn resolve_cards_dir(
        overrides: &Overrides,
        file: &TomlConfig,
        last_dir: &LastDirectoryStore,
    ) -> Result<(PathBuf, CardsDirSource)> {
        if let Some(dir) = &overrides.cards_dir {
            return Ok((dir.clone(), CardsDirSource::CommandLine));
        }
        if let Some(game) = &overrides.game_dir {
            return Ok((cards_dir_from_game_dir(game), CardsDirSource::CommandLine));
        }
        if let Some(dir) = &file.paths.cards_dir {
            return Ok((dir.clone(), CardsDirSource::ConfigFile));
        }
        if let Some(game) = &file.paths.game_dir {
            return Ok((cards_dir_from_game_dir(game), CardsDirSource::ConfigFile));
        }

        match last_dir.load() {
            Some(dir) => {
                tracing::info!("Using saved last directory: {}", dir.display());
                Ok((dir, CardsDirSource::LastDirectory))
            }
            None => {
                tracing::error!("No cards directory provided and no saved last directory found.");
                Err(SwapError::MissingConfigError {
                    field: "cards_dir".to_string(),
                })
            }
        }
    }

    /// 由命令列或設定檔指定時記下目錄，下次可省略
    pub fn remember_cards_dir(&self) {
        if self.cards_dir_source != CardsDirSource::LastDirectory {
            LastDirectoryStore::new(&self.last_dir_file).save(&self.cards_dir);
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_existing_dir("cards_dir", &self.cards_dir)?;
        validate_existing_dir("alt_dir", &self.alt_dir)?;
        if let Some(max) = self.max_dimension {
            validate_range("max_dimension", max, MIN_MAX_DIMENSION, MAX_MAX_DIMENSION)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn cards_dir(&self) -> &Path {
        &self.cards_dir
    }

    fn alt_dir(&self) -> &Path {
        &self.alt_dir
    }

    fn max_dimension(&self) -> Option<u32> {
        self.max_dimension
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn monitor(&self) -> bool {
        self.monitor
    }
}
