use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 可接受的圖片副檔名（比對時不分大小寫）
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// 所有替換結果統一輸出的格式
pub const CANONICAL_EXTENSION: &str = "png";

pub const SMALL_SUFFIX: &str = "_small";

/// Staging 目錄中等待替換的一張異畫圖
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateImage {
    pub path: PathBuf,
    pub stem: String,
}

impl AlternateImage {
    /// 路徑沒有可用的檔名主幹時回傳 None
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let stem = path.file_stem()?.to_str()?.to_string();
        Some(Self { path, stem })
    }
}

/// 在卡圖目錄中找到、檔名符合候選名稱的既有檔案
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetMatch {
    pub path: PathBuf,
}

impl TargetMatch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 縮圖版本：檔名主幹以 `_small` 結尾
    pub fn is_small(&self) -> bool {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.ends_with(SMALL_SUFFIX))
            .unwrap_or(false)
    }

    pub fn depth(&self) -> usize {
        self.path.components().count()
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn has_canonical_extension(&self) -> bool {
        has_extension(&self.path, CANONICAL_EXTENSION)
    }
}

/// 正規化後的目標：`original` 是找到時的路徑，`path` 是改成 PNG 副檔名後的路徑
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedTarget {
    pub original: PathBuf,
    pub path: PathBuf,
}

impl NormalizedTarget {
    pub fn is_stale(&self) -> bool {
        self.original != self.path
    }
}

/// 一張異畫圖在動手修改檔案前的完整計畫
#[derive(Debug, Clone, Serialize)]
pub struct ReplacementPlan {
    pub alt_image: AlternateImage,
    pub candidates: Vec<String>,
    /// 依優先序排好，第一個是主要目標
    pub targets: Vec<TargetMatch>,
    pub normalized: Vec<NormalizedTarget>,
}

impl ReplacementPlan {
    pub fn primary(&self) -> Option<&NormalizedTarget> {
        self.normalized.first()
    }

    pub fn secondaries(&self) -> &[NormalizedTarget] {
        self.normalized.get(1..).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Locating,
    Prioritizing,
    Normalizing,
    Transcoding,
    Duplicating,
    Cleanup,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Replaced,
    NoTargets,
    Failed,
    Planned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    StaleFileRemoval,
    SecondaryCopy,
    Cleanup,
}

/// 不影響替換成功與否、只需記錄的問題
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub alt_image: PathBuf,
    pub candidates: Vec<String>,
    pub targets: Vec<PathBuf>,
    pub primary: Option<PathBuf>,
    pub secondaries: Vec<PathBuf>,
    pub status: ImageStatus,
    pub failed_stage: Option<Stage>,
    pub error: Option<String>,
    pub issues: Vec<Issue>,
}

impl ImageReport {
    pub fn new(alt_image: &Path) -> Self {
        Self {
            alt_image: alt_image.to_path_buf(),
            candidates: Vec::new(),
            targets: Vec::new(),
            primary: None,
            secondaries: Vec::new(),
            status: ImageStatus::NoTargets,
            failed_stage: None,
            error: None,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub processed: usize,
    pub replaced: usize,
    pub no_targets: usize,
    pub failed: usize,
    pub planned: usize,
    pub issues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub cards_dir: PathBuf,
    pub alt_dir: PathBuf,
    pub dry_run: bool,
    pub images: Vec<ImageReport>,
    pub totals: BatchTotals,
}

impl BatchReport {
    pub fn new(cards_dir: &Path, alt_dir: &Path, dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            cards_dir: cards_dir.to_path_buf(),
            alt_dir: alt_dir.to_path_buf(),
            dry_run,
            images: Vec::new(),
            totals: BatchTotals::default(),
        }
    }

    pub fn push(&mut self, report: ImageReport) {
        self.totals.processed += 1;
        match report.status {
            ImageStatus::Replaced => self.totals.replaced += 1,
            ImageStatus::NoTargets => self.totals.no_targets += 1,
            ImageStatus::Failed => self.totals.failed += 1,
            ImageStatus::Planned => self.totals.planned += 1,
        }
        self.totals.issues += report.issues.len();
        self.images.push(report);
    }

    pub fn to_json(&self) -> crate::utils::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub fn has_allowed_extension(path: &Path) -> bool {
    ALLOWED_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
}
