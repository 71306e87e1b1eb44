use std::path::{Path, PathBuf};

pub const DEFAULT_LAST_DIR_FILE: &str = ".last_card_dir";

/// 記住上次使用的卡圖目錄：單行文字檔，內容是絕對路徑。
/// 讀寫失敗只記錄日誌。
#[derive(Debug, Clone)]
pub struct LastDirectoryStore {
    file: PathBuf,
}

impl LastDirectoryStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// 檔案存在、內容非空且指向現存目錄時才回傳
    pub fn load(&self) -> Option<PathBuf> {
        if !self.file.exists() {
            return None;
        }

        let text = match std::fs::read_to_string(&self.file) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    "Failed to load last directory from {}: {}",
                    self.file.display(),
                    e
                );
                return None;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let path = PathBuf::from(text);
        if path.is_dir() {
            Some(path)
        } else {
            tracing::debug!("Saved last directory no longer exists: {}", path.display());
            None
        }
    }

    pub fn save(&self, dir: &Path) -> bool {
        let absolute = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

        match std::fs::write(&self.file, absolute.to_string_lossy().as_bytes()) {
            Ok(()) => {
                tracing::debug!("Saved last directory {} to {}", absolute.display(), self.file.display());
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to save last directory to {}: {}",
                    self.file.display(),
                    e
                );
                false
            }
        }
    }
}

impl Default for LastDirectoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_LAST_DIR_FILE)
    }
}
