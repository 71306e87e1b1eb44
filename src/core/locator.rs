use crate::domain::model::{TargetMatch, ALLOWED_EXTENSIONS, SMALL_SUFFIX};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use walkdir::WalkDir;

/// 在卡圖目錄樹中尋找要被替換的既有檔案
#[derive(Debug, Clone)]
pub struct TargetLocator {
    cards_dir: PathBuf,
}

impl TargetLocator {
    pub fn new(cards_dir: impl Into<PathBuf>) -> Self {
        Self {
            cards_dir: cards_dir.into(),
        }
    }

    /// 對每個候選名稱、每個副檔名、有無 `_small` 後綴，找出檔名完全相同的檔案。
    /// 不同候選名稱命中同一檔案時會重複出現，不在此處去重。
    pub fn find_targets(&self, bases: &[String]) -> Vec<TargetMatch> {
        let index = self.index_files();
        let mut targets = Vec::new();

        for base in bases {
            for ext in ALLOWED_EXTENSIONS {
                for suffix in ["", SMALL_SUFFIX] {
                    let candidate_name = OsString::from(format!("{}{}.{}", base, suffix, ext));
                    if let Some(paths) = index.get(&candidate_name) {
                        targets.extend(paths.iter().cloned().map(TargetMatch::new));
                    }
                }
            }
        }

        targets
    }

    /// 檔名 -> 所有同名檔案路徑（依目錄走訪順序）
    fn index_files(&self) -> HashMap<OsString, Vec<PathBuf>> {
        let mut index: HashMap<OsString, Vec<PathBuf>> = HashMap::new();

        let entries = WalkDir::new(&self.cards_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {}: {}", self.cards_dir.display(), e);
                    None
                }
            })
            // 指向檔案的符號連結也算目標
            .filter(|entry| entry.path().is_file());

        for entry in entries {
            index
                .entry(entry.file_name().to_os_string())
                .or_default()
                .push(entry.into_path());
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"img").unwrap();
        path
    }

    #[test]
    fn test_finds_nested_and_small_variants() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let full = touch(root, "cards/OP02-068.png");
        let small = touch(root, "cards/thumbs/deep/er/OP02-068_small.jpg");
        touch(root, "cards/OP02-0680.png");
        touch(root, "cards/XOP02-068.png");
        touch(root, "cards/OP02-068.webp");

        let locator = TargetLocator::new(root);
        let found: Vec<PathBuf> = locator
            .find_targets(&["OP02-068".to_string()])
            .into_iter()
            .map(|t| t.path)
            .collect();

        assert_eq!(found, vec![full, small]);
    }

    #[test]
    fn test_search_order_follows_candidates_then_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let code_jpeg = touch(root, "OP09-051.jpeg");
        let code_png = touch(root, "OP09-051.png");
        let stem_jpg = touch(root, "a/OP09-051Manga alt.jpg");

        let locator = TargetLocator::new(root);
        let found: Vec<PathBuf> = locator
            .find_targets(&["OP09-051Manga alt".to_string(), "OP09-051".to_string()])
            .into_iter()
            .map(|t| t.path)
            .collect();

        assert_eq!(found, vec![stem_jpg, code_png, code_jpeg]);
    }

    #[test]
    fn test_overlapping_candidates_produce_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let small = touch(root, "OP01-001_small.png");

        let locator = TargetLocator::new(root);
        let found = locator.find_targets(&["OP01-001_small".to_string(), "OP01-001".to_string()]);

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.path == small));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_card_images_are_targets() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let real = touch(root, "shared/OP05-119.png");
        let cards = root.join("cards");
        fs::create_dir_all(&cards).unwrap();
        let link = cards.join("OP05-119.png");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        std::os::unix::fs::symlink(root.join("gone.png"), cards.join("OP05-119_small.png")).unwrap();

        let found: Vec<PathBuf> = TargetLocator::new(&cards)
            .find_targets(&["OP05-119".to_string()])
            .into_iter()
            .map(|t| t.path)
            .collect();

        assert_eq!(found, vec![link]);
    }

    #[test]
    fn test_no_matches_and_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "OP01-001.png");

        let locator = TargetLocator::new(temp_dir.path());
        assert!(locator.find_targets(&["ST01-001".to_string()]).is_empty());

        let missing = TargetLocator::new(temp_dir.path().join("nope"));
        assert!(missing.find_targets(&["OP01-001".to_string()]).is_empty());
    }
}
