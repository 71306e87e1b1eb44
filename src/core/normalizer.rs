use crate::domain::model::{NormalizedTarget, TargetMatch, CANONICAL_EXTENSION};
use crate::utils::error::{Result, SwapError};
use std::path::{Path, PathBuf};

pub fn normalized_path(path: &Path) -> PathBuf {
    if TargetMatch::new(path).has_canonical_extension() {
        path.to_path_buf()
    } else {
        path.with_extension(CANONICAL_EXTENSION)
    }
}

/// 只計算新路徑，不碰檔案系統
pub fn normalize_paths(targets: &[TargetMatch]) -> Vec<NormalizedTarget> {
    targets
        .iter()
        .map(|target| NormalizedTarget {
            original: target.path.clone(),
            path: normalized_path(&target.path),
        })
        .collect()
}

/// 舊格式檔案存在且路徑不同時刪除；重複呼叫是安全的。
/// 回傳是否真的刪了檔案。
pub fn remove_stale(target: &NormalizedTarget) -> Result<bool> {
    if !target.is_stale() || !target.original.exists() {
        return Ok(false);
    }

    std::fs::remove_file(&target.original).map_err(|source| SwapError::StaleFileRemovalError {
        path: target.original.clone(),
        source,
    })?;

    tracing::info!("Removed old non-PNG file: {}", target.original.display());
    Ok(true)
}
