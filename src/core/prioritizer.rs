use crate::domain::model::TargetMatch;

/// 穩定排序：非 `_small` 優先、路徑層數淺者優先、最後依檔名。
/// 排序後第一個就是主要目標。
pub fn sort_by_priority(mut targets: Vec<TargetMatch>) -> Vec<TargetMatch> {
    targets.sort_by(|a, b| {
        (a.is_small(), a.depth(), a.file_name()).cmp(&(b.is_small(), b.depth(), b.file_name()))
    });
    targets
}
