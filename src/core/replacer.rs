use crate::core::identifier::candidate_base_names;
use crate::core::locator::TargetLocator;
use crate::core::normalizer::{normalize_paths, remove_stale};
use crate::core::prioritizer::sort_by_priority;
use crate::domain::model::{
    AlternateImage, ImageReport, ImageStatus, Issue, IssueKind, NormalizedTarget, ReplacementPlan,
    Stage,
};
use crate::domain::ports::ImageCodec;
use crate::utils::error::{Result, SwapError};
use std::path::{Path, PathBuf};

/// 處理單張異畫圖：找目標、轉 PNG、寫入主要目標、複製到其他目標、刪除來源。
/// 任何失敗都只影響這一張圖，結果寫在回傳的 `ImageReport` 裡。
pub struct Replacer<C: ImageCodec> {
    locator: TargetLocator,
    codec: C,
}

impl<C: ImageCodec> Replacer<C> {
    pub fn new(cards_dir: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            locator: TargetLocator::new(cards_dir),
            codec,
        }
    }

    /// 不修改任何檔案的部分：候選名稱、目標、優先序與 PNG 路徑
    pub fn plan(&self, alt_image: &AlternateImage) -> ReplacementPlan {
        enter(Stage::Extracting, &alt_image.path);
        let candidates = candidate_base_names(&alt_image.stem);
        tracing::debug!("Candidate names for {}: {:?}", alt_image.path.display(), candidates);

        enter(Stage::Locating, &alt_image.path);
        let found = self.locator.find_targets(&candidates);

        enter(Stage::Prioritizing, &alt_image.path);
        let targets = sort_by_priority(found);

        enter(Stage::Normalizing, &alt_image.path);
        let normalized = normalize_paths(&targets);

        ReplacementPlan {
            alt_image: alt_image.clone(),
            candidates,
            targets,
            normalized,
        }
    }

    /// Dry run 用：只回報計畫
    pub fn preview(&self, alt_image: &AlternateImage) -> ImageReport {
        let plan = self.plan(alt_image);
        let mut report = report_from_plan(&plan);
        report.status = if plan.targets.is_empty() {
            ImageStatus::NoTargets
        } else {
            ImageStatus::Planned
        };
        tracing::info!(
            "[dry run] {} -> {} target(s)",
            alt_image.path.display(),
            plan.targets.len()
        );
        report
    }

    pub fn replace(&self, alt_image: &AlternateImage) -> ImageReport {
        tracing::info!("Processing alt image: {}", alt_image.path.display());

        let plan = self.plan(alt_image);
        let mut report = report_from_plan(&plan);

        let Some(primary) = plan.primary() else {
            let skipped = SwapError::NoTargetsFound {
                alt_image: alt_image.path.clone(),
            };
            tracing::info!("{}", skipped);
            report.status = ImageStatus::NoTargets;
            report.error = Some(skipped.to_string());
            return report;
        };

        tracing::info!(
            "Matched targets for {}: {:?}",
            alt_image.path.display(),
            report.targets
        );

        enter(Stage::Transcoding, &alt_image.path);
        if let Err(e) = self.write_primary(&alt_image.path, primary) {
            tracing::error!(
                "Failed to convert {} to PNG at {}: {}",
                alt_image.path.display(),
                primary.path.display(),
                e
            );
            report.status = ImageStatus::Failed;
            report.failed_stage = Some(Stage::Transcoding);
            report.error = Some(e.to_string());
            return report;
        }
        tracing::info!(
            "Converted and saved {} -> {} as PNG",
            alt_image.path.display(),
            primary.path.display()
        );

        // 主要目標已寫好，才刪除舊的 JPG
        for target in &plan.normalized {
            if let Err(e) = remove_stale(target) {
                record_issue(&mut report, IssueKind::StaleFileRemoval, &target.original, &e);
            }
        }

        enter(Stage::Duplicating, &alt_image.path);
        for secondary in plan.secondaries() {
            if let Err(e) = copy_primary(primary, secondary) {
                record_issue(&mut report, IssueKind::SecondaryCopy, &secondary.path, &e);
            }
        }

        enter(Stage::Cleanup, &alt_image.path);
        match std::fs::remove_file(&alt_image.path) {
            Ok(()) => tracing::info!("Removed original alt image: {}", alt_image.path.display()),
            Err(source) => {
                let e = SwapError::CleanupError {
                    path: alt_image.path.clone(),
                    source,
                };
                record_issue(&mut report, IssueKind::Cleanup, &alt_image.path, &e);
            }
        }

        enter(Stage::Done, &alt_image.path);
        report.status = ImageStatus::Replaced;
        report
    }

    fn write_primary(&self, source: &Path, primary: &NormalizedTarget) -> Result<()> {
        crate::core::transcoder::transcode_file(&self.codec, source, &primary.path)
    }
}

fn copy_primary(
    primary: &NormalizedTarget,
    secondary: &NormalizedTarget,
) -> Result<()> {
    // 同一檔案被多個候選名稱命中時會出現自己複製到自己
    if secondary.path == primary.path {
        tracing::debug!("Skipping self-copy for {}", primary.path.display());
        return Ok(());
    }

    std::fs::copy(&primary.path, &secondary.path).map_err(|source| {
        SwapError::SecondaryCopyError {
            from: primary.path.clone(),
            to: secondary.path.clone(),
            source,
        }
    })?;

    tracing::info!(
        "Copied PNG {} -> {}",
        primary.path.display(),
        secondary.path.display()
    );
    Ok(())
}

fn report_from_plan(plan: &ReplacementPlan) -> ImageReport {
    let mut report = ImageReport::new(&plan.alt_image.path);
    report.candidates = plan.candidates.clone();
    report.targets = plan.targets.iter().map(|t| t.path.clone()).collect();
    report.primary = plan.primary().map(|t| t.path.clone());
    report.secondaries = plan.secondaries().iter().map(|t| t.path.clone()).collect();
    report
}

fn record_issue(report: &mut ImageReport, kind: IssueKind, path: &Path, error: &SwapError) {
    tracing::warn!("{}", error);
    report.issues.push(Issue {
        kind,
        path: path.to_path_buf(),
        message: error.to_string(),
    });
}

fn enter(stage: Stage, alt_image: &Path) {
    tracing::trace!("{:?}: {}", stage, alt_image.display());
}
