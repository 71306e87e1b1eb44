use crate::core::replacer::Replacer;
use crate::core::transcoder::PngTranscoder;
use crate::domain::model::{has_allowed_extension, AlternateImage, BatchReport};
use crate::domain::ports::{ConfigProvider, ImageCodec};
use crate::utils::error::{Result, SwapError};
use crate::utils::monitor::RunMonitor;
use std::path::{Path, PathBuf};

/// 逐張處理 staging 目錄中的異畫圖；單張失敗不會中斷整批
pub struct ReplaceEngine<C: ImageCodec, P: ConfigProvider> {
    replacer: Replacer<C>,
    config: P,
    monitor: RunMonitor,
}

impl<C: ImageCodec, P: ConfigProvider> ReplaceEngine<C, P> {
    pub fn new(codec: C, config: P) -> Self {
        Self {
            replacer: Replacer::new(config.cards_dir(), codec),
            monitor: RunMonitor::new(config.monitor()),
            config,
        }
    }

    /// 只有 staging 目錄無法讀取時才回傳錯誤
    pub fn run(&self) -> Result<BatchReport> {
        let cards_dir = self.config.cards_dir();
        let alt_dir = self.config.alt_dir();
        let dry_run = self.config.dry_run();

        tracing::info!(
            "Starting replacement of alt card images in {}...",
            cards_dir.display()
        );
        self.monitor.log_stats("Start");

        let alt_images = list_alt_images(alt_dir)?;
        let total = alt_images.len();
        tracing::info!("Found {} alt image(s) in {}", total, alt_dir.display());

        let mut batch = BatchReport::new(cards_dir, alt_dir, dry_run);

        for (index, alt_image) in alt_images.iter().enumerate() {
            tracing::info!("[{}/{}] {}", index + 1, total, alt_image.stem);

            let report = if dry_run {
                self.replacer.preview(alt_image)
            } else {
                self.replacer.replace(alt_image)
            };
            batch.push(report);

            if self.monitor.is_enabled() {
                self.monitor.log_stats(&format!("Image {}/{}", index + 1, total));
            }
        }

        self.monitor.log_final_stats(total);
        tracing::info!(
            "Finished: {} replaced, {} without targets, {} failed, {} issue(s)",
            batch.totals.replaced,
            batch.totals.no_targets,
            batch.totals.failed,
            batch.totals.issues
        );

        Ok(batch)
    }
}

impl<P: ConfigProvider> ReplaceEngine<PngTranscoder, P> {
    /// 依設定的縮圖上限建立 PNG 轉檔器
    pub fn with_png_codec(config: P) -> Self {
        let codec = PngTranscoder::new(config.max_dimension());
        Self::new(codec, config)
    }
}

/// Staging 目錄中副檔名為 png/jpg/jpeg 的一般檔案，依檔名排序
pub fn list_alt_images(alt_dir: &Path) -> Result<Vec<AlternateImage>> {
    let staging_error = |source| SwapError::StagingDirError {
        path: alt_dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(alt_dir).map_err(staging_error)? {
        let entry = entry.map_err(staging_error)?;
        let path = entry.path();
        if path.is_file() && has_allowed_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let alt = AlternateImage::from_path(&path);
            if alt.is_none() {
                tracing::warn!("Skipping alt image with unusable name: {}", path.display());
            }
            alt
        })
        .collect())
}
