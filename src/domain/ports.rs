use crate::utils::error::Result;
use std::path::Path;

/// 圖片轉檔能力，由外部注入 Replacer
pub trait ImageCodec {
    /// 解碼來源圖，處理透明與縮放後回傳 PNG 位元組；不寫入任何檔案
    fn transcode(&self, source: &Path) -> Result<Vec<u8>>;
}

impl<T: ImageCodec + ?Sized> ImageCodec for &T {
    fn transcode(&self, source: &Path) -> Result<Vec<u8>> {
        (**self).transcode(source)
    }
}

pub trait ConfigProvider {
    fn cards_dir(&self) -> &Path;
    fn alt_dir(&self) -> &Path;
    /// None 表示不縮圖
    fn max_dimension(&self) -> Option<u32>;
    fn dry_run(&self) -> bool;
    fn monitor(&self) -> bool;
}
