use crate::domain::ports::ImageCodec;
use crate::utils::error::{Result, SwapError};
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageReader, Rgb, RgbImage};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 超過此尺寸（最長邊，像素）的圖會等比例縮小
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
pub const MIN_MAX_DIMENSION: u32 = 16;
pub const MAX_MAX_DIMENSION: u32 = 16384;

/// 解碼 PNG/JPEG，透明處鋪白底，必要時縮圖，輸出最高壓縮的 PNG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngTranscoder {
    max_dimension: Option<u32>,
}

impl Default for PngTranscoder {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_DIMENSION))
    }
}

impl PngTranscoder {
    /// 上限會被夾在 MIN_MAX_DIMENSION..=MAX_MAX_DIMENSION 之間
    pub fn new(max_dimension: Option<u32>) -> Self {
        let max_dimension = max_dimension.map(|max| {
            let clamped = max.clamp(MIN_MAX_DIMENSION, MAX_MAX_DIMENSION);
            if clamped != max {
                tracing::warn!("max_dimension {} out of range, using {}", max, clamped);
            }
            clamped
        });
        Self { max_dimension }
    }

    pub fn max_dimension(&self) -> Option<u32> {
        self.max_dimension
    }

    pub fn decode(&self, source: &Path) -> Result<DynamicImage> {
        let decode_error = |source_err: ImageError| SwapError::DecodeError {
            path: source.to_path_buf(),
            source: source_err,
        };

        ImageReader::open(source)
            .map_err(|e| decode_error(ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_error(ImageError::IoError(e)))?
            .decode()
            .map_err(decode_error)
    }

    pub fn encode(&self, image: &RgbImage, source: &Path) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilterType::Adaptive);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| SwapError::EncodeError {
                path: source.to_path_buf(),
                source: e,
            })?;
        Ok(bytes)
    }
}

impl ImageCodec for PngTranscoder {
    fn transcode(&self, source: &Path) -> Result<Vec<u8>> {
        let decoded = self.decode(source)?;
        tracing::debug!(
            "Decoded {} ({}x{}, {:?})",
            source.display(),
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        let mut rgb = flatten_to_rgb(decoded);

        if let Some(max) = self.max_dimension {
            if let Some((width, height)) = scaled_dimensions(rgb.width(), rgb.height(), max) {
                tracing::debug!(
                    "Downscaling {} from {}x{} to {}x{}",
                    source.display(),
                    rgb.width(),
                    rgb.height(),
                    width,
                    height
                );
                rgb = image::imageops::resize(&rgb, width, height, FilterType::Lanczos3);
            }
        }

        self.encode(&rgb, source)
    }
}

/// 有 alpha（含調色盤透明）時疊在白底上，其餘直接轉 RGB
pub fn flatten_to_rgb(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let channel = u16::from(channel);
    let alpha = u16::from(alpha);
    ((channel * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// 最長邊超過 `max` 時回傳縮放後尺寸，另一邊四捨五入
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    let largest = width.max(height);
    if largest <= max {
        return None;
    }

    let scale = f64::from(max) / f64::from(largest);
    let shrink = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);

    if width >= height {
        Some((max, shrink(height)))
    } else {
        Some((shrink(width), max))
    }
}

/// 轉檔並把結果寫到目的地。先寫同目錄的暫存檔再改名，
/// 轉檔或寫入失敗時目的地維持原樣。
pub fn transcode_file<C: ImageCodec>(codec: &C, source: &Path, destination: &Path) -> Result<()> {
    let bytes = codec.transcode(source)?;

    let write_error = |source_err: std::io::Error| SwapError::WriteError {
        path: destination.to_path_buf(),
        source: source_err,
    };
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(write_error)?;
    staged.write_all(&bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged
        .persist(destination)
        .map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn decode_png(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_opaque_rgb_round_trip_keeps_pixels() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("OP01-001.png");
        let original = RgbImage::from_fn(40, 30, |x, y| Rgb([x as u8 * 6, y as u8 * 8, 200]));
        original.save(&source).unwrap();

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.to_rgb8().as_raw(), original.as_raw());
    }

    #[test]
    fn test_alpha_is_flattened_onto_white() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("alpha.png");
        let mut original = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        original.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        original.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        original.save(&source).unwrap();

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert!(!decoded.color().has_alpha());
        let rgb = decoded.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([127, 127, 127]));
        assert_eq!(rgb.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_grayscale_is_coerced_to_rgb() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("gray.png");
        GrayImage::from_pixel(3, 3, Luma([90])).save(&source).unwrap();

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let rgb = decode_png(&bytes).to_rgb8();

        assert_eq!(rgb.get_pixel(2, 2), &Rgb([90, 90, 90]));
    }

    #[test]
    fn test_jpeg_source_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("OP09-051Manga alt.jpg");
        RgbImage::from_pixel(16, 8, Rgb([200, 10, 10])).save(&source).unwrap();

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_oversized_image_is_downscaled() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("large.png");
        RgbImage::from_pixel(2000, 1500, Rgb([255, 0, 0])).save(&source).unwrap();

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!((decoded.width(), decoded.height()), (1024, 768));
    }

    #[test]
    fn test_downscale_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("wide.png");
        RgbImage::from_pixel(1100, 10, Rgb([0, 0, 255])).save(&source).unwrap();

        let bytes = PngTranscoder::new(None).transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!((decoded.width(), decoded.height()), (1100, 10));
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(2000, 1500, 1024), Some((1024, 768)));
        assert_eq!(scaled_dimensions(1500, 2000, 1024), Some((768, 1024)));
        assert_eq!(scaled_dimensions(3000, 1000, 1024), Some((1024, 341)));
        assert_eq!(scaled_dimensions(5000, 2, 1024), Some((1024, 1)));
        assert_eq!(scaled_dimensions(1024, 1024, 1024), None);
        assert_eq!(scaled_dimensions(600, 800, 1024), None);
    }

    #[test]
    fn test_corrupt_source_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();

        let err = PngTranscoder::default().transcode(&source).unwrap_err();
        assert!(matches!(err, SwapError::DecodeError { .. }));
    }

    #[test]
    fn test_transcode_file_leaves_destination_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.jpg");
        let destination = temp_dir.path().join("OP01-001.png");
        std::fs::write(&source, b"garbage").unwrap();
        std::fs::write(&destination, b"original").unwrap();

        assert!(transcode_file(&PngTranscoder::default(), &source, &destination).is_err());
        assert_eq!(std::fs::read(&destination).unwrap(), b"original");
    }

    #[test]
    fn test_transcode_file_replaces_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("alt.png");
        let cards = temp_dir.path().join("cards");
        std::fs::create_dir_all(&cards).unwrap();
        let destination = cards.join("OP01-001.png");
        RgbImage::from_pixel(8, 8, Rgb([1, 2, 3])).save(&source).unwrap();
        std::fs::write(&destination, b"original").unwrap();

        transcode_file(&PngTranscoder::default(), &source, &destination).unwrap();

        let rgb = decode_png(&std::fs::read(&destination).unwrap()).to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([1, 2, 3]));
        let names: Vec<_> = std::fs::read_dir(&cards)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("OP01-001.png")]);
    }

    #[test]
    fn test_transcode_file_unwritable_destination_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("alt.png");
        RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])).save(&source).unwrap();
        let destination = temp_dir.path().join("missing/OP01-001.png");

        let err = transcode_file(&PngTranscoder::default(), &source, &destination).unwrap_err();
        assert!(matches!(err, SwapError::WriteError { ref path, .. } if path == &destination));
        assert!(!destination.exists());
    }

    #[test]
    fn test_max_dimension_is_clamped() {
        assert_eq!(PngTranscoder::new(Some(0)).max_dimension(), Some(MIN_MAX_DIMENSION));
        assert_eq!(PngTranscoder::new(Some(1)).max_dimension(), Some(MIN_MAX_DIMENSION));
        assert_eq!(PngTranscoder::new(Some(u32::MAX)).max_dimension(), Some(MAX_MAX_DIMENSION));
        assert_eq!(PngTranscoder::new(Some(512)).max_dimension(), Some(512));
        assert_eq!(PngTranscoder::new(None).max_dimension(), None);
    }

    #[test]
    fn test_zero_max_dimension_still_produces_an_image() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tall.png");
        RgbImage::from_pixel(20, 40, Rgb([0, 128, 0])).save(&source).unwrap();

        let bytes = PngTranscoder::new(Some(0)).transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!((decoded.width(), decoded.height()), (8, 16));
    }

    #[test]
    fn test_palette_transparency_is_flattened_onto_white() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("indexed.png");
        {
            let file = std::fs::File::create(&source).unwrap();
            let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![0, 0, 0, 200, 100, 50]);
            encoder.set_trns(vec![0, 255]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 1]).unwrap();
        }

        let bytes = PngTranscoder::default().transcode(&source).unwrap();
        let decoded = decode_png(&bytes);

        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.to_rgb8().as_raw(), &vec![255, 255, 255, 200, 100, 50]);
    }
}
