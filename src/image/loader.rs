use crate::classify::ClassifyStage;
use crate::image::PixelGrid;
use crate::utils::error::ClassifyError;
use crate::Result;
use image::{DynamicImage, GenericImageView, ImageFormat};

pub struct ImageLoader;

impl ImageLoader {
    /// 从内存字节解码图像
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if let Some(format) = Self::detect_format(bytes) {
            tracing::debug!("Detected image format: {:?}", format);
            if !Self::is_supported_format(format) {
                tracing::warn!("Image format {:?} is not in the tested set, decoding anyway", format);
            }
        }

        let image = image::load_from_memory(bytes)?;
        Ok(image)
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    pub fn is_supported_format(format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::WebP
        )
    }

    /// 验证图像尺寸
    pub fn validate_dimensions(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ClassifyError::dimensions(ClassifyStage::Decoding, format!(
                "decoded image is {}x{}, need at least 1x1",
                width, height
            )));
        }

        Ok(())
    }

    /// 解码并转换为像素网格
    pub fn decode(bytes: &[u8]) -> Result<PixelGrid> {
        let image = Self::from_bytes(bytes)?;
        Self::to_pixel_grid(image)
    }

    pub fn to_pixel_grid(image: DynamicImage) -> Result<PixelGrid> {
        Self::validate_dimensions(&image)?;
        PixelGrid::from_dynamic(image)
    }
}
