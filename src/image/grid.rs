use crate::classify::ClassifyStage;
use crate::utils::error::ClassifyError;
use crate::Result;
use image::DynamicImage;

/// 行优先、通道交错的像素缓冲区
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize, data: Vec<u8>) -> Result<Self> {
        if bytes_per_pixel == 0 {
            return Err(ClassifyError::dimensions(
                ClassifyStage::Decoding,
                "bytes per pixel must be non-zero",
            ));
        }

        let expected = width as usize * height as usize * bytes_per_pixel;
        if data.len() != expected {
            return Err(ClassifyError::dimensions(ClassifyStage::Decoding, format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                bytes_per_pixel,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            data,
        })
    }

    /// 纯色图像，测试和占位用
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self> {
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, pixel.len(), data)
    }

    /// 从解码结果构建：始终输出 RGB8，带 alpha 的格式输出 RGBA8。
    /// 灰度图在这里展开为三通道。
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let (bytes_per_pixel, data) = match image {
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
            other => (3, other.to_rgb8().into_raw()),
        };

        Self::new(width, height, bytes_per_pixel, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// 行字节跨度，始终由自身宽度推导
    pub fn stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// (x, y) 处像素的所有通道字节
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let offset = y as usize * self.stride() + x as usize * self.bytes_per_pixel;
        &self.data[offset..offset + self.bytes_per_pixel]
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }
}
