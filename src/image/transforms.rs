use crate::classify::ClassifyStage;
use crate::image::PixelGrid;
use crate::utils::error::ClassifyError;
use crate::Result;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

/// 图像变换工具集
pub struct ImageTransforms;

impl ImageTransforms {
    /// 短边缩放到目标尺寸后居中裁剪
    pub fn resize_and_crop(image: PixelGrid, target_width: u32, target_height: u32) -> Result<PixelGrid> {
        if target_width == 0 || target_height == 0 {
            return Err(ClassifyError::dimensions(ClassifyStage::Resizing, format!(
                "target size {}x{} must be positive",
                target_width, target_height
            )));
        }

        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(ClassifyError::dimensions(ClassifyStage::Resizing, format!(
                "source image is {}x{}",
                src_w, src_h
            )));
        }

        // 尺寸已匹配，直接返回
        if (src_w, src_h) == (target_width, target_height) {
            return Ok(image);
        }

        let (new_w, new_h) = Self::scaled_dimensions(src_w, src_h, target_width, target_height);
        let (left, top) = Self::crop_offsets(new_w, new_h, target_width, target_height)?;

        tracing::debug!(
            "Resize {}x{} -> {}x{}, crop {}x{} at ({}, {})",
            src_w, src_h, new_w, new_h, target_width, target_height, left, top
        );

        let resized = Self::resize(&image, new_w, new_h)?;
        Self::crop(&resized, left, top, target_width, target_height)
    }

    /// 缩放后尺寸：比例 min(target) / min(source)，结果向零截断。
    /// 用整数运算，避免浮点误差把 224 截成 223。
    pub fn scaled_dimensions(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
        let min_target = target_w.min(target_h) as u64;
        let min_source = src_w.min(src_h) as u64;

        let new_w = min_target * src_w as u64 / min_source;
        let new_h = min_target * src_h as u64 / min_source;

        (new_w as u32, new_h as u32)
    }

    /// 居中裁剪偏移；恰好匹配的轴偏移为0
    pub fn crop_offsets(new_w: u32, new_h: u32, target_w: u32, target_h: u32) -> Result<(u32, u32)> {
        if new_w < target_w || new_h < target_h {
            return Err(ClassifyError::dimensions(ClassifyStage::Resizing, format!(
                "scaled image {}x{} is smaller than crop window {}x{}",
                new_w, new_h, target_w, target_h
            )));
        }

        Ok(((new_w - target_w) / 2, (new_h - target_h) / 2))
    }

    /// 双线性插值缩放，保持通道布局
    pub fn resize(image: &PixelGrid, new_w: u32, new_h: u32) -> Result<PixelGrid> {
        if image.dimensions() == (new_w, new_h) {
            return Ok(image.clone());
        }

        let bpp = image.bytes_per_pixel();
        let data = match bpp {
            1 => resize_buffer::<Luma<u8>>(image, new_w, new_h)?,
            2 => resize_buffer::<LumaA<u8>>(image, new_w, new_h)?,
            3 => resize_buffer::<Rgb<u8>>(image, new_w, new_h)?,
            4 => resize_buffer::<Rgba<u8>>(image, new_w, new_h)?,
            _ => return Err(ClassifyError::UnsupportedPixelFormat(bpp)),
        };

        PixelGrid::new(new_w, new_h, bpp, data).map_err(|e| e.at_stage(ClassifyStage::Resizing))
    }

    /// 矩形裁剪，逐行按源图自身跨度复制
    pub fn crop(image: &PixelGrid, left: u32, top: u32, width: u32, height: u32) -> Result<PixelGrid> {
        let (src_w, src_h) = image.dimensions();
        if left as u64 + width as u64 > src_w as u64 || top as u64 + height as u64 > src_h as u64 {
            return Err(ClassifyError::dimensions(ClassifyStage::Resizing, format!(
                "crop {}x{} at ({}, {}) exceeds {}x{}",
                width, height, left, top, src_w, src_h
            )));
        }

        let bpp = image.bytes_per_pixel();
        let row_start = left as usize * bpp;
        let row_len = width as usize * bpp;

        let mut cropped = Vec::with_capacity(row_len * height as usize);
        for y in top..top + height {
            let row = image.row(y);
            cropped.extend_from_slice(&row[row_start..row_start + row_len]);
        }

        PixelGrid::new(width, height, bpp, cropped).map_err(|e| e.at_stage(ClassifyStage::Resizing))
    }
}

fn resize_buffer<P>(image: &PixelGrid, new_w: u32, new_h: u32) -> Result<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    let buffer: ImageBuffer<P, &[u8]> = ImageBuffer::from_raw(width, height, image.as_bytes())
        .ok_or_else(|| {
            ClassifyError::dimensions(ClassifyStage::Resizing, format!(
                "pixel buffer does not match {}x{}",
                width, height
            ))
        })?;

    Ok(imageops::resize(&buffer, new_w, new_h, FilterType::Triangle).into_raw())
}
