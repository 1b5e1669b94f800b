use crate::image::PixelGrid;
use crate::utils::error::ClassifyError;
use crate::Result;
use ndarray::Array4;

/// 每通道归一化常数 (R, G, B)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalization {
    /// ImageNet 标准均值/方差
    pub const fn imagenet() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }

    #[inline]
    pub fn apply(&self, channel: usize, value: u8) -> f32 {
        (value as f32 / 255.0 - self.mean[channel]) / self.std[channel]
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// 平面布局 (CHW) 的归一化张量，batch 固定为 1
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
    height: usize,
    width: usize,
}

impl NormalizedTensor {
    pub const CHANNELS: usize = 3;

    pub fn shape(&self) -> [usize; 4] {
        [1, Self::CHANNELS, self.height, self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// 第 c 个通道平面
    pub fn channel(&self, c: usize) -> &[f32] {
        let plane = self.height * self.width;
        &self.data[c * plane..(c + 1) * plane]
    }

    pub fn into_array(self) -> Result<Array4<f32>> {
        Array4::from_shape_vec((1, Self::CHANNELS, self.height, self.width), self.data)
            .map_err(|e| ClassifyError::Inference(format!("Invalid tensor shape: {}", e)))
    }
}

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// 使用 ImageNet 常数构建输入张量
    pub fn build_tensor(image: &PixelGrid) -> Result<NormalizedTensor> {
        Self::build_tensor_with(image, &Normalization::imagenet())
    }

    /// HWC 交错字节 -> CHW 平面浮点。多余通道（alpha）忽略。
    pub fn build_tensor_with(image: &PixelGrid, norm: &Normalization) -> Result<NormalizedTensor> {
        let bpp = image.bytes_per_pixel();
        if bpp < NormalizedTensor::CHANNELS {
            return Err(ClassifyError::UnsupportedPixelFormat(bpp));
        }
        if bpp > NormalizedTensor::CHANNELS {
            tracing::debug!("Ignoring {} extra channel(s) per pixel", bpp - NormalizedTensor::CHANNELS);
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        let plane = width * height;
        let stride = image.stride();
        let bytes = image.as_bytes();

        let mut data = vec![0.0f32; plane * NormalizedTensor::CHANNELS];
        for y in 0..height {
            let row_offset = y * stride;
            for x in 0..width {
                let px = row_offset + x * bpp;
                let idx = y * width + x;
                for c in 0..NormalizedTensor::CHANNELS {
                    data[c * plane + idx] = norm.apply(c, bytes[px + c]);
                }
            }
        }

        Ok(NormalizedTensor { data, height, width })
    }
}
