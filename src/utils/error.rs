use crate::classify::ClassifyStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid image dimensions: {message}")]
    InvalidImageDimensions { stage: ClassifyStage, message: String },

    #[error("Unsupported pixel format: {0} bytes per pixel, at least 3 required")]
    UnsupportedPixelFormat(usize),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Output tensor '{name}' not found. Available outputs: {available:?}")]
    MissingOutputTensor { name: String, available: Vec<String> },

    #[error("Label index {index} out of range for {len} labels")]
    LabelIndexOutOfRange { index: usize, len: usize },

    #[error("Model produced {scores} scores but {labels} labels are loaded")]
    ScoreCountMismatch { scores: usize, labels: usize },

    #[error("Inference timed out after {0} ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassifyError {
    /// 几何错误，附带出错阶段（解码或缩放裁剪）
    pub fn dimensions(stage: ClassifyStage, message: impl Into<String>) -> Self {
        ClassifyError::InvalidImageDimensions {
            stage,
            message: message.into(),
        }
    }

    /// 改写几何错误的阶段，其他错误原样返回
    pub fn at_stage(self, stage: ClassifyStage) -> Self {
        match self {
            ClassifyError::InvalidImageDimensions { message, .. } => {
                ClassifyError::InvalidImageDimensions { stage, message }
            }
            other => other,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClassifyError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            ClassifyError::InvalidImageDimensions { .. } => "INVALID_IMAGE_DIMENSIONS",
            ClassifyError::UnsupportedPixelFormat(_) => "UNSUPPORTED_PIXEL_FORMAT",
            ClassifyError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            ClassifyError::Inference(_) => "INFERENCE_ERROR",
            ClassifyError::MissingOutputTensor { .. } => "MISSING_OUTPUT_TENSOR",
            ClassifyError::LabelIndexOutOfRange { .. } => "LABEL_INDEX_OUT_OF_RANGE",
            ClassifyError::ScoreCountMismatch { .. } => "SCORE_COUNT_MISMATCH",
            ClassifyError::Timeout(_) => "INFERENCE_TIMEOUT",
            ClassifyError::Config(_) => "CONFIG_ERROR",
            ClassifyError::Io(_) => "IO_ERROR",
            ClassifyError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            ClassifyError::Ort(_) => "ORT_ERROR",
            ClassifyError::Json(_) => "JSON_ERROR",
        }
    }

    /// 出错所在的流水线阶段
    pub fn stage(&self) -> ClassifyStage {
        match self {
            ClassifyError::ResourceNotFound(_)
            | ClassifyError::Config(_)
            | ClassifyError::Io(_) => ClassifyStage::Loading,
            ClassifyError::ImageDecode(_) => ClassifyStage::Decoding,
            ClassifyError::InvalidImageDimensions { stage, .. } => *stage,
            ClassifyError::UnsupportedPixelFormat(_) => ClassifyStage::Normalizing,
            ClassifyError::ModelLoad(_) => ClassifyStage::Loading,
            ClassifyError::Inference(_)
            | ClassifyError::MissingOutputTensor { .. }
            | ClassifyError::ScoreCountMismatch { .. }
            | ClassifyError::Timeout(_)
            | ClassifyError::Ort(_) => ClassifyStage::Inference,
            ClassifyError::LabelIndexOutOfRange { .. } | ClassifyError::Json(_) => {
                ClassifyStage::Classification
            }
        }
    }

    /// 进程退出码，每类错误固定
    pub fn exit_code(&self) -> i32 {
        match self {
            ClassifyError::ResourceNotFound(_) => 2,
            ClassifyError::InvalidImageDimensions { .. } | ClassifyError::ImageDecode(_) => 3,
            ClassifyError::UnsupportedPixelFormat(_) => 4,
            ClassifyError::ModelLoad(_) | ClassifyError::Ort(_) => 5,
            ClassifyError::Inference(_)
            | ClassifyError::Timeout(_)
            | ClassifyError::ScoreCountMismatch { .. } => 6,
            ClassifyError::MissingOutputTensor { .. } => 7,
            ClassifyError::LabelIndexOutOfRange { .. } => 8,
            ClassifyError::Io(_) | ClassifyError::Config(_) | ClassifyError::Json(_) => 1,
        }
    }
}
