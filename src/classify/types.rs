use crate::models::Prediction;
use serde::Serialize;
use std::fmt;

/// 分类流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyStage {
    Loading,
    Decoding,
    Resizing,
    Normalizing,
    Inference,
    Classification,
}

impl fmt::Display for ClassifyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassifyStage::Loading => "loading",
            ClassifyStage::Decoding => "decoding",
            ClassifyStage::Resizing => "resizing",
            ClassifyStage::Normalizing => "normalizing",
            ClassifyStage::Inference => "inference",
            ClassifyStage::Classification => "classification",
        };
        f.write_str(name)
    }
}

/// 各阶段耗时（毫秒）
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineTimings {
    pub decode_ms: f64,
    pub resize_ms: f64,
    pub normalize_ms: f64,
    pub inference_ms: f64,
    pub total_ms: f64,
}

/// 单张图像的分类结果
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub label: String,
    pub index: usize,
    pub score: f32,
    /// 按分数排列的前 k 个候选，首项与 label 一致
    pub top: Vec<Prediction>,
    pub timings: PipelineTimings,
}
