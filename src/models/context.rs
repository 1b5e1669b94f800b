use crate::image::Normalization;
use crate::models::{InferenceEngine, LabelList, OnnxEngine, Resources};
use crate::{Config, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// 每次分类共享的推理参数
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub input_name: String,
    pub output_name: String,
    pub target_width: u32,
    pub target_height: u32,
    pub normalization: Normalization,
    pub timeout: Option<Duration>,
    pub top_k: usize,
}

impl InferenceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            input_name: config.inference_config.input_name.clone(),
            output_name: config.inference_config.output_name.clone(),
            target_width: config.preprocess_config.target_width,
            target_height: config.preprocess_config.target_height,
            normalization: Normalization::imagenet(),
            timeout: config.inference_timeout(),
            top_k: config.inference_config.top_k,
        }
    }
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            input_name: "images".to_string(),
            output_name: "output0".to_string(),
            target_width: 224,
            target_height: 224,
            normalization: Normalization::imagenet(),
            timeout: Some(Duration::from_secs(30)),
            top_k: 1,
        }
    }
}

/// 分类上下文：引擎、标签和参数，构建一次后只读共享
#[derive(Clone)]
pub struct ClassifierContext {
    engine: Arc<dyn InferenceEngine>,
    labels: Arc<LabelList>,
    settings: InferenceSettings,
}

impl ClassifierContext {
    pub fn new(engine: Arc<dyn InferenceEngine>, labels: LabelList, settings: InferenceSettings) -> Self {
        Self {
            engine,
            labels: Arc::new(labels),
            settings,
        }
    }

    /// 加载模型和标签，创建 ONNX 会话
    pub fn load(config: &Config) -> Result<Self> {
        tracing::info!("Initializing classifier context...");

        let Resources { model, labels } = Resources::load(config)?;
        let engine = OnnxEngine::from_memory(&model, &config.onnx_config)?;

        let context = Self::new(Arc::new(engine), labels, InferenceSettings::from_config(config));
        tracing::info!(
            "Classifier context ready: {} labels, input {}x{}",
            context.labels.len(),
            context.settings.target_width,
            context.settings.target_height
        );

        Ok(context)
    }

    pub fn engine(&self) -> Arc<dyn InferenceEngine> {
        Arc::clone(&self.engine)
    }

    pub fn labels(&self) -> &LabelList {
        &self.labels
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            num_labels: self.labels.len(),
            input_name: self.settings.input_name.clone(),
            output_name: self.settings.output_name.clone(),
            model_outputs: self.engine.output_names(),
            target_width: self.settings.target_width,
            target_height: self.settings.target_height,
            timeout_ms: self.settings.timeout.map(|d| d.as_millis() as u64),
        }
    }
}

/// 上下文统计信息
#[derive(Debug, Clone, Serialize)]
pub struct ContextStats {
    pub num_labels: usize,
    pub input_name: String,
    pub output_name: String,
    pub model_outputs: Vec<String>,
    pub target_width: u32,
    pub target_height: u32,
    pub timeout_ms: Option<u64>,
}
