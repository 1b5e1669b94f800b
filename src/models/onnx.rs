use crate::config::OnnxConfig;
use crate::image::NormalizedTensor;
use crate::models::engine::{EngineOutputs, InferenceEngine};
use crate::utils::error::ClassifyError;
use crate::Result;
use ort::{
    inputs,
    session::{
        builder::{GraphOptimizationLevel, SessionBuilder},
        Session,
    },
    value::Tensor,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// 基于 ONNX Runtime 的推理引擎
pub struct OnnxEngine {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OnnxEngine {
    pub fn from_memory(model_bytes: &[u8], onnx_config: &OnnxConfig) -> Result<Self> {
        tracing::info!("Loading model from memory ({} bytes)", model_bytes.len());

        let session = Self::builder(onnx_config)?
            .commit_from_memory(model_bytes)
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?;

        Self::from_session(session)
    }

    fn builder(onnx_config: &OnnxConfig) -> Result<SessionBuilder> {
        let level = match onnx_config.optimization_level {
            i32::MIN..=0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        };

        // 会话构建失败同样属于模型加载阶段
        Session::builder()
            .and_then(|b| b.with_optimization_level(level))
            .and_then(|b| b.with_intra_threads(onnx_config.intra_threads))
            .map_err(|e| ClassifyError::ModelLoad(format!("session builder: {}", e)))
    }

    fn from_session(session: Session) -> Result<Self> {
        if session.outputs.is_empty() {
            return Err(ClassifyError::ModelLoad("Model has no outputs".to_string()));
        }

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        // 记录所有输入输出用于调试
        for (i, name) in input_names.iter().enumerate() {
            tracing::debug!("Model input[{}]: '{}'", i, name);
        }
        for (i, name) in output_names.iter().enumerate() {
            tracing::debug!("Model output[{}]: '{}'", i, name);
        }

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        })
    }
}

impl InferenceEngine for OnnxEngine {
    fn run(&self, input_name: &str, tensor: NormalizedTensor) -> Result<EngineOutputs> {
        if !self.input_names.iter().any(|n| n == input_name) {
            return Err(ClassifyError::Inference(format!(
                "Model has no input '{}'. Available inputs: {:?}",
                input_name, self.input_names
            )));
        }

        let input_tensor = Tensor::from_array(tensor.into_array()?)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs![input_name => input_tensor])
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        // 立即提取数据，避免与会话锁的生命周期冲突
        let mut extracted = HashMap::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let Some(value) = outputs.get(name.as_str()) else {
                continue;
            };
            match value.try_extract_array::<f32>() {
                Ok(array) => {
                    extracted.insert(name.clone(), array.into_owned());
                }
                Err(e) => tracing::debug!("Skipping non-f32 output '{}': {}", name, e),
            }
        }

        Ok(extracted)
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }
}
