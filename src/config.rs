use crate::utils::error::ClassifyError;
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// 模型资源目录
    pub models_dir: PathBuf,

    /// 待分类图像；为空时使用资源目录下的 sample.jpg
    pub image: Option<PathBuf>,

    /// 模型文件名（相对 models_dir）
    pub model_file: String,

    /// 标签文件名（相对 models_dir）
    pub labels_file: String,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 预处理配置
    pub preprocess_config: PreprocessConfig,

    /// 推理配置
    pub inference_config: InferenceConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,

    /// 优化级别 (0-3)
    pub optimization_level: i32,
}

#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub target_width: u32,
    pub target_height: u32,
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub input_name: String,
    pub output_name: String,

    /// 推理超时（毫秒），0 表示不限
    pub timeout_ms: u64,

    /// 输出前 k 个候选
    pub top_k: usize,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            intra_threads: (num_cpus::get() * 3 / 4).max(1), // 使用75%的CPU核心
            optimization_level: 3,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_name: "images".to_string(),
            output_name: "output0".to_string(),
            timeout_ms: 30_000,
            top_k: 1,
        }
    }
}

impl Config {
    pub fn new(
        models_dir: String,
        image: Option<String>,
        target_size: u32,
        threads: Option<usize>,
    ) -> Result<Self> {
        let mut onnx_config = OnnxConfig::default();
        if let Some(threads) = threads {
            onnx_config.intra_threads = threads.max(1);
        }

        let config = Self {
            models_dir: PathBuf::from(models_dir),
            image: image.map(PathBuf::from),
            model_file: "model.onnx".to_string(),
            labels_file: "labels.txt".to_string(),
            onnx_config,
            preprocess_config: PreprocessConfig {
                target_width: target_size,
                target_height: target_size,
            },
            inference_config: InferenceConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let PreprocessConfig {
            target_width,
            target_height,
        } = self.preprocess_config;
        if target_width == 0 || target_height == 0 {
            return Err(ClassifyError::Config(format!(
                "target size must be positive, got {}x{}",
                target_width, target_height
            )));
        }

        if self.inference_config.top_k == 0 {
            return Err(ClassifyError::Config("top-k must be at least 1".to_string()));
        }

        if self.inference_config.input_name.is_empty() || self.inference_config.output_name.is_empty() {
            return Err(ClassifyError::Config("tensor names must not be empty".to_string()));
        }

        Ok(())
    }

    /// 获取模型路径
    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join(&self.model_file)
    }

    /// 获取标签文件路径
    pub fn labels_path(&self) -> PathBuf {
        self.models_dir.join(&self.labels_file)
    }

    /// 获取图像路径
    pub fn image_path(&self) -> PathBuf {
        self.image
            .clone()
            .unwrap_or_else(|| self.models_dir.join("sample.jpg"))
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        match self.inference_config.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
