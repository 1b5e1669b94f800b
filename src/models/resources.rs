use crate::models::LabelList;
use crate::utils::error::ClassifyError;
use crate::{Config, Result};
use std::fs;
use std::path::Path;

/// 进程启动时一次性加载的资源
#[derive(Debug, Clone)]
pub struct Resources {
    pub model: Vec<u8>,
    pub labels: LabelList,
}

impl Resources {
    pub fn load(config: &Config) -> Result<Self> {
        let model = read_required(&config.model_path(), "Model")?;
        tracing::info!(
            "Loaded model bytes from: {} ({} bytes)",
            config.model_path().display(),
            model.len()
        );

        let labels = LabelList::from_path(&config.labels_path())?;
        if labels.is_empty() {
            return Err(ClassifyError::ResourceNotFound(format!(
                "Label file is empty: {}",
                config.labels_path().display()
            )));
        }

        Ok(Self { model, labels })
    }

    /// 待分类图像的原始字节
    pub fn read_image(config: &Config) -> Result<Vec<u8>> {
        read_required(&config.image_path(), "Image")
    }
}

fn read_required(path: &Path, what: &str) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ClassifyError::ResourceNotFound(format!(
            "{} not found: {}",
            what,
            path.display()
        )));
    }

    Ok(fs::read(path)?)
}
