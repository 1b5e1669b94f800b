use crate::{
    classify::{Classification, PipelineTimings},
    image::{ImageLoader, ImagePreprocessor, ImageTransforms, NormalizedTensor},
    models::{Classifier, ClassifierContext, EngineOutputs},
    utils::error::ClassifyError,
    Result,
};
use std::time::{Duration, Instant};

/// 分类处理流水线
pub struct ClassificationPipeline;

impl ClassificationPipeline {
    /// 核心流水线：解码 -> 缩放裁剪 -> 归一化 -> 推理 -> arg-max
    pub async fn classify_bytes(context: &ClassifierContext, bytes: &[u8]) -> Result<Classification> {
        let start_time = Instant::now();
        let mut timings = PipelineTimings::default();

        let tensor = Self::preprocess(context, bytes, &mut timings)?;

        let inference_start = Instant::now();
        let outputs = Self::run_inference(context, tensor).await?;
        timings.inference_ms = millis(inference_start.elapsed());

        let labels = context.labels();
        let scores = Classifier::extract_scores(&outputs, &context.settings().output_name)?;
        if scores.len() != labels.len() {
            return Err(ClassifyError::ScoreCountMismatch {
                scores: scores.len(),
                labels: labels.len(),
            });
        }

        let label = Classifier::classify(&scores, labels)?.to_string();
        let index = Classifier::argmax(&scores).unwrap_or_default();
        let top = Classifier::top_k(&scores, labels, context.settings().top_k)?;
        timings.total_ms = millis(start_time.elapsed());

        tracing::info!(
            "Classification completed: label={}, index={}, score={:.4}, total_time={:.1}ms",
            label,
            index,
            scores[index],
            timings.total_ms
        );

        Ok(Classification {
            label,
            index,
            score: scores[index],
            top,
            timings,
        })
    }

    /// 图像字节 -> 模型输入张量
    pub fn preprocess(
        context: &ClassifierContext,
        bytes: &[u8],
        timings: &mut PipelineTimings,
    ) -> Result<NormalizedTensor> {
        let settings = context.settings();

        let stage_start = Instant::now();
        let grid = ImageLoader::decode(bytes)?;
        timings.decode_ms = millis(stage_start.elapsed());
        tracing::debug!(
            "Decoded image: {}x{}, {} bytes/pixel",
            grid.width(),
            grid.height(),
            grid.bytes_per_pixel()
        );

        let stage_start = Instant::now();
        let cropped = ImageTransforms::resize_and_crop(grid, settings.target_width, settings.target_height)?;
        timings.resize_ms = millis(stage_start.elapsed());

        let stage_start = Instant::now();
        let tensor = ImagePreprocessor::build_tensor_with(&cropped, &settings.normalization)?;
        timings.normalize_ms = millis(stage_start.elapsed());

        Ok(tensor)
    }

    /// 推理放到阻塞线程池执行；超时后不再等待，但已开始的推理不会被中断
    async fn run_inference(context: &ClassifierContext, tensor: NormalizedTensor) -> Result<EngineOutputs> {
        let engine = context.engine();
        let input_name = context.settings().input_name.clone();
        let task = tokio::task::spawn_blocking(move || engine.run(&input_name, tensor));

        let joined = match context.settings().timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| ClassifyError::Timeout(limit.as_millis() as u64))?,
            None => task.await,
        };

        joined.map_err(|e| ClassifyError::Inference(format!("Inference task failed: {}", e)))?
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
