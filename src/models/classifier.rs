use crate::models::{EngineOutputs, LabelList};
use crate::utils::error::ClassifyError;
use crate::Result;
use serde::Serialize;

/// 单个候选类别
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub index: usize,
    pub label: String,
    pub score: f32,
}

pub struct Classifier;

impl Classifier {
    /// 最大值下标；并列取最小下标，NaN 不参与比较
    pub fn argmax(scores: &[f32]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (i, &score) in scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, max)) if score <= max => {}
                _ => best = Some((i, score)),
            }
        }

        best.map(|(i, _)| i)
    }

    /// 原始 logits 直接取 arg-max 并映射到标签
    pub fn classify<'a>(scores: &[f32], labels: &'a LabelList) -> Result<&'a str> {
        let index = Self::argmax(scores)
            .ok_or_else(|| ClassifyError::Inference("empty score vector".to_string()))?;

        labels.get(index).ok_or(ClassifyError::LabelIndexOutOfRange {
            index,
            len: labels.len(),
        })
    }

    /// 按分数降序取前 k 个，分数相同按下标升序
    pub fn top_k(scores: &[f32], labels: &LabelList, k: usize) -> Result<Vec<Prediction>> {
        let mut order: Vec<usize> = (0..scores.len()).filter(|&i| !scores[i].is_nan()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        order
            .into_iter()
            .take(k)
            .map(|index| {
                let label = labels.get(index).ok_or(ClassifyError::LabelIndexOutOfRange {
                    index,
                    len: labels.len(),
                })?;
                Ok(Prediction {
                    index,
                    label: label.to_string(),
                    score: scores[index],
                })
            })
            .collect()
    }

    /// 从命名输出中取出分数向量，接受 [N] 或 [1, N]
    pub fn extract_scores(outputs: &EngineOutputs, output_name: &str) -> Result<Vec<f32>> {
        let output = outputs.get(output_name).ok_or_else(|| {
            let mut available: Vec<String> = outputs.keys().cloned().collect();
            available.sort();
            ClassifyError::MissingOutputTensor {
                name: output_name.to_string(),
                available,
            }
        })?;

        let shape = output.shape();
        match shape {
            [_] => {}
            [1, _] => {}
            _ => {
                return Err(ClassifyError::Inference(format!(
                    "Expected output shape [N] or [1, N], got {:?}",
                    shape
                )))
            }
        }

        if output.is_empty() {
            return Err(ClassifyError::Inference("empty score vector".to_string()));
        }

        Ok(output.iter().copied().collect())
    }
}
