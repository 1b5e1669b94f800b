use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::{ArrayD, IxDyn};
use onnx_classify::image::NormalizedTensor;
use onnx_classify::models::{EngineOutputs, InferenceSettings, Resources};
use onnx_classify::{
    ClassificationPipeline, ClassifierContext, ClassifyError, ClassifyStage, Config,
    InferenceEngine, LabelList,
};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// 返回固定分数的推理引擎，并记录收到的输入
struct StubEngine {
    output_name: String,
    scores: Vec<f32>,
    delay: Option<Duration>,
    seen: Mutex<Option<(String, NormalizedTensor)>>,
}

impl StubEngine {
    fn new(scores: Vec<f32>) -> Self {
        Self {
            output_name: "output0".to_string(),
            scores,
            delay: None,
            seen: Mutex::new(None),
        }
    }
}

impl InferenceEngine for StubEngine {
    fn run(&self, input_name: &str, tensor: NormalizedTensor) -> onnx_classify::Result<EngineOutputs> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        *self.seen.lock() = Some((input_name.to_string(), tensor));

        let scores = ArrayD::from_shape_vec(IxDyn(&[1, self.scores.len()]), self.scores.clone())
            .expect("stub scores shape");
        let mut outputs = EngineOutputs::new();
        outputs.insert(self.output_name.clone(), scores);
        Ok(outputs)
    }

    fn output_names(&self) -> Vec<String> {
        vec![self.output_name.clone()]
    }
}

struct FailingEngine;

impl InferenceEngine for FailingEngine {
    fn run(&self, _input_name: &str, _tensor: NormalizedTensor) -> onnx_classify::Result<EngineOutputs> {
        Err(ClassifyError::Inference("shape mismatch".to_string()))
    }
}

fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn labels(n: usize) -> LabelList {
    (0..n).map(|i| format!("class_{i}")).collect()
}

fn context_with(engine: Arc<dyn InferenceEngine>, n_labels: usize) -> ClassifierContext {
    ClassifierContext::new(engine, labels(n_labels), InferenceSettings::default())
}

#[tokio::test]
async fn test_end_to_end_solid_image() {
    let engine = Arc::new(StubEngine::new(vec![0.1, -2.0, 0.4, 3.5, 1.0]));
    let context = context_with(engine.clone(), 5);

    let result = ClassificationPipeline::classify_bytes(&context, &solid_png(640, 640, [128, 128, 128]))
        .await
        .unwrap();

    assert_eq!(result.label, "class_3");
    assert_eq!(result.index, 3);
    assert_eq!(result.score, 3.5);
    assert_eq!(result.top.len(), 1);

    let seen = engine.seen.lock();
    let (input_name, tensor) = seen.as_ref().expect("engine was called");
    assert_eq!(input_name, "images");
    assert_eq!(tensor.shape(), [1, 3, 224, 224]);

    let expected_r = (128.0 / 255.0 - 0.485) / 0.229;
    assert!(tensor.channel(0).iter().all(|v| (v - expected_r).abs() < 1e-5));
}

#[tokio::test]
async fn test_non_square_image_is_center_cropped() {
    let engine = Arc::new(StubEngine::new(vec![1.0, 0.0]));
    let context = context_with(engine.clone(), 2);

    let result = ClassificationPipeline::classify_bytes(&context, &solid_png(800, 300, [0, 255, 0]))
        .await
        .unwrap();
    assert_eq!(result.label, "class_0");

    let seen = engine.seen.lock();
    let (_, tensor) = seen.as_ref().unwrap();
    assert_eq!(tensor.shape(), [1, 3, 224, 224]);
    let expected_g = (1.0 - 0.456) / 0.224;
    assert!(tensor.channel(1).iter().all(|v| (v - expected_g).abs() < 1e-4));
}

#[tokio::test]
async fn test_top_k_ranking() {
    let engine = Arc::new(StubEngine::new(vec![0.3, 0.9, 0.9, 0.1]));
    let mut settings = InferenceSettings::default();
    settings.top_k = 3;
    let context = ClassifierContext::new(engine, labels(4), settings);

    let result = ClassificationPipeline::classify_bytes(&context, &solid_png(224, 224, [1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(result.label, "class_1");
    let ranked: Vec<usize> = result.top.iter().map(|p| p.index).collect();
    assert_eq!(ranked, vec![1, 2, 0]);
}

#[tokio::test]
async fn test_score_label_mismatch_is_fatal() {
    let engine = Arc::new(StubEngine::new(vec![0.1, 0.2, 0.9]));
    let context = context_with(engine, 2);

    let err = ClassificationPipeline::classify_bytes(&context, &solid_png(32, 32, [0, 0, 0]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::ScoreCountMismatch { scores: 3, labels: 2 }
    ));
    assert_eq!(err.stage(), ClassifyStage::Inference);
}

#[tokio::test]
async fn test_missing_output_tensor() {
    let mut stub = StubEngine::new(vec![0.5, 0.5]);
    stub.output_name = "logits".to_string();
    let context = context_with(Arc::new(stub), 2);

    let err = ClassificationPipeline::classify_bytes(&context, &solid_png(32, 32, [0, 0, 0]))
        .await
        .unwrap_err();
    match err {
        ClassifyError::MissingOutputTensor { name, available } => {
            assert_eq!(name, "output0");
            assert_eq!(available, vec!["logits".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_engine_failure_propagates() {
    let context = context_with(Arc::new(FailingEngine), 2);

    let err = ClassificationPipeline::classify_bytes(&context, &solid_png(32, 32, [0, 0, 0]))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifyError::Inference(ref msg) if msg == "shape mismatch"));
}

#[tokio::test]
async fn test_inference_timeout() {
    let mut stub = StubEngine::new(vec![1.0]);
    stub.delay = Some(Duration::from_millis(300));
    let mut settings = InferenceSettings::default();
    settings.timeout = Some(Duration::from_millis(20));
    let context = ClassifierContext::new(Arc::new(stub), labels(1), settings);

    let err = ClassificationPipeline::classify_bytes(&context, &solid_png(16, 16, [9, 9, 9]))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifyError::Timeout(20)));
}

#[tokio::test]
async fn test_undecodable_bytes_fail_at_decoding() {
    let engine = Arc::new(StubEngine::new(vec![1.0]));
    let context = context_with(engine.clone(), 1);

    let err = ClassificationPipeline::classify_bytes(&context, b"not an image at all")
        .await
        .unwrap_err();
    assert_eq!(err.stage(), ClassifyStage::Decoding);
    assert_eq!(err.exit_code(), 3);
    assert!(engine.seen.lock().is_none());
}

#[tokio::test]
async fn test_classify_image_from_models_dir() {
    let dir = tempfile::tempdir().unwrap();
    let models_dir = dir.path().to_string_lossy().into_owned();
    let path = dir.path().join("sample.png");
    std::fs::write(&path, solid_png(300, 300, [200, 10, 10])).unwrap();

    let config = Config::new(
        models_dir.clone(),
        Some(path.to_string_lossy().into_owned()),
        224,
        None,
    )
    .unwrap();
    let context = context_with(Arc::new(StubEngine::new(vec![0.0, 1.0])), 2);

    let image = Resources::read_image(&config).unwrap();
    let result = ClassificationPipeline::classify_bytes(&context, &image).await.unwrap();
    assert_eq!(result.label, "class_1");

    // 默认 sample.jpg 不存在
    let config = Config::new(models_dir, None, 224, None).unwrap();
    let err = Resources::read_image(&config).unwrap_err();
    assert!(matches!(err, ClassifyError::ResourceNotFound(_)));
    assert_eq!(err.stage(), ClassifyStage::Loading);
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_grayscale_jpeg_is_classified() {
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(320, 240, Luma([90])));
    let mut jpeg = Cursor::new(Vec::new());
    gray.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();

    let engine = Arc::new(StubEngine::new(vec![0.2, 0.7]));
    let context = context_with(engine.clone(), 2);

    let result = ClassificationPipeline::classify_bytes(&context, &jpeg.into_inner())
        .await
        .unwrap();
    assert_eq!(result.label, "class_1");

    let seen = engine.seen.lock();
    let (_, tensor) = seen.as_ref().expect("engine was called");
    assert_eq!(tensor.shape(), [1, 3, 224, 224]);

    // 三个通道来自同一灰度值，反归一化后应基本一致
    let (r, g, b) = (tensor.channel(0), tensor.channel(1), tensor.channel(2));
    let byte = |v: f32, c: usize| {
        let (mean, std) = ([0.485, 0.456, 0.406][c], [0.229, 0.224, 0.225][c]);
        (v * std + mean) * 255.0
    };
    for i in [0, 224 * 112 + 112, 224 * 224 - 1] {
        let (vr, vg, vb) = (byte(r[i], 0), byte(g[i], 1), byte(b[i], 2));
        assert!((vr - vg).abs() < 1.0 && (vg - vb).abs() < 1.0);
        assert!((vr - 90.0).abs() < 4.0);
    }
}

#[tokio::test]
async fn test_context_is_shared_across_concurrent_calls() {
    let context = Arc::new(context_with(Arc::new(StubEngine::new(vec![0.2, 0.8])), 2));
    let image = Arc::new(solid_png(64, 48, [10, 20, 30]));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let context = Arc::clone(&context);
        let image = Arc::clone(&image);
        handles.push(tokio::spawn(async move {
            ClassificationPipeline::classify_bytes(&context, &image).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().label, "class_1");
    }

    let stats = context.stats();
    assert_eq!(stats.num_labels, 2);
    assert_eq!(stats.model_outputs, vec!["output0".to_string()]);
}
