pub mod classifier;
pub mod context;
pub mod engine;
pub mod labels;
pub mod onnx;
pub mod resources;

pub use classifier::{Classifier, Prediction};
pub use context::{ClassifierContext, ContextStats, InferenceSettings};
pub use engine::{EngineOutputs, InferenceEngine};
pub use labels::LabelList;
pub use onnx::OnnxEngine;
pub use resources::Resources;
