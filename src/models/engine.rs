use crate::image::NormalizedTensor;
use crate::Result;
use ndarray::ArrayD;
use std::collections::HashMap;

/// 推理输出：输出名 -> 张量
pub type EngineOutputs = HashMap<String, ArrayD<f32>>;

/// 推理引擎接口：张量绑定到命名输入，返回命名输出。
///
/// 实现需要支持多线程共享调用；内部如需可变状态自行加锁。
pub trait InferenceEngine: Send + Sync {
    fn run(&self, input_name: &str, tensor: NormalizedTensor) -> Result<EngineOutputs>;

    /// 模型声明的输出名，仅用于日志和统计
    fn output_names(&self) -> Vec<String> {
        Vec::new()
    }
}
