//! 不透明的视频分割模型能力.
//!
//! 本库不关心模型如何加载、跑在什么设备上; 编排器只依赖三个操作:
//! 在帧目录上建立会话、在锚帧上播种、按方向惰性传播.
//! 这使得编排逻辑可以用确定性的测试替身做单元测试.

use ndarray::Array2;
use std::path::Path;
use thiserror::Error;

/// 模型侧错误. 对本库而言模型是黑盒, 因此只携带一条原因字符串.
#[derive(Debug, Clone, Error)]
#[error("分割模型错误: {0}")]
pub struct PredictError(pub String);

/// 单帧的传播产出.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// 帧在序列中的位置 (0 起, 即视频帧号).
    ///
    /// 注意这是 **序列位置** 而不是文件名里的切片索引;
    /// 两者仅在帧序列无空洞时相等, 位置到切片索引的映射由编排器完成.
    pub frame_pos: usize,

    /// 每个被追踪对象的 `(对象 id, logits)` 对.
    ///
    /// logits 与填充后的画布同形状, 以 0 为阈值导出前景掩码.
    pub objects: Vec<(u32, Array2<f32>)>,
}

/// 视频分割传播模型的最小能力接口.
pub trait VideoPredictor {
    /// 绑定到一个帧目录的传播会话 (推理状态). 会话之间不共享任何状态.
    type Session;

    /// 在 `frames_dir` 上建立新会话.
    fn init_session(&self, frames_dir: &Path) -> Result<Self::Session, PredictError>;

    /// 在位置为 `frame_pos` 的锚帧上, 以对象 `object_id` 联合提交一组种子点.
    ///
    /// `points` 为模型坐标系下的 `(x, y)`; `labels` 与之等长,
    /// 1 表示前景、0 表示排除, 见 [`crate::Polarity::model_label`].
    fn seed(
        &self,
        session: &mut Self::Session,
        frame_pos: usize,
        points: &[(f32, f32)],
        labels: &[u8],
        object_id: u32,
    ) -> Result<(), PredictError>;

    /// 从锚帧出发, 沿一个方向惰性产出逐帧结果.
    ///
    /// `reverse` 为 `false` 时按帧位置递增传播, 为 `true` 时递减.
    /// 消费方随时可以停止拉取, 模型能力无需提供显式取消信号.
    fn propagate<'s>(
        &'s self,
        session: &'s mut Self::Session,
        reverse: bool,
    ) -> Box<dyn Iterator<Item = Result<FrameOutput, PredictError>> + 's>;
}
