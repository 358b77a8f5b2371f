//! 分割传播子系统.
//!
//! 自底向上包含: 模型能力接口 ([`VideoPredictor`]), 帧序列枚举
//! ([`FrameSequence`]), 逐帧产物落盘与标签体重组 ([`MaskAssembler`]),
//! 以及把三者串起来的编排器 ([`Orchestrator`]).

mod assembler;
mod error;
mod frames;
mod orchestrator;
mod predict;

#[cfg(test)]
pub(crate) mod mock;

pub use assembler::{AssemblyKey, MaskAssembler};
pub use error::{ExportError, PersistError, UnitError};
pub use frames::{FrameFile, FrameSequence};
pub use orchestrator::{
    Orchestrator, RunOutcome, RunPhase, UnitKey, UnitReport, GROUP_OBJECT_ID,
};
pub use predict::{FrameOutput, PredictError, VideoPredictor};
