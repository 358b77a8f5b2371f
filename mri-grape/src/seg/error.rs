//! 运行时错误.
//!
//! 错误分三层: 单元前置条件/传播错误 ([`UnitError`]) 只中止所在的
//! (轴, 种子组, 模态) 单元, 兄弟单元继续; 持久化错误 ([`PersistError`])
//! 对当前单元是致命的; 导出错误 ([`ExportError`]) 对整次导出是致命的.

use super::PredictError;
use crate::{Axis3, Idx2d};
use std::path::PathBuf;
use thiserror::Error;

/// 单个 (轴, 种子组, 模态) 编排单元的失败原因.
#[derive(Debug, Error)]
pub enum UnitError {
    /// 种子组为空, 无点可播.
    #[error("种子组为空")]
    EmptySeedGroup,

    /// 帧目录不存在可识别的帧.
    #[error("帧序列为空: {0}")]
    EmptyFrames(PathBuf),

    /// 锚帧缺失: 对应切片全背景, 从未被导出为帧.
    ///
    /// 这是可报告的失败, 而不是静默跳过.
    #[error("锚帧缺失: 目录 {dir} 下没有切片 {slice_index} 对应的帧")]
    MissingAnchor {
        /// 被枚举的帧目录.
        dir: PathBuf,

        /// 种子组的切片索引.
        slice_index: usize,
    },

    /// 模型侧错误.
    #[error(transparent)]
    Predict(#[from] PredictError),

    /// 帧目录枚举等底层 I/O 错误.
    #[error("I/O 失败: {0}")]
    Io(#[from] std::io::Error),

    /// 逐帧产物持久化错误.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// 逐帧掩码持久化 (npy + 可视化 + 叠加图) 错误.
#[derive(Debug, Error)]
pub enum PersistError {
    /// 创建输出目录等底层 I/O 错误.
    #[error("I/O 失败: {0}")]
    Io(#[from] std::io::Error),

    /// 图像读写错误.
    #[error("图像读写失败: {0}")]
    Image(#[from] image::error::ImageError),

    /// npy 数组写入错误.
    #[error("npy 写入失败: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

/// 标签体重组与 nifti 导出错误.
#[derive(Debug, Error)]
pub enum ExportError {
    /// 创建输出目录等底层 I/O 错误.
    #[error("I/O 失败: {0}")]
    Io(#[from] std::io::Error),

    /// nifti 序列化错误.
    #[error("nifti 写入失败: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 记录的掩码与目标画布形状不一致.
    #[error("掩码形状 {got:?} 与目标画布 {expected:?} 不一致 (key: {axis}, 模态 {modality})")]
    ShapeMismatch {
        /// 掩码所属轴.
        axis: Axis3,

        /// 掩码所属模态.
        modality: usize,

        /// 实际掩码形状.
        got: Idx2d,

        /// 期望的画布形状.
        expected: Idx2d,
    },
}
