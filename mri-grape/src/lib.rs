#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 面向多模态 3D/4D MRI nifti 扫描, 提供 "体数据 -> 帧序列 -> 视频分割传播
//! -> 掩码体数据" 的完整数据管线.
//!
//! 管线各阶段由视频分割模型 (作为不透明能力, 见 [`seg::VideoPredictor`]) 驱动:
//! 用户在某一张切片上给出若干正/负种子点, 模型沿切片序列向前、向后传播,
//! 本库负责把传播产出的每帧掩码重组为固定形状的 nifti 标签体.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 体数据按 nifti 惯例以 `(x, y, z, 模态)` 组织; 3D 输入会自动补一个单例模态轴.
//! 2. 全背景切片不会落盘, 因此帧序列允许存在空洞, 下游组件必须容忍非连续的帧编号.
//! 3. 在非期望情况下 (编程错误), 程序会直接 panic, 而不会导致内存错误.
//!   As what Rust promises. 运行时可恢复的失败一律走 `Result`.
//!
//! # 开发计划
//!
//! ### 切片导出 (SliceCodec) ✅
//!
//! 逐模态、逐空间轴提取 2D 切片, 归一化到 8-bit, 居中填充到固定画布后编码为帧文件.
//! 全背景切片跳过.
//!
//! 实现位于 `mri-grape/src/codec.rs`.
//!
//! ### 种子点标注集 (AnnotationStore) ✅
//!
//! 追加式有序点集, 按 (轴, 切片) 分组, 分组时统一做一次垂直翻转
//! `y' = H - y` 以对齐模型的数学坐标系.
//!
//! 实现位于 `mri-grape/src/annot.rs`.
//!
//! ### 传播编排 (Orchestrator) ✅
//!
//! 按 (轴, 种子组, 模态) 为单位建立传播会话, 联合提交整组种子点,
//! 向前/向后两个方向收集逐帧掩码. 单元之间互相隔离, 一个单元失败不影响其余单元.
//!
//! 实现位于 `mri-grape/src/seg/orchestrator.rs`.
//!
//! ### 掩码重组与导出 (MaskAssembler) ✅
//!
//! 逐帧掩码持久化 (npy 原始数组 + 灰度可视化 + 含种子点的叠加图),
//! 并按 (轴, 模态) 重新堆叠为固定形状的标签体, 序列化为 nifti 文件.
//!
//! 实现位于 `mri-grape/src/seg/assembler.rs`.
//!
//! ### 视图会话状态 ✅
//!
//! 显式的会话状态结构 (当前切片索引、模态通道、掩码可见性), 不使用全局可变状态.
//!
//! 实现位于 `mri-grape/src/view.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 进度回调: 参数依次为 (已完成数, 总数).
///
/// 管线的长耗时阶段 (帧导出、传播) 会阻塞调用线程;
/// 需要保持响应的调用方应当在交互线程之外运行管线, 并通过该回调同步进度.
pub type Progress<'a> = &'a mut dyn FnMut(usize, usize);

/// 4D MRI nifti 体数据与 2D 切片基础数据结构.
mod data;

pub use data::{
    Axis3, Canvas, MaskSlice, MaskVolume, MriScan, NiftiHeaderAttr, ScanSlice, VolumeError,
};

pub use data::save::{ImgWriteRaw, ImgWriteVis};

pub mod consts;

mod codec;
pub use codec::{CodecError, ExportStats, SliceCodec};

mod annot;
pub use annot::{AnnotationStore, ModelPoint, Polarity, SeedGroup, SeedPoint};

pub mod seg;

mod view;
pub use view::ViewState;

pub mod prelude;
