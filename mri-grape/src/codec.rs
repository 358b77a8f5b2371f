//! 切片导出: 把 4D 体数据转换为逐轴、逐模态的帧序列.

use crate::data::save::save_gray;
use crate::{Axis3, Canvas, MriScan, NiftiHeaderAttr, Progress};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 切片导出错误. 任何一次落盘失败都会中止整个扫描的导出.
#[derive(Debug, Error)]
pub enum CodecError {
    /// 创建目录等底层 I/O 错误.
    #[error("I/O 失败: {0}")]
    Io(#[from] std::io::Error),

    /// 图像编码/写入错误.
    #[error("图像写入失败: {0}")]
    Image(#[from] image::error::ImageError),
}

/// 一次导出的统计信息.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ExportStats {
    /// 实际落盘的帧文件数.
    pub written: usize,

    /// 因全背景而跳过的切片数.
    pub skipped: usize,
}

/// 切片编解码器: 体数据到帧序列的转换端.
///
/// 对每个模态, 在输出根目录下产生三个帧序列目录 (每个空间轴一个),
/// 目录布局为 `<root>/<扫描名>/modality_<m>/scans_<轴>/<索引>.<扩展名>`.
/// 全背景切片不落盘, 因此帧编号允许存在空洞.
#[derive(Debug, Copy, Clone)]
pub struct SliceCodec {
    canvas: Canvas,
    extension: &'static str,
}

impl Default for SliceCodec {
    #[inline]
    fn default() -> Self {
        Self::new(Canvas::from_brats())
    }
}

impl SliceCodec {
    /// 以给定画布初始化, 帧文件使用默认扩展名.
    #[inline]
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            extension: crate::consts::FRAME_DEFAULT_EXT,
        }
    }

    /// 目标画布.
    #[inline]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// `axis` 轴、`modality` 模态的帧序列目录 (相对扫描目录的推导规则).
    pub fn frames_dir(scan_dir: &Path, axis: Axis3, modality: usize) -> PathBuf {
        scan_dir
            .join(format!("modality_{modality}"))
            .join(format!("scans_{axis}"))
    }

    /// 把 `scan` 的全部模态沿三个空间轴导出为帧序列.
    ///
    /// 对轴上每个索引: 提取切片, 全背景则跳过; 否则归一化到 8-bit,
    /// 居中填充到画布, 以裸整数索引命名落盘. 每处理一个候选切片,
    /// `progress` 回调一次 (已处理数, 候选总数).
    pub fn export_scan(
        &self,
        scan: &MriScan,
        output_root: &Path,
        mut progress: Option<Progress>,
    ) -> Result<ExportStats, CodecError> {
        let scan_dir = output_root.join(scan.name());
        fs::create_dir_all(&scan_dir)?;

        let per_modality: usize = Axis3::ALL.iter().map(|&a| scan.axis_len(a)).sum();
        let total = per_modality * scan.modality_len();
        let mut done = 0usize;
        let mut stats = ExportStats::default();

        log::info!(
            "导出扫描 `{}`: {} 个模态, 每模态 {} 张候选切片",
            scan.name(),
            scan.modality_len(),
            per_modality
        );

        for modality in 0..scan.modality_len() {
            for axis in Axis3::ALL {
                let dir = Self::frames_dir(&scan_dir, axis, modality);
                fs::create_dir_all(&dir)?;

                for index in 0..scan.axis_len(axis) {
                    // 索引范围取自扫描自身, 提取不会越界.
                    let sli = scan.slice_at(axis, index, modality).unwrap();
                    if sli.is_background() {
                        stats.skipped += 1;
                    } else {
                        let padded = self.canvas.pad_center(sli.normalize_u8().view());
                        let path = dir.join(format!("{index}.{}", self.extension));
                        save_gray(padded.view(), path)?;
                        stats.written += 1;
                    }
                    done += 1;
                    if let Some(cb) = progress.as_mut() {
                        cb(done, total);
                    }
                }
            }
            log::debug!("模态 {modality} 导出完成");
        }

        log::info!(
            "扫描 `{}` 导出完成: 落盘 {} 帧, 跳过 {} 张全背景切片",
            scan.name(),
            stats.written,
            stats.skipped
        );
        Ok(stats)
    }
}
