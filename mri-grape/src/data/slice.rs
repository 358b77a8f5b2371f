//! 2D 切片与逐帧掩码.

use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
use crate::Idx2d;
use ndarray::{Array2, ArrayView2};
use std::ops::Index;

/// 拥有数据的二维扫描切片, 像素为原始浮点强度值.
///
/// 由 [`crate::MriScan::slice_at`] 固定一个空间轴与一个模态提取得到.
#[derive(Debug, Clone)]
pub struct ScanSlice {
    data: Array2<f32>,
}

impl Index<Idx2d> for ScanSlice {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl ScanSlice {
    /// 初始化.
    #[inline]
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// 切片形状, 以 `(高, 宽)` 格式给出.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 切片是否全为背景 (即全零)?
    ///
    /// 全背景切片不应被导出为帧文件.
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// 将强度值线性归一化到 8-bit 灰度范围.
    ///
    /// 映射规则为 `(v - min) / (max - min) * 255`, 四舍五入取整;
    /// 最小值映射为 0, 最大值映射为 255. 若切片为常数 (max == min),
    /// 则整张输出为 0, 不做除零运算.
    pub fn normalize_u8(&self) -> Array2<u8> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in self.data.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        if max <= min {
            return Array2::zeros(self.shape());
        }
        let span = max - min;
        self.data.mapv(|v| ((v - min) / span * 255.0).round() as u8)
    }
}

/// 单帧、单对象的 0/1 掩码, 与填充后的画布形状对齐.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSlice {
    data: Array2<u8>,
}

impl Index<Idx2d> for MaskSlice {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl MaskSlice {
    /// 从裸 0/1 数组初始化.
    ///
    /// 若存在 0/1 以外的像素值, 则程序 panic.
    pub fn new(data: Array2<u8>) -> Self {
        assert!(
            data.iter()
                .all(|&p| matches!(p, MASK_BACKGROUND | MASK_FOREGROUND)),
            "掩码只允许 0/1 像素"
        );
        Self { data }
    }

    /// 以 0 为阈值, 从模型输出的 logits 导出掩码: 正值为前景, 其余为背景.
    pub fn from_logits(logits: ArrayView2<f32>) -> Self {
        Self {
            data: logits.mapv(|v| {
                if v > 0.0 {
                    MASK_FOREGROUND
                } else {
                    MASK_BACKGROUND
                }
            }),
        }
    }

    /// 掩码形状, 以 `(高, 宽)` 格式给出.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    /// 前景像素个数.
    #[inline]
    pub fn foreground_len(&self) -> usize {
        self.data.iter().filter(|&&p| p == MASK_FOREGROUND).count()
    }

    /// 掩码是否全为背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.foreground_len() == 0
    }
}
