//! 空间轴.

use std::fmt;

/// 体数据的三个空间轴之一.
///
/// 轴名 (x/y/z) 同时也用于帧序列目录与导出文件的命名,
/// 例如 `scans_x`, `masks_z`, `z_modality_1.nii.gz`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Axis3 {
    /// 第一空间轴.
    X,

    /// 第二空间轴.
    Y,

    /// 第三空间轴.
    Z,
}

impl Axis3 {
    /// 全部空间轴, 按 x, y, z 排列.
    pub const ALL: [Axis3; 3] = [Axis3::X, Axis3::Y, Axis3::Z];

    /// 轴在 4D 数组 `(x, y, z, 模态)` 中对应的维度下标.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis3::X => 0,
            Axis3::Y => 1,
            Axis3::Z => 2,
        }
    }

    /// 轴名小写字符串.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis3::X => "x",
            Axis3::Y => "y",
            Axis3::Z => "z",
        }
    }

    /// 转换为 `ndarray` 的轴对象.
    #[inline]
    pub fn nd(self) -> ndarray::Axis {
        ndarray::Axis(self.index())
    }
}

impl fmt::Display for Axis3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
