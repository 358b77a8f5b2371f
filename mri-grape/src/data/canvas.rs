//! 固定尺寸画布与居中填充.

use crate::Idx2d;
use ndarray::{s, Array2, ArrayView2};

/// 固定尺寸的 2D 画布, 即切片导出与掩码对齐的目标形状.
///
/// 该画布是只读的. 若要修改画布参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Canvas {
    height: usize,
    width: usize,
}

impl Canvas {
    /// 构建画布.
    ///
    /// `height` 和 `width` 必须为正, 否则返回 `None`.
    pub fn new(height: usize, width: usize) -> Option<Canvas> {
        (height > 0 && width > 0).then_some(Self { height, width })
    }

    /// 构建 BraTS 风格扫描使用的 240 x 240 画布.
    #[inline]
    pub const fn from_brats() -> Canvas {
        Self {
            height: 240,
            width: 240,
        }
    }

    /// 画布高.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// 画布宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 画布形状, 以 `(高, 宽)` 格式给出.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        (self.height, self.width)
    }

    /// 源图在画布中的起始偏移, 即 `((H - h) / 2, (W - w) / 2)`.
    ///
    /// 如果源图任一维大于画布, 则程序 panic.
    #[inline]
    pub fn offsets(&self, (h, w): Idx2d) -> Idx2d {
        assert!(h <= self.height && w <= self.width, "源图大于画布");
        ((self.height - h) / 2, (self.width - w) / 2)
    }

    /// 将 `src` 居中复制进一张全零画布并返回.
    ///
    /// 源图占据行 `[(H - h) / 2, (H - h) / 2 + h)` 与列
    /// `[(W - w) / 2, (W - w) / 2 + w)`, 其余像素保持为零.
    ///
    /// 如果源图任一维大于画布, 则程序 panic.
    pub fn pad_center(&self, src: ArrayView2<u8>) -> Array2<u8> {
        let (h, w) = src.dim();
        let (oh, ow) = self.offsets((h, w));
        let mut out = Array2::zeros(self.shape());
        out.slice_mut(s![oh..oh + h, ow..ow + w]).assign(&src);
        out
    }
}

impl Default for Canvas {
    #[inline]
    fn default() -> Self {
        Self::from_brats()
    }
}
