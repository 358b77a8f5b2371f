//! 种子点标注集.
//!
//! 用户在某张切片上点击产生种子点; 点集只增不删, 仅在显式重置或加载新文件时清空.
//! 编排阶段按 (轴, 切片) 分组消费, 同组内的正负点会被联合提交给模型.

use crate::{Axis3, Canvas};
use std::collections::BTreeMap;
use std::fmt;

/// 种子点极性: 前景 (正) 或排除区域 (负).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Polarity {
    /// 正例, 点击处属于目标对象.
    Positive,

    /// 负例, 点击处必须被排除在目标对象之外.
    Negative,
}

impl Polarity {
    /// 映射到模型的二值标签: 正例为 1, 负例为 0.
    #[inline]
    pub const fn model_label(self) -> u8 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => 0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Polarity::Positive => "P",
            Polarity::Negative => "N",
        })
    }
}

/// 一个用户标注的种子点, 采用图像坐标系 (左上角原点).
///
/// 点一经创建不再修改; 消费方 (编排器) 只读取.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SeedPoint {
    /// 点所在切片的空间轴.
    pub axis: Axis3,

    /// 点所在切片在轴内的索引.
    pub slice_index: usize,

    /// 像素列坐标.
    pub pixel_x: usize,

    /// 像素行坐标 (自上而下增长).
    pub pixel_y: usize,

    /// 极性.
    pub polarity: Polarity,
}

/// 模型坐标系下的种子点: 分组时已做过一次垂直翻转.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ModelPoint {
    /// 像素列坐标, 与图像坐标系一致.
    pub x: usize,

    /// 翻转后的行坐标 `H - y` (左下角原点).
    pub y: usize,

    /// 极性.
    pub polarity: Polarity,
}

/// 同一 (轴, 切片) 上的全部种子点, 即一次传播会话的播种单位.
#[derive(Debug, Clone)]
pub struct SeedGroup {
    /// 组内所有点共享的空间轴.
    pub axis: Axis3,

    /// 组内所有点共享的切片索引, 即锚帧的帧编号.
    pub slice_index: usize,

    canvas_height: usize,
    points: Vec<ModelPoint>,
}

impl SeedGroup {
    /// 组内点数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 组是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 模型坐标系下的组内点, 按插入顺序排列.
    #[inline]
    pub fn points(&self) -> &[ModelPoint] {
        self.points.as_slice()
    }

    /// 组内各点映射到模型的 0/1 标签, 与 [`Self::points`] 顺序一致.
    pub fn labels(&self) -> Vec<u8> {
        self.points.iter().map(|p| p.polarity.model_label()).collect()
    }

    /// 组内各点的 `(x, y)` 浮点坐标, 与 [`Self::points`] 顺序一致.
    pub fn xy(&self) -> Vec<(f32, f32)> {
        self.points
            .iter()
            .map(|p| (p.x as f32, p.y as f32))
            .collect()
    }

    /// 把组内点转换回图像坐标系 (左上角原点), 用于在叠加图上画标记.
    ///
    /// 翻转只在分组时做一次; 这里是它的逆变换, 不是第二次翻转.
    pub fn image_points(&self) -> Vec<(usize, usize, Polarity)> {
        self.points
            .iter()
            .map(|p| (p.x, self.canvas_height - p.y, p.polarity))
            .collect()
    }
}

/// 追加式有序种子点集合.
///
/// 插入顺序保留, 允许重复; 只有显式 [`Self::clear`] 会清空.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    points: Vec<SeedPoint>,
}

impl AnnotationStore {
    /// 初始化空集合.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个种子点.
    #[inline]
    pub fn push(&mut self, point: SeedPoint) {
        self.points.push(point);
    }

    /// 清空全部种子点. 在用户显式重置或加载新文件时调用.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// 点数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 集合是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按插入顺序迭代所有点.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SeedPoint> {
        self.points.iter()
    }

    /// 按 (轴, 切片) 把点集划分为种子组, 组间按 (轴, 切片) 升序排列,
    /// 组内保持插入顺序.
    ///
    /// 划分时对每个点做一次垂直翻转 `y' = H - y`, 其中 `H` 为画布高:
    /// 点击捕获使用左上角原点, 而模型与图像库期望左下角数学原点.
    /// 该翻转必须且只能发生这一次, 下游不得重复翻转.
    pub fn group(&self, canvas: Canvas) -> Vec<SeedGroup> {
        let mut groups: BTreeMap<(Axis3, usize), Vec<ModelPoint>> = BTreeMap::new();
        for p in &self.points {
            groups
                .entry((p.axis, p.slice_index))
                .or_default()
                .push(ModelPoint {
                    x: p.pixel_x,
                    y: canvas.height() - p.pixel_y,
                    polarity: p.polarity,
                });
        }
        groups
            .into_iter()
            .map(|((axis, slice_index), points)| SeedGroup {
                axis,
                slice_index,
                canvas_height: canvas.height(),
                points,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(axis: Axis3, slice: usize, x: usize, y: usize, polarity: Polarity) -> SeedPoint {
        SeedPoint {
            axis,
            slice_index: slice,
            pixel_x: x,
            pixel_y: y,
            polarity,
        }
    }

    #[test]
    fn test_vertical_flip_once() {
        let mut store = AnnotationStore::new();
        store.push(pt(Axis3::Z, 77, 10, 10, Polarity::Positive));

        let groups = store.group(Canvas::from_brats());
        assert_eq!(groups.len(), 1);
        let p = groups[0].points()[0];
        assert_eq!((p.x, p.y), (10, 240 - 10));

        // 逆变换回到图像坐标系.
        assert_eq!(groups[0].image_points()[0], (10, 10, Polarity::Positive));
    }

    #[test]
    fn test_grouping_order() {
        let mut store = AnnotationStore::new();
        store.push(pt(Axis3::Z, 77, 1, 1, Polarity::Positive));
        store.push(pt(Axis3::X, 5, 2, 2, Polarity::Negative));
        store.push(pt(Axis3::Z, 77, 3, 3, Polarity::Negative));
        store.push(pt(Axis3::Z, 10, 4, 4, Polarity::Positive));

        let groups = store.group(Canvas::from_brats());
        let keys: Vec<_> = groups.iter().map(|g| (g.axis, g.slice_index)).collect();
        assert_eq!(keys, [(Axis3::X, 5), (Axis3::Z, 10), (Axis3::Z, 77)]);

        // 组内保持插入顺序, 标签按极性映射.
        let z77 = &groups[2];
        assert_eq!(z77.len(), 2);
        assert_eq!(z77.labels(), [1, 0]);
        assert_eq!(z77.points()[0].x, 1);
        assert_eq!(z77.points()[1].x, 3);
    }

    #[test]
    fn test_clear_and_duplicates() {
        let mut store = AnnotationStore::new();
        let p = pt(Axis3::Y, 3, 7, 8, Polarity::Positive);
        store.push(p);
        store.push(p);
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.group(Canvas::from_brats()).is_empty());
    }
}
