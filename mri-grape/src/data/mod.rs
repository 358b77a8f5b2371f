use std::path::Path;

use ndarray::{Array4, ArrayD, ArrayView2, ArrayView4, Axis, Ix4};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use thiserror::Error;

use crate::Idx3d;

mod axis;
mod canvas;
pub(crate) mod save;
mod slice;

pub use axis::Axis3;
pub use canvas::Canvas;
pub use slice::{MaskSlice, ScanSlice};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 打开体数据文件错误.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// 底层 nifti 读取错误.
    #[error("nifti 读取失败: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 体数据维数不是 3 或 4.
    #[error("体数据必须是 3D 或 4D, 但实际为 {0}D")]
    BadRank(usize),

    /// 存在长度为零的空间轴.
    #[error("空间轴长度必须为正, 但实际形状为 {0:?}")]
    BadShape(Idx3d),
}

/// 4D 数组形状检查与公共属性.
///
/// 体数据一律按 nifti 惯例以 `(x, y, z, 模态)` 组织;
/// 3D 输入在打开时补一个单例模态轴.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取空间形状 `(x, y, z)`.
    fn shape(&self) -> Idx3d;

    /// 获取模态个数.
    fn modality_len(&self) -> usize;

    /// 获取 `axis` 轴上的切片个数.
    #[inline]
    fn axis_len(&self, axis: Axis3) -> usize {
        let (x, y, z) = self.shape();
        [x, y, z][axis.index()]
    }

    /// 三个轴的中间切片索引, 用于初始化视图.
    #[inline]
    fn mid_slices(&self) -> [usize; 3] {
        let (x, y, z) = self.shape();
        [x / 2, y / 2, z / 2]
    }

    /// 检查 (轴内索引, 模态) 是否合法.
    #[inline]
    fn check(&self, axis: Axis3, index: usize, modality: usize) -> bool {
        index < self.axis_len(axis) && modality < self.modality_len()
    }
}

/// 从 4D 数据中提取一个 2D 切片视图: 先固定模态, 再固定一个空间轴.
///
/// 越界时返回 `None`, 不会 panic.
fn slice_view<T>(
    data: &Array4<T>,
    axis: Axis3,
    index: usize,
    modality: usize,
) -> Option<ArrayView2<'_, T>> {
    if modality >= data.len_of(Axis(3)) || index >= data.len_of(axis.nd()) {
        return None;
    }
    Some(
        data.index_axis(Axis(3), modality)
            .index_axis_move(axis.nd(), index),
    )
}

/// 将 nifti 动态维数组规范化为 4D: 3D 输入补一个单例模态轴.
fn into_4d<T>(data: ArrayD<T>) -> Result<Array4<T>, VolumeError> {
    let data = match data.ndim() {
        3 => data.insert_axis(Axis(3)),
        4 => data,
        n => return Err(VolumeError::BadRank(n)),
    };
    // 维数已检查, 该转换不会失败.
    let data = data.into_dimensionality::<Ix4>().unwrap();

    let (x, y, z, _) = data.dim();
    if x == 0 || y == 0 || z == 0 {
        return Err(VolumeError::BadShape((x, y, z)));
    }
    Ok(data)
}

/// 从文件路径推导扫描名: 取文件名并剥掉 `.nii` / `.nii.gz` 后缀.
fn scan_name_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    name.trim_end_matches(".gz")
        .trim_end_matches(".nii")
        .to_owned()
}

/// nii 格式多模态 MRI 扫描, 包括 header 和强度数据. 强度值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct MriScan {
    header: BoxedHeader,
    data: Array4<f32>,
    name: String,
}

impl NiftiHeaderAttr for MriScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        let (x, y, z, _) = self.data.dim();
        (x, y, z)
    }

    #[inline]
    fn modality_len(&self) -> usize {
        self.data.len_of(Axis(3))
    }
}

impl MriScan {
    /// 打开 nii 文件格式的 3D/4D MRI 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let path = path.as_ref();
        let obj = ReaderOptions::new().read_file(path)?;
        let header = Box::new(obj.header().clone());
        let data = into_4d(obj.into_volume().into_ndarray::<f32>()?)?;

        Ok(Self {
            header,
            data,
            name: scan_name_of(path),
        })
    }

    /// 根据裸数据直接创建实体. 仅用于测试或上游已持有数组的场景.
    ///
    /// 如果任一空间轴长度为零, 则程序 panic.
    pub fn from_array(data: Array4<f32>, name: impl Into<String>) -> Self {
        let (x, y, z, _) = data.dim();
        assert!(x > 0 && y > 0 && z > 0, "空间轴长度必须为正");
        Self {
            header: BoxedHeader::default(),
            data,
            name: name.into(),
        }
    }

    /// 扫描名, 由文件名剥掉 nifti 后缀得到. 用作输出目录名.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 提取 `axis` 轴第 `index` 层、第 `modality` 模态的切片.
    ///
    /// 任一索引越界时返回 `None`, 不会 panic.
    #[inline]
    pub fn slice_at(&self, axis: Axis3, index: usize, modality: usize) -> Option<ScanSlice> {
        slice_view(&self.data, axis, index, modality).map(|v| ScanSlice::new(v.to_owned()))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }
}

/// nii 格式多通道掩码体 (例如先前导出的分割结果), 标签值以 `u8` 保存.
///
/// 每个通道对应一个被追踪对象, 用于视图层按通道切换显示.
#[derive(Debug, Clone)]
pub struct MaskVolume {
    header: BoxedHeader,
    data: Array4<u8>,
}

impl NiftiHeaderAttr for MaskVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        let (x, y, z, _) = self.data.dim();
        (x, y, z)
    }

    #[inline]
    fn modality_len(&self) -> usize {
        self.data.len_of(Axis(3))
    }
}

impl MaskVolume {
    /// 打开 nii 文件格式的掩码体. 3D 输入同样补一个单例通道轴.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = into_4d(obj.into_volume().into_ndarray::<u8>()?)?;
        Ok(Self { header, data })
    }

    /// 掩码通道个数. 与 [`NiftiHeaderAttr::modality_len`] 同义,
    /// 但在掩码语境下名称更直观.
    #[inline]
    pub fn channel_len(&self) -> usize {
        self.modality_len()
    }

    /// 提取 `axis` 轴第 `index` 层、第 `channel` 通道的掩码切片视图.
    ///
    /// 任一索引越界时返回 `None`, 不会 panic.
    #[inline]
    pub fn slice_at(&self, axis: Axis3, index: usize, channel: usize) -> Option<ArrayView2<'_, u8>> {
        slice_view(&self.data, axis, index, channel)
    }
}
