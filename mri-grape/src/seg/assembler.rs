//! 逐帧掩码的持久化与标签体重组.

use super::{ExportError, PersistError};
use crate::data::save::{save_overlay, ImgWriteVis};
use crate::{Axis3, Idx3d, MaskSlice, Polarity};
use itertools::Itertools;
use ndarray::{s, Array2, Array3};
use nifti::writer::WriterOptions;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 重组键: (轴, 模态).
pub type AssemblyKey = (Axis3, usize);

/// 掩码装配器: 逐帧掩码的落盘端与 (轴, 模态) 标签体的重组端.
///
/// 逐帧产物写入 `<扫描目录>/modality_<m>/masks_<轴>/`, 文件名为 4 位零填充的
/// 帧索引 (保证字典序即数值序), 追踪多对象时附加对象 id 后缀以避免碰撞.
/// 重组结果写入 `<扫描目录>/nifti_outputs/<轴>_modality_<m>.nii.gz`.
///
/// 内存中的记录表只由本结构追加和读取; 单线程管线下无须加锁.
#[derive(Debug)]
pub struct MaskAssembler {
    scan_dir: PathBuf,
    target: Idx3d,
    recorded: BTreeMap<AssemblyKey, Vec<(usize, Array2<u8>)>>,
}

impl MaskAssembler {
    /// 以扫描目录和目标标签体形状初始化.
    pub fn new(scan_dir: impl Into<PathBuf>, target: Idx3d) -> Self {
        Self {
            scan_dir: scan_dir.into(),
            target,
            recorded: BTreeMap::new(),
        }
    }

    /// 以 BraTS 默认目标形状 (240, 240, 155) 初始化.
    #[inline]
    pub fn with_brats_target(scan_dir: impl Into<PathBuf>) -> Self {
        Self::new(scan_dir, crate::consts::BRATS_VOLUME)
    }

    /// 目标标签体形状.
    #[inline]
    pub fn target(&self) -> Idx3d {
        self.target
    }

    /// `axis` 轴、`modality` 模态的掩码输出目录.
    pub fn masks_dir(&self, axis: Axis3, modality: usize) -> PathBuf {
        self.scan_dir
            .join(format!("modality_{modality}"))
            .join(format!("masks_{axis}"))
    }

    /// 把一帧掩码写成三份产物: 裸 npy 数组、黑白可视化图、
    /// 以及叠加在源帧上并画出种子点的合成图.
    ///
    /// `object_id` 为 `Some` 时文件名附加 `_<id>` 后缀 (多对象场景).
    /// `seeds` 采用图像坐标系, 见 [`crate::SeedGroup::image_points`].
    pub fn persist(
        &self,
        mask: &MaskSlice,
        axis: Axis3,
        modality: usize,
        frame_index: usize,
        source_frame: &Path,
        seeds: &[(usize, usize, Polarity)],
        object_id: Option<u32>,
    ) -> Result<(), PersistError> {
        let dir = self.masks_dir(axis, modality);
        fs::create_dir_all(&dir)?;

        let stem = match object_id {
            Some(id) => format!("{frame_index:04}_{id}"),
            None => format!("{frame_index:04}"),
        };

        ndarray_npy::write_npy(dir.join(format!("{stem}.npy")), &mask.data())?;
        mask.save(dir.join(format!("{stem}.jpeg")))?;
        save_overlay(
            source_frame,
            mask,
            seeds,
            dir.join(format!("{stem}_overlay_with_points.jpeg")),
        )?;
        Ok(())
    }

    /// 把一帧掩码追加进内存记录表, 供之后重组.
    ///
    /// 同一索引允许被记录多次, 重组时按排序后顺序覆写, 后写者胜.
    pub fn record(&mut self, mask: MaskSlice, axis: Axis3, modality: usize, frame_index: usize) {
        self.recorded
            .entry((axis, modality))
            .or_default()
            .push((frame_index, mask.data().to_owned()));
    }

    /// 已记录的全部 (轴, 模态) 键, 升序.
    pub fn keys(&self) -> Vec<AssemblyKey> {
        self.recorded.keys().copied().collect()
    }

    /// 键 `key` 下已记录的帧数 (含重复索引).
    #[inline]
    pub fn recorded_len(&self, key: AssemblyKey) -> usize {
        self.recorded.get(&key).map_or(0, Vec::len)
    }

    /// 把键 `key` 下的记录重组为一个目标形状的稠密标签体.
    ///
    /// 记录按帧索引稳定排序后逐个写入第三维的对应层; 未覆盖的层保持为零;
    /// 同一索引的多条记录互相覆写 (后写者胜); 超出目标深度的索引丢弃,
    /// 不报错 -- 这是可接受的有损行为.
    pub fn assemble(&self, key: AssemblyKey) -> Result<Option<Array3<u8>>, ExportError> {
        let Some(entries) = self.recorded.get(&key) else {
            return Ok(None);
        };
        let (height, width, depth) = self.target;
        let mut volume = Array3::<u8>::zeros(self.target);

        // 稳定排序: 同一索引的记录保持插入顺序, 从而 "后写者胜" 是确定的.
        for (index, mask) in entries.iter().sorted_by_key(|(index, _)| *index) {
            if mask.dim() != (height, width) {
                let (axis, modality) = key;
                return Err(ExportError::ShapeMismatch {
                    axis,
                    modality,
                    got: mask.dim(),
                    expected: (height, width),
                });
            }
            if *index >= depth {
                log::warn!("丢弃超出目标深度 {depth} 的帧 {index} (key: {key:?})");
                continue;
            }
            volume.slice_mut(s![.., .., *index]).assign(mask);
        }
        Ok(Some(volume))
    }

    /// 重组并导出所有键对应的标签体, 返回写出的 nifti 文件路径.
    ///
    /// 输出使用恒等仿射矩阵: 导出物是派生掩码, 不是临床配准图像.
    pub fn assemble_and_export(&self) -> Result<Vec<PathBuf>, ExportError> {
        let out_dir = self.scan_dir.join("nifti_outputs");
        fs::create_dir_all(&out_dir)?;

        let mut written = Vec::with_capacity(self.recorded.len());
        for key in self.keys() {
            // keys 来自记录表, assemble 必然命中.
            let volume = self.assemble(key)?.unwrap();
            let (axis, modality) = key;
            let path = out_dir.join(format!("{axis}_modality_{modality}.nii.gz"));
            WriterOptions::new(&path).write_nifti(&volume)?;
            log::info!("已保存 nifti 文件: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::gray::MASK_FOREGROUND;

    fn mask_with(shape: (usize, usize), fg: &[(usize, usize)]) -> MaskSlice {
        let mut raw = Array2::<u8>::zeros(shape);
        for &pos in fg {
            raw[pos] = MASK_FOREGROUND;
        }
        MaskSlice::new(raw)
    }

    #[test]
    fn test_assemble_places_masks_by_index() {
        let mut asm = MaskAssembler::new("unused", (4, 4, 6));
        asm.record(mask_with((4, 4), &[(1, 1)]), Axis3::Z, 1, 0);
        asm.record(mask_with((4, 4), &[(2, 3)]), Axis3::Z, 1, 5);

        let vol = asm.assemble((Axis3::Z, 1)).unwrap().unwrap();
        assert_eq!(vol.dim(), (4, 4, 6));
        assert_eq!(vol[(1, 1, 0)], 1);
        assert_eq!(vol[(2, 3, 5)], 1);
        assert_eq!(vol.iter().filter(|&&v| v != 0).count(), 2);

        // 未记录的键.
        assert!(asm.assemble((Axis3::X, 1)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_record_last_write_wins() {
        let mut asm = MaskAssembler::new("unused", (4, 4, 3));
        asm.record(mask_with((4, 4), &[(0, 0)]), Axis3::Y, 2, 1);
        asm.record(mask_with((4, 4), &[(3, 3)]), Axis3::Y, 2, 1);

        let vol = asm.assemble((Axis3::Y, 2)).unwrap().unwrap();
        // 后写者胜, 不做任何合并.
        assert_eq!(vol[(0, 0, 1)], 0);
        assert_eq!(vol[(3, 3, 1)], 1);

        // 与只记录最后一次的结果一致.
        let mut once = MaskAssembler::new("unused", (4, 4, 3));
        once.record(mask_with((4, 4), &[(3, 3)]), Axis3::Y, 2, 1);
        assert_eq!(once.assemble((Axis3::Y, 2)).unwrap().unwrap(), vol);
    }

    #[test]
    fn test_out_of_depth_index_dropped() {
        let mut asm = MaskAssembler::new("unused", (4, 4, 155));
        asm.record(mask_with((4, 4), &[(0, 0)]), Axis3::Z, 1, 9001);

        // 不 panic, 且导出体中不出现该帧.
        let vol = asm.assemble((Axis3::Z, 1)).unwrap().unwrap();
        assert!(vol.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut asm = MaskAssembler::new("unused", (4, 4, 3));
        asm.record(mask_with((2, 2), &[]), Axis3::Z, 1, 0);
        assert!(matches!(
            asm.assemble((Axis3::Z, 1)),
            Err(ExportError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_persist_writes_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let asm = MaskAssembler::new(dir.path(), (8, 8, 4));

        // 先准备一张源帧.
        let frame = dir.path().join("2.jpeg");
        crate::data::save::save_gray(Array2::<u8>::zeros((8, 8)).view(), &frame).unwrap();

        let mask = mask_with((8, 8), &[(4, 4)]);
        asm.persist(&mask, Axis3::X, 1, 2, &frame, &[(1, 1, Polarity::Positive)], None)
            .unwrap();

        let masks = asm.masks_dir(Axis3::X, 1);
        assert!(masks.join("0002.npy").is_file());
        assert!(masks.join("0002.jpeg").is_file());
        assert!(masks.join("0002_overlay_with_points.jpeg").is_file());

        // 多对象时附加 id 后缀.
        asm.persist(&mask, Axis3::X, 1, 2, &frame, &[], Some(3)).unwrap();
        assert!(masks.join("0002_3.npy").is_file());
    }

    #[test]
    fn test_export_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut asm = MaskAssembler::new(dir.path(), (6, 6, 4));
        asm.record(mask_with((6, 6), &[(2, 2)]), Axis3::Z, 1, 3);

        let written = asm.assemble_and_export().unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("nifti_outputs/z_modality_1.nii.gz"));

        let back = crate::data::MaskVolume::open(&written[0]).unwrap();
        use crate::NiftiHeaderAttr;
        assert_eq!(back.shape(), (6, 6, 4));
        let sli = back.slice_at(Axis3::Z, 3, 0).unwrap();
        assert_eq!(sli[(2, 2)], 1);
    }
}
