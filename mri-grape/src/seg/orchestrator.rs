//! 传播编排: 以 (轴, 种子组, 模态) 为单位驱动模型会话.

use super::{FrameSequence, MaskAssembler, UnitError, VideoPredictor};
use crate::{Axis3, MaskSlice, Progress, SeedGroup, SliceCodec};
use std::fmt;
use std::path::PathBuf;

/// 每个种子组在其会话内使用的逻辑对象 id.
///
/// 不同种子组使用互相独立的会话, 因此合法地共用同一个 id, 互不冲突;
/// 组间在重组阶段按后写者胜解决重叠.
pub const GROUP_OBJECT_ID: u32 = 1;

/// 一次编排推进到的阶段. 用于日志与失败定位.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunPhase {
    /// 尚未开始.
    Idle,

    /// 帧序列枚举完毕.
    FramesEnumerated,

    /// 锚帧定位成功.
    SeedAnchorResolved,

    /// 正在向前传播 (帧位置递增).
    PropagatingForward,

    /// 正在向后传播 (帧位置递减).
    PropagatingBackward,

    /// 全部记录已重组为标签体.
    Assembled,

    /// 标签体已序列化落盘. 成功终态.
    Exported,

    /// 前置条件或运行中错误导致中止. 失败终态, 原因见所在单元的 `Result`.
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunPhase::Idle => "idle",
            RunPhase::FramesEnumerated => "frames-enumerated",
            RunPhase::SeedAnchorResolved => "seed-anchor-resolved",
            RunPhase::PropagatingForward => "propagating-forward",
            RunPhase::PropagatingBackward => "propagating-backward",
            RunPhase::Assembled => "assembled",
            RunPhase::Exported => "exported",
            RunPhase::Failed => "failed",
        })
    }
}

/// 编排单元的标识: (轴, 种子组所在切片, 模态).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct UnitKey {
    /// 空间轴.
    pub axis: Axis3,

    /// 种子组所在切片索引.
    pub slice_index: usize,

    /// 模态通道.
    pub modality: usize,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "轴 {} / 切片 {} / 模态 {}",
            self.axis, self.slice_index, self.modality
        )
    }
}

/// 单个编排单元的执行结果.
#[derive(Debug)]
pub struct UnitReport {
    /// 单元标识.
    pub key: UnitKey,

    /// 单元推进到的最后阶段. 失败时为 [`RunPhase::Failed`].
    pub phase: RunPhase,

    /// 成功时为产出的帧结果个数, 失败时为原因.
    pub result: Result<usize, UnitError>,
}

impl UnitReport {
    /// 单元是否成功?
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 一次完整编排 (全部单元 + 重组导出) 的产出.
#[derive(Debug)]
pub struct RunOutcome {
    /// 各单元报告, 按执行顺序排列.
    pub reports: Vec<UnitReport>,

    /// 导出的 nifti 文件路径.
    pub volumes: Vec<PathBuf>,
}

impl RunOutcome {
    /// 成功单元个数.
    #[inline]
    pub fn ok_len(&self) -> usize {
        self.reports.iter().filter(|r| r.is_ok()).count()
    }
}

/// 传播编排器.
///
/// 对每个 (轴, 种子组, 模态 `m ∈ [1, 模态数)`) 单元: 枚举帧序列并按数值排序,
/// 建立会话, 定位锚帧, 联合播种整组点, 先向前后向后收集逐帧掩码,
/// 并把每帧产物交给 [`MaskAssembler`]. 模态 0 是不参与分割的参考通道, 跳过.
///
/// 单元之间完全独立: 既不共享会话状态, 也不共享对象 id 空间;
/// 一个单元失败只中止它自己.
pub struct Orchestrator<'p, P: VideoPredictor> {
    predictor: &'p P,
    scan_dir: PathBuf,
}

impl<'p, P: VideoPredictor> Orchestrator<'p, P> {
    /// 以模型与扫描目录 (`<输出根>/<扫描名>`) 初始化.
    pub fn new(predictor: &'p P, scan_dir: impl Into<PathBuf>) -> Self {
        Self {
            predictor,
            scan_dir: scan_dir.into(),
        }
    }

    /// 顺序执行全部编排单元. 每完成一个单元, `progress` 回调一次
    /// (已完成数, 单元总数). 单元失败记入报告后继续执行兄弟单元.
    pub fn run_units(
        &self,
        groups: &[SeedGroup],
        modality_len: usize,
        assembler: &mut MaskAssembler,
        mut progress: Option<Progress>,
    ) -> Vec<UnitReport> {
        let total = groups.len() * modality_len.saturating_sub(1);
        let mut reports = Vec::with_capacity(total);

        for group in groups {
            for modality in 1..modality_len {
                let key = UnitKey {
                    axis: group.axis,
                    slice_index: group.slice_index,
                    modality,
                };
                let mut phase = RunPhase::Idle;
                let result = self.run_unit(group, modality, assembler, &mut phase);
                match &result {
                    Ok(frames) => {
                        log::info!("单元 [{key}] 完成: 产出 {frames} 帧结果 ({phase})");
                    }
                    Err(e) => {
                        log::warn!("单元 [{key}] 在 {phase} 阶段失败: {e}");
                        phase = RunPhase::Failed;
                    }
                }
                reports.push(UnitReport { key, phase, result });
                if let Some(cb) = progress.as_mut() {
                    cb(reports.len(), total);
                }
            }
        }
        reports
    }

    /// 执行全部单元并重组导出, 即一次端到端编排.
    pub fn run_and_export(
        &self,
        groups: &[SeedGroup],
        modality_len: usize,
        assembler: &mut MaskAssembler,
        progress: Option<Progress>,
    ) -> Result<RunOutcome, super::ExportError> {
        let reports = self.run_units(groups, modality_len, assembler, progress);
        log::debug!("全部单元执行完毕, 进入 {}", RunPhase::Assembled);
        let volumes = assembler.assemble_and_export()?;
        log::info!("编排结束: {} (共 {} 个标签体)", RunPhase::Exported, volumes.len());
        Ok(RunOutcome { reports, volumes })
    }

    /// 执行单个编排单元, 返回产出的帧结果个数.
    fn run_unit(
        &self,
        group: &SeedGroup,
        modality: usize,
        assembler: &mut MaskAssembler,
        phase: &mut RunPhase,
    ) -> Result<usize, UnitError> {
        if group.is_empty() {
            return Err(UnitError::EmptySeedGroup);
        }

        let dir = SliceCodec::frames_dir(&self.scan_dir, group.axis, modality);
        let seq = FrameSequence::enumerate(&dir)?;
        if seq.is_empty() {
            return Err(UnitError::EmptyFrames(dir));
        }
        *phase = RunPhase::FramesEnumerated;

        // 锚帧: 文件名主干等于种子组切片索引的帧. 对应切片若全背景
        // 则从未落盘, 播种无从谈起.
        let anchor = seq
            .position_of(group.slice_index)
            .ok_or_else(|| UnitError::MissingAnchor {
                dir: seq.dir().to_owned(),
                slice_index: group.slice_index,
            })?;
        *phase = RunPhase::SeedAnchorResolved;

        let mut session = self.predictor.init_session(seq.dir())?;
        self.predictor.seed(
            &mut session,
            anchor,
            &group.xy(),
            &group.labels(),
            GROUP_OBJECT_ID,
        )?;
        log::debug!(
            "从帧位置 {anchor} (切片 {}) 开始, 共 {} 个种子点",
            group.slice_index,
            group.len()
        );

        let seeds_img = group.image_points();
        let mut produced = 0usize;
        for reverse in [false, true] {
            *phase = if reverse {
                RunPhase::PropagatingBackward
            } else {
                RunPhase::PropagatingForward
            };
            for output in self.predictor.propagate(&mut session, reverse) {
                let output = output?;
                // 已知帧数之外的产出直接停止拉取.
                if output.frame_pos >= seq.len() {
                    break;
                }
                let frame = &seq.frames()[output.frame_pos];
                let multi_object = output.objects.len() > 1;
                for (object_id, logits) in &output.objects {
                    let mask = MaskSlice::from_logits(logits.view());
                    assembler.persist(
                        &mask,
                        group.axis,
                        modality,
                        frame.index,
                        &frame.path,
                        &seeds_img,
                        multi_object.then_some(*object_id),
                    )?;
                    assembler.record(mask, group.axis, modality, frame.index);
                }
                produced += 1;
            }
        }
        Ok(produced)
    }
}
