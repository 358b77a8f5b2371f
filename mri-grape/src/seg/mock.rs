//! 确定性的模型测试替身.
//!
//! 对每个正种子点, 在其周围画一个 5x5 的前景方块; 向前从锚帧产出到序列尾,
//! 向后从锚帧产出到序列头. 可配置越界产出与播种失败, 以便测试消费方的
//! 停止与错误处理逻辑.

use super::{FrameOutput, FrameSequence, PredictError, VideoPredictor};
use crate::Idx2d;
use ndarray::Array2;
use std::path::Path;

pub(crate) struct MockPredictor {
    canvas: Idx2d,

    /// 超出已知帧数后继续产出的帧个数.
    pub overshoot: usize,

    /// 播种时直接报错.
    pub fail_on_seed: bool,
}

impl MockPredictor {
    pub fn new(canvas: Idx2d) -> Self {
        Self {
            canvas,
            overshoot: 0,
            fail_on_seed: false,
        }
    }

    /// 以正种子点为中心铺前景方块, 其余为负 logits.
    fn logits_for(&self, session: &MockSession) -> Array2<f32> {
        let (h, w) = self.canvas;
        let mut logits = Array2::from_elem((h, w), -1.0_f32);
        for &(x, y) in &session.positives {
            // 种子点为模型坐标系 (左下原点), 行号 = H - y.
            let (row, col) = (h as i64 - y as i64, x as i64);
            for dr in -2..=2_i64 {
                for dc in -2..=2_i64 {
                    let (r, c) = (row + dr, col + dc);
                    if (0..h as i64).contains(&r) && (0..w as i64).contains(&c) {
                        logits[(r as usize, c as usize)] = 1.0;
                    }
                }
            }
        }
        logits
    }
}

pub(crate) struct MockSession {
    frame_len: usize,
    anchor: Option<usize>,
    positives: Vec<(f32, f32)>,
    object_id: u32,
}

impl VideoPredictor for MockPredictor {
    type Session = MockSession;

    fn init_session(&self, frames_dir: &Path) -> Result<MockSession, PredictError> {
        let seq =
            FrameSequence::enumerate(frames_dir).map_err(|e| PredictError(e.to_string()))?;
        Ok(MockSession {
            frame_len: seq.len(),
            anchor: None,
            positives: Vec::new(),
            object_id: 0,
        })
    }

    fn seed(
        &self,
        session: &mut MockSession,
        frame_pos: usize,
        points: &[(f32, f32)],
        labels: &[u8],
        object_id: u32,
    ) -> Result<(), PredictError> {
        if self.fail_on_seed {
            return Err(PredictError("种子提交被拒".into()));
        }
        assert_eq!(points.len(), labels.len());
        session.anchor = Some(frame_pos);
        session.object_id = object_id;
        session.positives = points
            .iter()
            .zip(labels)
            .filter_map(|(&p, &l)| (l == 1).then_some(p))
            .collect();
        Ok(())
    }

    fn propagate<'s>(
        &'s self,
        session: &'s mut MockSession,
        reverse: bool,
    ) -> Box<dyn Iterator<Item = Result<FrameOutput, PredictError>> + 's> {
        let anchor = session.anchor.expect("必须先播种再传播");
        let logits = self.logits_for(session);
        let object_id = session.object_id;

        let positions: Vec<usize> = if reverse {
            (0..=anchor).rev().collect()
        } else {
            (anchor..session.frame_len + self.overshoot).collect()
        };
        Box::new(positions.into_iter().map(move |frame_pos| {
            Ok(FrameOutput {
                frame_pos,
                objects: vec![(object_id, logits.clone())],
            })
        }))
    }
}
