//! 🍇欢迎光临🍇
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d, Progress};

pub use crate::data::{
    Axis3, Canvas, MaskSlice, MaskVolume, MriScan, NiftiHeaderAttr, ScanSlice, VolumeError,
};

pub use crate::data::save::{ImgWriteRaw, ImgWriteVis};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
pub use crate::consts::{BRATS_CANVAS, BRATS_DEPTH, BRATS_VOLUME};

pub use crate::annot::{AnnotationStore, Polarity, SeedGroup, SeedPoint};
pub use crate::codec::{ExportStats, SliceCodec};
pub use crate::seg::{MaskAssembler, Orchestrator, RunOutcome, VideoPredictor};
pub use crate::view::ViewState;
