//! 帧序列的枚举与排序.

use crate::consts::FRAME_EXTENSIONS;
use std::fs;
use std::path::{Path, PathBuf};

/// 帧序列中的一个帧文件.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FrameFile {
    /// 帧对应的切片索引, 由文件名主干解析得到.
    pub index: usize,

    /// 帧文件路径.
    pub path: PathBuf,
}

/// 一个帧目录内所有可识别的帧, 按切片索引升序排列.
///
/// 全背景切片在导出时被跳过, 因此索引允许不连续;
/// 序列位置 (0 起) 与切片索引的映射由本结构维护.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    dir: PathBuf,
    frames: Vec<FrameFile>,
}

impl FrameSequence {
    /// 枚举 `dir` 下的帧文件.
    ///
    /// 只保留扩展名可识别 (忽略大小写) 且文件名主干为十进制整数的文件,
    /// 并按主干的 **数值** 排序 -- 字符串序会把 `10` 排到 `2` 之前.
    /// 其余文件忽略并记一条 warn 日志.
    pub fn enumerate(dir: &Path) -> std::io::Result<Self> {
        let mut frames = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            match stem.parse::<usize>() {
                Ok(index) => frames.push(FrameFile { index, path }),
                Err(_) => log::warn!("忽略无法解析索引的帧文件: {}", path.display()),
            }
        }
        frames.sort_by_key(|f| f.index);

        Ok(Self {
            dir: dir.to_owned(),
            frames,
        })
    }

    /// 帧目录.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 帧个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// 序列是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 全部帧, 按切片索引升序.
    #[inline]
    pub fn frames(&self) -> &[FrameFile] {
        self.frames.as_slice()
    }

    /// 切片索引为 `slice_index` 的帧在序列中的位置.
    ///
    /// 对应切片全背景、从未落盘时返回 `None`.
    #[inline]
    pub fn position_of(&self, slice_index: usize) -> Option<usize> {
        self.frames
            .binary_search_by_key(&slice_index, |f| f.index)
            .ok()
    }
}
