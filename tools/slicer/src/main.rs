//! 命令行切片导出工具: 把一个 nifti 扫描导出为逐轴、逐模态的帧序列.

use clap::Parser;
use mri_grape::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(about = "把 3D/4D MRI nifti 扫描导出为帧序列", version)]
struct Args {
    /// 输入 nifti 文件 (.nii / .nii.gz).
    input: PathBuf,

    /// 输出根目录. 帧序列写入 `<output>/<扫描名>/modality_<m>/scans_<轴>/`.
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// 画布高度 (像素).
    #[arg(long, default_value_t = BRATS_CANVAS.0)]
    height: usize,

    /// 画布宽度 (像素).
    #[arg(long, default_value_t = BRATS_CANVAS.1)]
    width: usize,

    /// 输出更详细的日志.
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<ExportStats, Box<dyn std::error::Error>> {
    let scan = MriScan::open(&args.input)?;
    log::info!(
        "已打开扫描 `{}`: 空间形状 {:?}, {} 个模态",
        scan.name(),
        scan.shape(),
        scan.modality_len()
    );

    let canvas = Canvas::new(args.height, args.width)
        .ok_or_else(|| format!("非法画布: {}x{}", args.height, args.width))?;
    let codec = SliceCodec::new(canvas);

    let mut last_percent = usize::MAX;
    let mut progress = |done: usize, total: usize| {
        let percent = done * 100 / total;
        if percent != last_percent && percent % 10 == 0 {
            log::info!("导出进度: {percent}% ({done}/{total})");
            last_percent = percent;
        }
    };
    let stats = codec.export_scan(&scan, &args.output, Some(&mut progress))?;
    Ok(stats)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .unwrap();

    match run(&args) {
        Ok(stats) => {
            println!(
                "完成: 落盘 {} 帧, 跳过 {} 张全背景切片",
                stats.written, stats.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("导出失败: {e}");
            ExitCode::FAILURE
        }
    }
}
