//! 图像的持久化存储.

use crate::annot::Polarity;
use crate::consts::gray::{BLACK, MASK_BACKGROUND, MASK_FOREGROUND, WHITE};
use crate::consts::rgb;
use crate::{MaskSlice, ScanSlice};
use image::{ImageResult, Rgb, RgbImage};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好" 的方式保存,
/// 而不是 "as is" 的方式. 对于 [`MaskSlice`] 这类仅存在 0/1 像素值的图像,
/// 保存时会映射到肉眼较易区分的黑/白; 对于 [`ScanSlice`] 这类以原始强度存储的切片,
/// 保存时会做全量程线性归一化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 将一张 8-bit 灰度数组保存到 `path`. 编码格式由扩展名决定.
pub fn save_gray<P: AsRef<Path>>(data: ndarray::ArrayView2<u8>, path: P) -> ImageResult<()> {
    let (height, width) = data.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in data.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
    }
    buf.save(path)
}

/// 全量程归一化后保存.
impl ImgWriteVis for ScanSlice {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        save_gray(self.normalize_u8().view(), path)
    }
}

/// 会将背景/前景像素分别映射为黑色/白色.
impl ImgWriteVis for MaskSlice {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        save_gray(self.data().mapv(pretty).view(), path)
    }
}

/// 按原样存储 (0/1 像素, 肉眼不可分辨).
impl ImgWriteRaw for MaskSlice {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        save_gray(self.data(), path)
    }
}

/// 使像素更有利于单通道可视化.
#[inline]
fn pretty(label: u8) -> u8 {
    match label {
        MASK_BACKGROUND => BLACK,
        MASK_FOREGROUND => WHITE,
        any_else => panic!("只允许掩码存在 0/1 像素, 但发现了 `{any_else}`"),
    }
}

/// 种子点标记的半边长 (像素).
const SEED_MARKER_RADIUS: i64 = 3;

/// 把掩码半透明地叠加到源帧上, 画出种子点标记, 并保存到 `path`.
///
/// 源帧从 `source_frame` 读入; 掩码前景像素与 [`rgb::OVERLAY_FILL`] 各半混合,
/// 种子点按极性画成绿色 (正) / 红色 (负) 实心方块. `seeds` 采用图像坐标系
/// (左上角原点), 与点击捕获时一致.
///
/// 如果掩码与源帧形状不一致, 则程序 panic.
pub fn save_overlay<P: AsRef<Path>>(
    source_frame: &Path,
    mask: &MaskSlice,
    seeds: &[(usize, usize, Polarity)],
    path: P,
) -> ImageResult<()> {
    let mut img: RgbImage = image::open(source_frame)?.to_rgb8();
    let (height, width) = mask.shape();
    assert_eq!(
        (img.height() as usize, img.width() as usize),
        (height, width),
        "掩码与源帧形状不一致"
    );

    for ((h, w), &pix) in mask.data().indexed_iter() {
        if pix == MASK_FOREGROUND {
            let p = img.get_pixel_mut(w as u32, h as u32);
            for (channel, &fill) in p.0.iter_mut().zip(rgb::OVERLAY_FILL.iter()) {
                *channel = ((*channel as u16 + fill as u16) / 2) as u8;
            }
        }
    }

    for &(x, y, polarity) in seeds {
        let color = match polarity {
            Polarity::Positive => rgb::SEED_POSITIVE,
            Polarity::Negative => rgb::SEED_NEGATIVE,
        };
        draw_marker(&mut img, x as i64, y as i64, color);
    }

    img.save(path)
}

/// 以 `(x, y)` 为中心画一个实心方块标记. 超出图像范围的部分直接裁掉.
fn draw_marker(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    for dy in -SEED_MARKER_RADIUS..=SEED_MARKER_RADIUS {
        for dx in -SEED_MARKER_RADIUS..=SEED_MARKER_RADIUS {
            let (px, py) = (x + dx, y + dy);
            if (0..img.width() as i64).contains(&px) && (0..img.height() as i64).contains(&py) {
                img.put_pixel(px as u32, py as u32, Rgb(color));
            }
        }
    }
}
