//! 通用常量.

/// 单通道颜色与掩码像素值.
pub mod gray {
    /// 掩码中背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 掩码中前景 (目标对象) 的像素值.
    pub const MASK_FOREGROUND: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        matches!(p, MASK_FOREGROUND)
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }
}

/// 三通道颜色.
pub mod rgb {
    /// 叠加图中掩码前景的半透明填充色 (偏蓝).
    pub const OVERLAY_FILL: [u8; 3] = [30, 144, 255];

    /// 正种子点标记色 (绿).
    pub const SEED_POSITIVE: [u8; 3] = [0, 255, 0];

    /// 负种子点标记色 (红).
    pub const SEED_NEGATIVE: [u8; 3] = [255, 0, 0];
}

/// BraTS 风格扫描的画布边长: 240 x 240.
pub const BRATS_CANVAS: crate::Idx2d = (240, 240);

/// BraTS 风格扫描的切片张数, 也是导出标签体的固定深度.
pub const BRATS_DEPTH: usize = 155;

/// 导出标签体的默认目标形状.
pub const BRATS_VOLUME: crate::Idx3d = (240, 240, 155);

/// 帧序列可识别的图像扩展名 (小写).
pub const FRAME_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// 原始帧的默认编码扩展名.
pub const FRAME_DEFAULT_EXT: &str = "jpeg";
