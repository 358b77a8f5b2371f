//! 视图会话状态.
//!
//! 交互层 (窗口/控件) 之下的显式状态结构: 当前切片索引、当前模态、
//! 掩码通道可见性等都集中于此, 不使用任何全局可变状态.

use crate::{Axis3, Idx3d, NiftiHeaderAttr};

/// 一次浏览会话的全部可变状态.
///
/// 切片索引按轴独立维护, 初始化为各轴的中间切片; 滚动与跳转一律做边界
/// 钳制, 永远不会越界. 掩码通道可见性按通道独立维护, "全部可见" 是
/// 派生量而非独立开关, 因此不存在开关之间互相矛盾的状态.
#[derive(Debug, Clone)]
pub struct ViewState {
    shape: Idx3d,
    modality_len: usize,
    current: [usize; 3],
    modality: usize,
    lock_layers: bool,
    mask_visible: Vec<bool>,
}

impl ViewState {
    /// 从体数据属性初始化: 各轴定位到中间切片, 模态为 0, 不锁定层,
    /// 无掩码通道.
    pub fn new<A: NiftiHeaderAttr>(attr: &A) -> Self {
        Self {
            shape: attr.shape(),
            modality_len: attr.modality_len(),
            current: attr.mid_slices(),
            modality: 0,
            lock_layers: false,
            mask_visible: Vec::new(),
        }
    }

    /// 体数据空间形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.shape
    }

    /// `axis` 轴的当前切片索引.
    #[inline]
    pub fn current_slice(&self, axis: Axis3) -> usize {
        self.current[axis.index()]
    }

    /// `axis` 轴的切片个数.
    #[inline]
    fn axis_len(&self, axis: Axis3) -> usize {
        let (x, y, z) = self.shape;
        [x, y, z][axis.index()]
    }

    /// 在 `axis` 轴上滚动 `delta` 层, 钳制到合法范围.
    ///
    /// 若启用了层锁定, 三个轴同步滚动同样的层数, 各自独立钳制.
    pub fn scroll(&mut self, axis: Axis3, delta: isize) {
        if self.lock_layers {
            for a in Axis3::ALL {
                self.scroll_one(a, delta);
            }
        } else {
            self.scroll_one(axis, delta);
        }
    }

    fn scroll_one(&mut self, axis: Axis3, delta: isize) {
        let max = self.axis_len(axis).saturating_sub(1) as isize;
        let next = (self.current[axis.index()] as isize + delta).clamp(0, max);
        self.current[axis.index()] = next as usize;
    }

    /// 直接跳转到 `axis` 轴的第 `index` 层, 超出范围时钳制到最后一层.
    #[inline]
    pub fn jump_to(&mut self, axis: Axis3, index: usize) {
        self.current[axis.index()] = index.min(self.axis_len(axis).saturating_sub(1));
    }

    /// 层锁定是否启用?
    #[inline]
    pub fn lock_layers(&self) -> bool {
        self.lock_layers
    }

    /// 切换层锁定.
    #[inline]
    pub fn toggle_lock_layers(&mut self) {
        self.lock_layers = !self.lock_layers;
    }

    /// 当前模态.
    #[inline]
    pub fn modality(&self) -> usize {
        self.modality
    }

    /// 切换到第 `modality` 个模态. 越界时忽略并返回 `false`.
    pub fn set_modality(&mut self, modality: usize) -> bool {
        if modality >= self.modality_len {
            return false;
        }
        self.modality = modality;
        true
    }

    /// 声明掩码通道个数, 全部初始化为可见.
    ///
    /// 加载新的掩码体后调用; 旧的可见性设置随之失效.
    pub fn set_mask_channel_len(&mut self, len: usize) {
        self.mask_visible = vec![true; len];
    }

    /// 掩码通道个数.
    #[inline]
    pub fn mask_channel_len(&self) -> usize {
        self.mask_visible.len()
    }

    /// 第 `channel` 个掩码通道是否可见? 越界视为不可见.
    #[inline]
    pub fn mask_visible(&self, channel: usize) -> bool {
        self.mask_visible.get(channel).copied().unwrap_or(false)
    }

    /// 切换第 `channel` 个掩码通道的可见性. 越界时忽略.
    pub fn toggle_mask(&mut self, channel: usize) {
        if let Some(v) = self.mask_visible.get_mut(channel) {
            *v = !*v;
        }
    }

    /// 是否全部掩码通道可见? 这是各通道状态的派生量.
    ///
    /// 没有任何掩码通道时返回 `false`.
    #[inline]
    pub fn all_masks_visible(&self) -> bool {
        !self.mask_visible.is_empty() && self.mask_visible.iter().all(|&v| v)
    }

    /// 将全部掩码通道设为可见或不可见.
    pub fn set_all_masks(&mut self, visible: bool) {
        self.mask_visible.fill(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::ViewState;
    use crate::{Axis3, MriScan};
    use ndarray::Array4;

    fn view_of(shape: (usize, usize, usize, usize)) -> ViewState {
        ViewState::new(&MriScan::from_array(Array4::zeros(shape), "t"))
    }

    #[test]
    fn test_init_at_mid_slices() {
        let view = view_of((10, 20, 31, 2));
        assert_eq!(view.current_slice(Axis3::X), 5);
        assert_eq!(view.current_slice(Axis3::Y), 10);
        assert_eq!(view.current_slice(Axis3::Z), 15);
        assert_eq!(view.modality(), 0);
    }

    #[test]
    fn test_scroll_clamped() {
        let mut view = view_of((10, 10, 10, 1));
        view.scroll(Axis3::Z, 100);
        assert_eq!(view.current_slice(Axis3::Z), 9);
        view.scroll(Axis3::Z, -100);
        assert_eq!(view.current_slice(Axis3::Z), 0);
        // 其余轴不受影响.
        assert_eq!(view.current_slice(Axis3::X), 5);

        view.jump_to(Axis3::Y, 9999);
        assert_eq!(view.current_slice(Axis3::Y), 9);
    }

    #[test]
    fn test_lock_layers_scrolls_together() {
        let mut view = view_of((4, 10, 10, 1));
        view.toggle_lock_layers();
        view.scroll(Axis3::Z, 3);
        assert_eq!(view.current_slice(Axis3::Z), 8);
        assert_eq!(view.current_slice(Axis3::Y), 8);
        // 短轴钳制在末层.
        assert_eq!(view.current_slice(Axis3::X), 3);
    }

    #[test]
    fn test_modality_switch_bounds() {
        let mut view = view_of((4, 4, 4, 3));
        assert!(view.set_modality(2));
        assert_eq!(view.modality(), 2);
        assert!(!view.set_modality(3));
        assert_eq!(view.modality(), 2);
    }

    #[test]
    fn test_mask_visibility_is_per_channel() {
        let mut view = view_of((4, 4, 4, 1));
        assert!(!view.all_masks_visible());

        view.set_mask_channel_len(3);
        assert!(view.all_masks_visible());

        view.toggle_mask(1);
        assert!(!view.mask_visible(1));
        assert!(view.mask_visible(0) && view.mask_visible(2));
        assert!(!view.all_masks_visible());

        view.toggle_mask(1);
        assert!(view.all_masks_visible());

        view.set_all_masks(false);
        assert!((0..3).all(|c| !view.mask_visible(c)));

        // 越界操作被忽略.
        view.toggle_mask(99);
        assert!(!view.mask_visible(99));
    }
}
