//! 子设备能力集与边沿触发引用计数
//!
//! ISP、VIN-DVP、VIN-CSI 三种子设备都实现同一组操作,
//! 上层编排只通过 `Subdev` trait 调用它们.

use super::error::Result;
use super::pad::{MbusFormat, Rect, SelectionTarget, Which};

/// 子设备种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdevKind {
    Isp,
    VinDvp,
    VinCsi,
}

/// 子设备能力集
pub trait Subdev {
    /// 子设备种类
    fn kind(&self) -> SubdevKind;

    /// 读取 pad 格式
    fn get_format(&self, pad: u32, which: Which) -> Result<MbusFormat>;

    /// 设置 pad 格式, 返回实际生效的格式
    fn set_format(&self, pad: u32, format: MbusFormat, which: Which) -> Result<MbusFormat>;

    /// 读取 selection 矩形
    fn get_selection(&self, pad: u32, target: SelectionTarget, which: Which) -> Result<Rect>;

    /// 设置 selection 矩形, 返回实际生效的矩形
    fn set_selection(
        &self,
        pad: u32,
        target: SelectionTarget,
        rect: Rect,
        which: Which,
    ) -> Result<Rect>;

    /// 开 / 关数据流
    fn set_stream(&self, enable: bool) -> Result<()>;
}

/// 引用计数变化的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 0→1 或 1→0, 已执行硬件动作; 携带新的计数
    Edge(u32),
    /// 中间计数变化, 不触碰硬件
    Counted(u32),
    /// 计数已为 0 时的释放请求
    Idle,
}

/// 边沿触发的引用计数
///
/// 只在 0→1 与 1→0 时执行硬件动作. 调用者负责用锁保护.
#[derive(Debug, Default)]
pub struct RefCount {
    count: u32,
}

impl RefCount {
    pub const fn new() -> Self {
        RefCount { count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    /// 增加计数; 0→1 时先执行 `first`, 失败则计数不变
    pub fn get<F>(&mut self, first: F) -> Result<Transition>
    where
        F: FnOnce() -> Result<()>,
    {
        if self.count == 0 {
            first()?;
            self.count = 1;
            Ok(Transition::Edge(1))
        } else {
            self.count += 1;
            Ok(Transition::Counted(self.count))
        }
    }

    /// 减少计数; 1→0 时执行 `last`
    pub fn put<F>(&mut self, last: F) -> Transition
    where
        F: FnOnce(),
    {
        match self.count {
            0 => Transition::Idle,
            1 => {
                last();
                self.count = 0;
                Transition::Edge(0)
            }
            _ => {
                self.count -= 1;
                Transition::Counted(self.count)
            }
        }
    }
}
