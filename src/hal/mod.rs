//! 硬件协作者抽象
//!
//! CAMSS 核心本身不做任何裸 I/O, 所有硬件访问都经过这里的 trait:
//! - 寄存器访问 (read/write/set_bits)
//! - 时钟 / 复位 / 电源域
//! - 下游缓冲队列 (change_buffer / buffer_done)
//! - 事件通知
//! - 固件 (setfile) 获取
//! - 延时

pub mod mmio;

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::drivers::camss::error::Result;
use crate::drivers::camss::{ClkId, LineId, RstId, SubdevEvent};

/// 32 位寄存器块访问
///
/// 偏移量为寄存器块内的字节偏移. 实现必须是内部可变的 (MMIO 本身即如此),
/// 以便 ISP 与 VIN 共享同一寄存器块.
pub trait RegisterAccess {
    /// 读取寄存器
    fn read32(&self, offset: u32) -> u32;

    /// 写入寄存器
    fn write32(&self, offset: u32, value: u32);

    /// 读-改-写: 仅更新 `mask` 覆盖的位
    fn set_bits32(&self, offset: u32, mask: u32, value: u32) {
        let old = self.read32(offset);
        self.write32(offset, (old & !mask) | (value & mask));
    }

    /// 置位
    fn set32(&self, offset: u32, bits: u32) {
        self.set_bits32(offset, bits, bits);
    }

    /// 清位
    fn clear32(&self, offset: u32, bits: u32) {
        self.set_bits32(offset, bits, 0);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read32(&self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: u32, value: u32) {
        (**self).write32(offset, value)
    }

    fn set_bits32(&self, offset: u32, mask: u32, value: u32) {
        (**self).set_bits32(offset, mask, value)
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for Arc<T> {
    fn read32(&self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: u32, value: u32) {
        (**self).write32(offset, value)
    }

    fn set_bits32(&self, offset: u32, mask: u32, value: u32) {
        (**self).set_bits32(offset, mask, value)
    }
}

/// 时钟 / 复位 / 电源域控制
///
/// 引用计数的边沿语义由 CAMSS 核心负责, 这里只做实际的开关动作.
pub trait ClockControl {
    /// 使能时钟
    fn enable_clock(&self, clk: ClkId) -> Result<()>;

    /// 关闭时钟
    fn disable_clock(&self, clk: ClkId);

    /// 设置时钟频率 (Hz)
    fn set_rate(&self, clk: ClkId, rate: u64) -> Result<()>;

    /// 切换时钟父节点
    fn set_parent(&self, clk: ClkId, parent: ClkId) -> Result<()>;

    /// 拉起复位
    fn assert_reset(&self, rst: RstId);

    /// 释放复位
    fn deassert_reset(&self, rst: RstId);

    /// 电源域上电
    fn power_on(&self);

    /// 电源域下电
    fn power_off(&self);
}

impl<T: ClockControl + ?Sized> ClockControl for Arc<T> {
    fn enable_clock(&self, clk: ClkId) -> Result<()> {
        (**self).enable_clock(clk)
    }

    fn disable_clock(&self, clk: ClkId) {
        (**self).disable_clock(clk)
    }

    fn set_rate(&self, clk: ClkId, rate: u64) -> Result<()> {
        (**self).set_rate(clk, rate)
    }

    fn set_parent(&self, clk: ClkId, parent: ClkId) -> Result<()> {
        (**self).set_parent(clk, parent)
    }

    fn assert_reset(&self, rst: RstId) {
        (**self).assert_reset(rst)
    }

    fn deassert_reset(&self, rst: RstId) {
        (**self).deassert_reset(rst)
    }

    fn power_on(&self) {
        (**self).power_on()
    }

    fn power_off(&self) {
        (**self).power_off()
    }
}

/// 下游视频缓冲队列
///
/// 核心不管理缓冲内存, 只决定何时调用这两个操作.
pub trait BufferQueue {
    /// 换入下一个已排队的缓冲
    fn change_buffer(&self, line: LineId);

    /// 完成刚结束的缓冲 (打时间戳并放入完成队列)
    fn buffer_done(&self, line: LineId);
}

impl<T: BufferQueue + ?Sized> BufferQueue for Arc<T> {
    fn change_buffer(&self, line: LineId) {
        (**self).change_buffer(line)
    }

    fn buffer_done(&self, line: LineId) {
        (**self).buffer_done(line)
    }
}

/// 事件通知接收端
pub trait EventSink {
    fn notify(&self, event: SubdevEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn notify(&self, event: SubdevEvent) {
        (**self).notify(event)
    }
}

/// 固件获取 (按名字)
pub trait FirmwareSource {
    fn request_firmware(&self, name: &str) -> Result<Vec<u8>>;
}

/// 毫秒级延时
pub trait Delay {
    fn delay_ms(&self, ms: u32);
}

impl<T: Delay + ?Sized> Delay for Arc<T> {
    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
