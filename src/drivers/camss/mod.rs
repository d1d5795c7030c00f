//! StarFive JH7110 相机子系统 (CAMSS) 驱动核心
//!
//! 包含 ISP 与 VIN 两类子设备:
//! - pad 格式 / crop / compose 协商
//! - 数据流与电源的边沿触发引用计数
//! - shadow 寄存器锁存与缓冲交接 (中断驱动)
//! - dummy buffer 丢帧
//! - setfile 加载
//!
//! 硬件访问全部经由 `crate::hal` 中的协作者 trait.

pub mod config;
pub mod dummy;
pub mod error;
pub mod formats;
pub mod isp;
pub mod pad;
pub mod shadow;
pub mod subdev;
pub mod vin;

#[cfg(test)]
pub(crate) mod testing;

use spin::Mutex;

use self::isp::IspDevice;
use self::vin::VinDevice;
use crate::hal::{BufferQueue, ClockControl, Delay, EventSink, RegisterAccess};

pub use self::error::{CamssError, Result};

// ============ 实体名 ============

/// CSI-2 接收器实体名前缀
pub const STF_CSI_NAME: &str = "cdns_csi2rx";

/// 时钟
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClkId {
    ApbFunc,
    WrapperClkC,
    MipiRx0Pxl,
    IspCore2x,
    IspAxi,
}

/// 复位线
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RstId {
    IspTopN,
    IspTopAxi,
}

/// VIN 输出行
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LineId {
    /// AXI 写 DMA
    Wr = 0,
    /// 送 ISP
    Isp = 1,
}

/// ISP 输入接口 (目前只接 CSI-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    Csi = 1,
}

/// 可订阅的事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SourceChange,
    FrameSync,
}

/// 子设备发出的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdevEvent {
    /// 数据流边沿; `changes` 为新的引用计数
    SourceChanged { changes: u32 },
}

// ============ 中断 ============

/// 中断源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqSource {
    /// VIN AXI 写完成
    VinWr = 0,
    /// ISP 帧完成
    IspDone = 1,
    /// ISP CSI 行中断
    IspCsiLine = 2,
}

const IRQ_SOURCE_NUM: usize = 3;

/// 上半部交给下半部的中断消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqEvent {
    pub source: IrqSource,
    /// 中断发生时的状态寄存器快照
    pub status: u32,
}

/// 整个相机子系统: 一个 ISP + 一个 VIN + 下游缓冲队列
pub struct Camss<S, R, C, Q, E, D> {
    isp: IspDevice<R, C, E, D>,
    vin: VinDevice<S, R, C, E>,
    queue: Q,
    irq_locks: [Mutex<()>; IRQ_SOURCE_NUM],
}

impl<S, R, C, Q, E, D> Camss<S, R, C, Q, E, D>
where
    S: RegisterAccess,
    R: RegisterAccess,
    C: ClockControl,
    Q: BufferQueue,
    E: EventSink,
    D: Delay,
{
    pub fn new(isp: IspDevice<R, C, E, D>, vin: VinDevice<S, R, C, E>, queue: Q) -> Self {
        Camss {
            isp,
            vin,
            queue,
            irq_locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    pub fn isp(&self) -> &IspDevice<R, C, E, D> {
        &self.isp
    }

    pub fn vin(&self) -> &VinDevice<S, R, C, E> {
        &self.vin
    }

    /// 上半部: 读取中断状态快照
    pub fn capture(&self, source: IrqSource) -> IrqEvent {
        let status = match source {
            IrqSource::VinWr => 0,
            IrqSource::IspDone | IrqSource::IspCsiLine => self.vin.isp_irq_status(),
        };
        IrqEvent { source, status }
    }

    /// 下半部: 按中断源分发, 同一中断源串行执行
    pub fn dispatch(&self, event: IrqEvent) {
        let _guard = self.irq_locks[event.source as usize].lock();
        match event.source {
            IrqSource::VinWr => self.vin.wr_irq(&self.queue),
            IrqSource::IspDone => self.vin.isp_done_irq(event.status, self.isp.shadow()),
            IrqSource::IspCsiLine => {
                self.vin
                    .isp_csiline_irq(event.status, self.isp.shadow(), &self.queue)
            }
        }
    }

    /// 读取快照并立即处理
    pub fn handle_irq(&self, source: IrqSource) {
        self.dispatch(self.capture(source));
    }
}
