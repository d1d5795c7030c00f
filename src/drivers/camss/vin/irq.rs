//! 中断下半部: shadow 锁存与缓冲交接
//!
//! 每个处理函数拿到的是上半部读到的状态快照. 调用者保证同一中断源
//! 不会重入 (见 `Camss::dispatch`).

use log::trace;

use super::VinDevice;
use crate::drivers::camss::isp::regs::{
    csi_ints, IspIrqStatus, CSI_INTS_MASK, EN_INT_ALL, ISPC_EN, ISP_REG_CSIINTS_ADDR,
    ISP_REG_IESHD_ADDR, ISP_REG_ISP_CTRL_0, SHAD_UP_EN, SHAD_UP_M,
};
use crate::drivers::camss::shadow::ShadowCount;
use crate::drivers::camss::LineId;
use crate::hal::{BufferQueue, ClockControl, EventSink, RegisterAccess};

impl<S, R, C, E> VinDevice<S, R, C, E>
where
    S: RegisterAccess,
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
{
    /// 读取 ISP 中断状态 (上半部)
    pub fn isp_irq_status(&self) -> u32 {
        self.isp_regs.read32(ISP_REG_ISP_CTRL_0)
    }

    /// AXI 写 DMA 完成
    pub fn wr_irq<Q: BufferQueue + ?Sized>(&self, queue: &Q) {
        if !self.dummy(LineId::Wr).frame_skip.consume() {
            queue.change_buffer(LineId::Wr);
            queue.buffer_done(LineId::Wr);
        } else {
            trace!("[stf_vin] wr: skip frame");
        }
        self.wr_irq_clean();
    }

    /// 清除已处理的中断状态位; 其余控制位取自当前寄存器值
    fn clear_isp_irq(&self, serviced: IspIrqStatus) {
        self.isp_regs.set_bits32(ISP_REG_ISP_CTRL_0, EN_INT_ALL, serviced.bits());
    }

    /// CSI 行中断: 没有未确认的锁存时交接缓冲并发起新的锁存
    ///
    /// 快照之后 ISP 可能已被停下, 此时只清状态, 不再锁存.
    pub fn isp_csiline_irq<Q: BufferQueue + ?Sized>(
        &self,
        status: u32,
        shadow: &ShadowCount,
        queue: &Q,
    ) {
        let flags = IspIrqStatus::from_bits_truncate(status);
        if !flags.contains(IspIrqStatus::LINE_INT) {
            return;
        }

        let running = self.isp_regs.read32(ISP_REG_ISP_CTRL_0) & ISPC_EN != 0;
        if !running {
            trace!("[stf_vin] isp: line irq after stop");
        } else if shadow.is_idle() {
            if self.dummy(LineId::Isp).frame_skip.consume() {
                trace!("[stf_vin] isp: skip frame");
            } else if flags.contains(IspIrqStatus::BUFFER_DONE) {
                queue.change_buffer(LineId::Isp);
                queue.buffer_done(LineId::Isp);
            }

            self.isp_regs.set_bits32(ISP_REG_CSIINTS_ADDR, CSI_INTS_MASK, csi_ints(3));
            self.isp_regs.set_bits32(ISP_REG_IESHD_ADDR, SHAD_UP_M | SHAD_UP_EN, 0x3);
            shadow.hold();
        }

        self.clear_isp_irq(IspIrqStatus::LINE_INT);
    }

    /// ISP 帧完成: 硬件已应用上次锁存的配置
    pub fn isp_done_irq(&self, status: u32, shadow: &ShadowCount) {
        let flags = IspIrqStatus::from_bits_truncate(status);
        if !flags.contains(IspIrqStatus::ISP_DONE) {
            return;
        }

        shadow.release();
        self.clear_isp_irq(
            IspIrqStatus::ISP_DONE | IspIrqStatus::CSI_DONE | IspIrqStatus::SC_DONE,
        );
    }
}
