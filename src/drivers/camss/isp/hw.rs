//! ISP 硬件操作: 时钟、静态配置、格式寄存器、复位、流使能

use log::debug;

use super::negotiate::PadState;
use super::regs::*;
use super::IspDevice;
use crate::drivers::camss::error::Result;
use crate::drivers::camss::formats::BayerOrder;
use crate::drivers::camss::pad::Pad;
use crate::drivers::camss::{ClkId, InterfaceType, RstId};
use crate::hal::{ClockControl, Delay, EventSink, RegisterAccess};

/// DUMP 通道 burst 长度
const DUMP_BURST_LEN: u32 = 3;

/// 默认饱和度
const CTRL_SAT_DEFAULT: u32 = 1;

/// UO 输出行跨度对齐 (字节)
const STRIDE_ALIGN: u32 = 8;

/// Bayer 排列 → RAW_FORMAT_CFG 的四个相位 (0=R 1=Gr 2=Gb 3=B)
fn bayer_phases(order: BayerOrder) -> u32 {
    match order {
        BayerOrder::Rggb => raw_format(0, 1, 2, 3),
        BayerOrder::Grbg => raw_format(1, 0, 3, 2),
        BayerOrder::Gbrg => raw_format(2, 3, 0, 1),
        BayerOrder::Bggr => raw_format(3, 2, 1, 0),
    }
}

impl<R, C, E, D> IspDevice<R, C, E, D>
where
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
    D: Delay,
{
    /// 使能 ISP 时钟并释放复位; 任一步失败回滚已使能的时钟
    pub(super) fn clk_enable(&self) -> Result<()> {
        self.clocks.enable_clock(ClkId::IspCore2x)?;
        if let Err(e) = self.clocks.enable_clock(ClkId::IspAxi) {
            self.clocks.disable_clock(ClkId::IspCore2x);
            return Err(e);
        }
        self.clocks.deassert_reset(RstId::IspTopN);
        self.clocks.deassert_reset(RstId::IspTopAxi);
        Ok(())
    }

    pub(super) fn clk_disable(&self) {
        self.clocks.assert_reset(RstId::IspTopAxi);
        self.clocks.assert_reset(RstId::IspTopN);
        self.clocks.disable_clock(ClkId::IspAxi);
        self.clocks.disable_clock(ClkId::IspCore2x);
    }

    /// 静态配置: 模块使能 + setfile
    pub(super) fn config_set(&self) {
        self.regs.write32(
            ISP_REG_CSI_MODULE_CFG,
            CSI_DC_EN | CSI_OBC_EN | CSI_OECF_EN | CSI_LCCF_EN | CSI_AWB_EN | CSI_OBA_EN | CSI_SC_EN,
        );
        self.regs.write32(
            ISP_REG_ISP_CTRL_1,
            ctrl_sat(CTRL_SAT_DEFAULT)
                | CTRL_DBC
                | CTRL_CTC
                | CTRL_YHIST
                | CTRL_YCURVE
                | CTRL_BIYUV
                | CTRL_SCE
                | CTRL_EE
                | CTRL_CCE
                | CTRL_RGE
                | CTRL_CME
                | CTRL_AE
                | CTRL_CE,
        );
        self.regs.set_bits32(
            ISP_REG_DUMP_CFG_1,
            DUMP_BURST_LEN_MASK,
            dump_burst_len(DUMP_BURST_LEN),
        );

        let setfile = self.setfile.lock();
        if !setfile.is_empty() {
            debug!("[stf_isp] apply setfile, {} entries", setfile.settings().len());
            setfile.apply(&self.regs, &self.delay, self.config.reg_delay_max_ms);
        }
    }

    /// 把活动的 crop / compose / 编码写入格式寄存器
    pub(super) fn hw_set_format(&self, state: &PadState, interface: InterfaceType) {
        let crop = state.crop.rect;
        let compose = state.compose;
        let sink = state.format(Pad::Sink);

        self.regs.write32(ISP_REG_PIC_CAPTURE_START_CFG, hi_lo(crop.top, crop.left));
        self.regs.write32(
            ISP_REG_PIC_CAPTURE_END_CFG,
            hi_lo(
                (crop.top + crop.height).saturating_sub(1),
                (crop.left + crop.width).saturating_sub(1),
            ),
        );
        self.regs.write32(ISP_REG_PIPELINE_XY_SIZE, hi_lo(crop.height, crop.width));
        self.regs.write32(ISP_REG_ITIIWSR, hi_lo(crop.height, crop.width));
        self.regs.write32(ISP_REG_SENSOR, imager_sel(interface as u32));

        if let Some(order) = sink.code.bayer_order() {
            self.regs.write32(ISP_REG_RAW_FORMAT_CFG, bayer_phases(order));
        }

        self.regs.write32(ISP_REG_SS0IW, hi_lo(compose.rect.width, compose.rect.height));
        let stride = (compose.rect.width * compose.bpp / 8).next_multiple_of(STRIDE_ALIGN);
        self.regs.write32(ISP_REG_STRIDE, stride);
        self.regs.write32(ISP_REG_PIXEL_COORDINATE_GEN, out_scanh(0));

        debug!(
            "[stf_isp] hw format: crop {}x{}@({},{}), out {}x{} stride {}",
            crop.width, crop.height, crop.left, crop.top, compose.rect.width, compose.rect.height, stride
        );
    }

    /// 复位脉冲
    pub(super) fn reset(&self) {
        self.regs.set_bits32(ISP_REG_ISP_CTRL_0, ISPC_RST_MASK, ISPC_RST);
        self.regs.set_bits32(ISP_REG_ISP_CTRL_0, ISPC_RST_MASK, 0);
    }

    pub(super) fn stream_set(&self, on: bool) {
        if on {
            self.regs.set32(ISP_REG_ISP_CTRL_0, ISPC_ENUO | ISPC_ENLS | ISPC_EN);
            self.regs.set32(ISP_REG_CSI_INPUT_EN_AND_STATUS, CSI_EN_S);
        } else {
            self.regs.clear32(ISP_REG_ISP_CTRL_0, ISPC_ENUO | ISPC_ENLS | ISPC_EN);
            self.regs.clear32(ISP_REG_CSI_INPUT_EN_AND_STATUS, CSI_EN_S);
        }
    }
}
