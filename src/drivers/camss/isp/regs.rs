//! ISP 寄存器偏移与位域
//!
//! 只收录核心实际写到的寄存器.

use bitflags::bitflags;

// ============ 寄存器偏移 ============

/// CSI 输入使能与状态
pub const ISP_REG_CSI_INPUT_EN_AND_STATUS: u32 = 0x000;

/// CSI 中断 / shadow 模式
pub const ISP_REG_CSIINTS_ADDR: u32 = 0x008;

/// CSI 模块使能
pub const ISP_REG_CSI_MODULE_CFG: u32 = 0x010;

/// sensor 接口选择
pub const ISP_REG_SENSOR: u32 = 0x014;

/// RAW Bayer 排列
pub const ISP_REG_RAW_FORMAT_CFG: u32 = 0x018;

/// 采集窗口起点
pub const ISP_REG_PIC_CAPTURE_START_CFG: u32 = 0x01c;

/// 采集窗口终点
pub const ISP_REG_PIC_CAPTURE_END_CFG: u32 = 0x020;

/// DUMP 配置 (RAW 输出)
pub const ISP_REG_DUMP_CFG_1: u32 = 0x028;

/// ISP 控制 0: 使能、复位、中断状态
pub const ISP_REG_ISP_CTRL_0: u32 = 0xa00;

/// ISP 控制 1: 处理模块使能
pub const ISP_REG_ISP_CTRL_1: u32 = 0xa08;

/// 流水线有效尺寸
pub const ISP_REG_PIPELINE_XY_SIZE: u32 = 0xa0c;

/// shadow 更新控制
pub const ISP_REG_IESHD_ADDR: u32 = 0xa50;

/// UO 输出 Y / UV 平面地址
pub const ISP_REG_Y_PLANE_START_ADDR: u32 = 0xa80;
pub const ISP_REG_UV_PLANE_START_ADDR: u32 = 0xa84;

/// UO 输出行跨度
pub const ISP_REG_STRIDE: u32 = 0xa88;

/// 输出坐标生成
pub const ISP_REG_PIXEL_COORDINATE_GEN: u32 = 0xa8c;

/// scaler 0 输出尺寸
pub const ISP_REG_SS0IW: u32 = 0xaa8;

/// ITI 输入尺寸
pub const ISP_REG_ITIIWSR: u32 = 0xb20;

// ============ 位域 ============

/// CSI_INPUT_EN_AND_STATUS: CSI 使能
pub const CSI_EN_S: u32 = 1 << 0;

/// CSIINTS: 中断选择
pub const CSI_INTS_MASK: u32 = 0b11 << 16;

pub const fn csi_ints(n: u32) -> u32 {
    (n << 16) & CSI_INTS_MASK
}

/// CSI_MODULE_CFG
pub const CSI_SC_EN: u32 = 1 << 17;
pub const CSI_OBA_EN: u32 = 1 << 16;
pub const CSI_AWB_EN: u32 = 1 << 7;
pub const CSI_LCCF_EN: u32 = 1 << 6;
pub const CSI_OECF_EN: u32 = 1 << 4;
pub const CSI_OBC_EN: u32 = 1 << 2;
pub const CSI_DC_EN: u32 = 1 << 0;

/// SENSOR
pub const fn imager_sel(n: u32) -> u32 {
    n & 0x1
}

/// RAW_FORMAT_CFG: 2x2 Bayer 相位 (SMY3..SMY0 每个 2 位), 0=R 1=Gr 2=Gb 3=B
pub const fn raw_format(p0: u32, p1: u32, p2: u32, p3: u32) -> u32 {
    ((p3 & 3) << 6) | ((p2 & 3) << 4) | ((p1 & 3) << 2) | (p0 & 3)
}

/// 坐标对 (高 16 位 v/h, 低 16 位 h/w)
pub const fn hi_lo(hi: u32, lo: u32) -> u32 {
    ((hi & 0xffff) << 16) | (lo & 0xffff)
}

/// DUMP_CFG_1
pub const DUMP_BURST_LEN_MASK: u32 = 0b11 << 16;

pub const fn dump_burst_len(n: u32) -> u32 {
    (n << 16) & DUMP_BURST_LEN_MASK
}

/// ISP_CTRL_0
pub const ISPC_ENUO: u32 = 1 << 20;
pub const ISPC_ENLS: u32 = 1 << 17;
pub const ISPC_RST: u32 = 1 << 1;
pub const ISPC_RST_MASK: u32 = 1 << 1;
pub const ISPC_EN: u32 = 1 << 0;

/// ISP_CTRL_1
pub const CTRL_SAT_MASK: u32 = 0xf << 28;
pub const CTRL_DBC: u32 = 1 << 22;
pub const CTRL_CTC: u32 = 1 << 21;
pub const CTRL_YHIST: u32 = 1 << 20;
pub const CTRL_YCURVE: u32 = 1 << 19;
pub const CTRL_BIYUV: u32 = 1 << 17;
pub const CTRL_SCE: u32 = 1 << 8;
pub const CTRL_EE: u32 = 1 << 7;
pub const CTRL_CCE: u32 = 1 << 5;
pub const CTRL_RGE: u32 = 1 << 4;
pub const CTRL_CME: u32 = 1 << 3;
pub const CTRL_AE: u32 = 1 << 2;
pub const CTRL_CE: u32 = 1 << 1;

pub const fn ctrl_sat(n: u32) -> u32 {
    (n << 28) & CTRL_SAT_MASK
}

/// IESHD
pub const SHAD_UP_M: u32 = 1 << 1;
pub const SHAD_UP_EN: u32 = 1 << 0;

/// PIXEL_COORDINATE_GEN
pub const fn out_scanh(n: u32) -> u32 {
    n << 4
}

bitflags! {
    /// ISP_CTRL_0 中的中断状态位 (写 1 清除)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IspIrqStatus: u32 {
        /// UO 输出使能, 同时表示有缓冲写完
        const BUFFER_DONE = 1 << 20;
        /// ISP 帧处理完成
        const ISP_DONE = 1 << 24;
        /// CSI 接收完成
        const CSI_DONE = 1 << 25;
        /// 统计收集完成
        const SC_DONE = 1 << 26;
        /// CSI 行中断
        const LINE_INT = 1 << 27;
    }
}

/// 全部中断状态位
pub const EN_INT_ALL: u32 = 0xf << 24;
