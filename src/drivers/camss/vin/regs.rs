//! VIN syscon 寄存器 (SYSCONSAIF_SYSCFG)

// ============ 寄存器偏移 ============

/// AXI 写通道使能
pub const SYSCFG_AXIWR0_CTRL: u32 = 20;

/// AXI 写 pong 起始地址
pub const SYSCFG_AXIWR0_PONG_ADDR: u32 = 24;

/// AXI 写中断清除 / 屏蔽
pub const SYSCFG_AXIWR0_INTR: u32 = 28;

/// AXI 写 ping 起始地址
pub const SYSCFG_AXIWR0_PING_ADDR: u32 = 32;

/// MIPI → ISP0 通道配置
pub const SYSCFG_MIPI_ISP0: u32 = 36;

// ============ 位域 ============

pub const AXIWR0_EN: u32 = 1 << 4;

pub const AXIWR0_INTR_CLEAN: u32 = 1 << 0;
pub const AXIWR0_INTR_MASK: u32 = 1 << 1;

pub const MIPI_BYTE_EN_ISP0_MASK: u32 = 0b11 << 6;
pub const MIPI_CHANNEL_SEL0_MASK: u32 = 0xf << 8;
pub const MIPI_HEADER_EN0_MASK: u32 = 1 << 12;
pub const PIX_NUM_MASK: u32 = 0xf << 13;

pub const fn mipi_byte_en_isp0(n: u32) -> u32 {
    (n << 6) & MIPI_BYTE_EN_ISP0_MASK
}

pub const fn mipi_channel_sel0(n: u32) -> u32 {
    (n << 8) & MIPI_CHANNEL_SEL0_MASK
}

pub const fn mipi_header_en0(n: u32) -> u32 {
    (n << 12) & MIPI_HEADER_EN0_MASK
}

pub const fn pix_num(n: u32) -> u32 {
    (n << 13) & PIX_NUM_MASK
}
