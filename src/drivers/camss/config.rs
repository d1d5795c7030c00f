//! CAMSS 平台参数
//!
//! 原先编译期写死的帧尺寸范围、缩放比、寄存器上限等都收进这里,
//! 由构造函数传入设备, 没有全局可变配置.

/// 默认 setfile 固件名
pub const STF_ISP_SETFILE: &str = "stf_isp0_fw.bin";

/// ISP 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IspConfig {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// 最大下采样比 (compose >= ceil(crop / ratio))
    pub scaler_ratio_max: u32,
    /// setfile 允许的最大寄存器偏移
    pub reg_offset_max: u32,
    /// setfile 单条延时上限 (ms)
    pub reg_delay_max_ms: u32,
    pub setfile_name: &'static str,
}

impl IspConfig {
    pub const fn new() -> Self {
        IspConfig {
            min_width: 64,
            max_width: 1920,
            min_height: 64,
            max_height: 1080,
            scaler_ratio_max: 1,
            reg_offset_max: 0x0fff,
            reg_delay_max_ms: 100,
            setfile_name: STF_ISP_SETFILE,
        }
    }
}

impl Default for IspConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// VIN 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VinConfig {
    /// APB_FUNC 时钟频率 (Hz)
    pub apb_func_rate: u64,
    /// MIPI RX0 像素时钟频率 (Hz), 仅 CSI→ISP 链路使用
    pub mipi_rx0_pxl_rate: u64,
    /// 行启动时丢弃的帧数 (写入 dummy buffer)
    pub default_frame_skip: i32,
}

impl VinConfig {
    pub const fn new() -> Self {
        VinConfig {
            apb_func_rate: 49_500_000,
            mipi_rx0_pxl_rate: 198_000_000,
            default_frame_skip: 3,
        }
    }
}

impl Default for VinConfig {
    fn default() -> Self {
        Self::new()
    }
}
