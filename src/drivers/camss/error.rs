//! CAMSS 错误类型

use core::fmt;

/// setfile 加载失败的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetfileError {
    /// 固件为空或长度不是 (addr, val, delay) 三元组的整数倍
    Malformed { len: usize },
    /// 寄存器地址超出寄存器块范围
    OffsetOutOfRange { addr: u32 },
    /// 固件无法获取
    FirmwareUnavailable,
}

/// CAMSS 错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamssError {
    /// pad 索引越界
    InvalidPad,
    /// 不支持的 selection target / 枚举索引 / 事件类型
    InvalidArgument,
    /// 上游链路不存在或接口类型无法识别
    PipelineNotConfigured,
    /// setfile 固件格式错误或越界
    SetfileLoadError(SetfileError),
    /// sink pad 已经有活动链路
    Busy,
    /// 时钟使能失败
    Clock,
}

/// CAMSS 结果类型
pub type Result<T> = core::result::Result<T, CamssError>;

impl fmt::Display for SetfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetfileError::Malformed { len } => {
                write!(f, "malformed setfile ({} bytes)", len)
            }
            SetfileError::OffsetOutOfRange { addr } => {
                write!(f, "setfile register {:#x} out of range", addr)
            }
            SetfileError::FirmwareUnavailable => write!(f, "setfile firmware unavailable"),
        }
    }
}

impl fmt::Display for CamssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CamssError::InvalidPad => write!(f, "Invalid pad"),
            CamssError::InvalidArgument => write!(f, "Invalid argument"),
            CamssError::PipelineNotConfigured => write!(f, "Pipeline not configured"),
            CamssError::SetfileLoadError(e) => write!(f, "Setfile load error: {}", e),
            CamssError::Busy => write!(f, "Device busy"),
            CamssError::Clock => write!(f, "Clock enable failed"),
        }
    }
}

impl From<SetfileError> for CamssError {
    fn from(e: SetfileError) -> Self {
        CamssError::SetfileLoadError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(CamssError::InvalidPad.to_string(), "Invalid pad");
        assert_eq!(
            CamssError::from(SetfileError::OffsetOutOfRange { addr: 0x1000 }).to_string(),
            "Setfile load error: setfile register 0x1000 out of range"
        );
    }
}
