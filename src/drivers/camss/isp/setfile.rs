//! ISP setfile: 按顺序写入的 (寄存器, 值, 延时) 表
//!
//! 固件格式为紧密排列的小端 u32 三元组, 每项 12 字节.

use alloc::vec::Vec;

use log::{info, warn};

use crate::drivers::camss::error::SetfileError;
use crate::hal::{Delay, RegisterAccess};

/// 单项字节数
pub const SETFILE_ENTRY_SIZE: usize = 12;

/// 一项寄存器设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegVal {
    pub addr: u32,
    pub val: u32,
    pub delay_ms: u32,
}

/// 已加载的 setfile
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Setfile {
    settings: Vec<RegVal>,
}

impl Setfile {
    pub const fn new() -> Self {
        Setfile { settings: Vec::new() }
    }

    pub fn settings(&self) -> &[RegVal] {
        &self.settings
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// 解析固件数据
    pub fn parse(data: &[u8], reg_offset_max: u32) -> Result<Setfile, SetfileError> {
        if data.is_empty() || data.len() % SETFILE_ENTRY_SIZE != 0 {
            return Err(SetfileError::Malformed { len: data.len() });
        }

        let mut settings = Vec::with_capacity(data.len() / SETFILE_ENTRY_SIZE);
        for chunk in data.chunks_exact(SETFILE_ENTRY_SIZE) {
            let word = |i: usize| {
                u32::from_le_bytes([chunk[i], chunk[i + 1], chunk[i + 2], chunk[i + 3]])
            };
            let entry = RegVal { addr: word(0), val: word(4), delay_ms: word(8) };
            if entry.addr > reg_offset_max {
                return Err(SetfileError::OffsetOutOfRange { addr: entry.addr });
            }
            settings.push(entry);
        }

        info!("[stf_isp] setfile parsed, {} entries", settings.len());
        Ok(Setfile { settings })
    }

    /// 按顺序写入全部设置, 单项延时不超过 `delay_max_ms`
    pub fn apply<R, D>(&self, regs: &R, delay: &D, delay_max_ms: u32)
    where
        R: RegisterAccess + ?Sized,
        D: Delay + ?Sized,
    {
        for entry in &self.settings {
            regs.write32(entry.addr, entry.val);
            if entry.delay_ms == 0 {
                continue;
            }
            let ms = if entry.delay_ms > delay_max_ms {
                warn!(
                    "[stf_isp] setfile delay {} ms at {:#x} clamped to {} ms",
                    entry.delay_ms, entry.addr, delay_max_ms
                );
                delay_max_ms
            } else {
                entry.delay_ms
            };
            delay.delay_ms(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::camss::testing::{FakeDelay, FakeRegs};

    fn encode(entries: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(a, v, d) in entries {
            out.extend_from_slice(&a.to_le_bytes());
            out.extend_from_slice(&v.to_le_bytes());
            out.extend_from_slice(&d.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_parse_entries() {
        let data = encode(&[(0x010, 0x1234, 0), (0xa08, 0xdead_beef, 5)]);
        let sf = Setfile::parse(&data, 0x0fff).unwrap();
        assert_eq!(
            sf.settings(),
            &[
                RegVal { addr: 0x010, val: 0x1234, delay_ms: 0 },
                RegVal { addr: 0xa08, val: 0xdead_beef, delay_ms: 5 },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert_eq!(Setfile::parse(&[], 0x0fff), Err(SetfileError::Malformed { len: 0 }));
        let mut data = encode(&[(0x010, 1, 0)]);
        data.push(0);
        assert_eq!(Setfile::parse(&data, 0x0fff), Err(SetfileError::Malformed { len: 13 }));
    }

    #[test]
    fn test_parse_rejects_out_of_range_offset() {
        let data = encode(&[(0x010, 1, 0), (0x1000, 2, 0)]);
        assert_eq!(
            Setfile::parse(&data, 0x0fff),
            Err(SetfileError::OffsetOutOfRange { addr: 0x1000 })
        );
    }

    #[test]
    fn test_apply_in_order_with_clamped_delay() {
        let data = encode(&[(0x010, 7, 0), (0x014, 8, 3), (0x010, 9, 500)]);
        let sf = Setfile::parse(&data, 0x0fff).unwrap();
        let regs = FakeRegs::new();
        let delay = FakeDelay::new();
        sf.apply(&regs, &delay, 100);

        assert_eq!(regs.writes_to(0x010), [7, 9]);
        assert_eq!(regs.writes_to(0x014), [8]);
        assert_eq!(delay.calls(), [3, 100]);
    }
}
