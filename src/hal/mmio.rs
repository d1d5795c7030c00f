//! 内存映射寄存器块
//!
//! `RegisterAccess` 的 MMIO 实现, 所有访问都走 `volatile`,
//! 不会被编译器合并或重排.

use volatile::Volatile;

use super::RegisterAccess;

/// 一个已映射的 32 位寄存器块
#[derive(Debug)]
pub struct MmioRegisters {
    base: usize,
    size: u32,
}

impl MmioRegisters {
    /// 创建寄存器块
    ///
    /// # Safety
    ///
    /// `base..base + size` 必须是已映射、4 字节对齐、在整个生命周期内
    /// 有效的寄存器区域, 且没有其他代码以非 volatile 方式访问它.
    pub const unsafe fn new(base: usize, size: u32) -> Self {
        MmioRegisters { base, size }
    }

    /// 寄存器块大小 (字节)
    pub fn size(&self) -> u32 {
        self.size
    }

    fn reg(&self, offset: u32) -> *mut u32 {
        debug_assert!(offset % 4 == 0, "unaligned register offset {:#x}", offset);
        debug_assert!(offset < self.size, "register offset {:#x} out of block", offset);
        (self.base + offset as usize) as *mut u32
    }
}

impl RegisterAccess for MmioRegisters {
    fn read32(&self, offset: u32) -> u32 {
        // SAFETY: new() 的调用者保证该地址有效
        let reg = unsafe { &*self.reg(offset) };
        Volatile::new_read_only(reg).read()
    }

    fn write32(&self, offset: u32, value: u32) {
        // SAFETY: 同上; 寄存器是硬件共享状态, 这里只做单次 volatile 写
        let reg = unsafe { &mut *self.reg(offset) };
        Volatile::new(reg).write(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmio_read_write() {
        let mut block = [0u32; 8];
        let regs = unsafe { MmioRegisters::new(block.as_mut_ptr() as usize, 32) };

        regs.write32(0x4, 0xdead_beef);
        assert_eq!(regs.read32(0x4), 0xdead_beef);
        assert_eq!(regs.read32(0x0), 0);
        assert_eq!(regs.size(), 32);
    }

    #[test]
    fn test_mmio_set_bits_preserves_other_bits() {
        let mut block = [0u32; 4];
        block[2] = 0xff00_00ff;
        let regs = unsafe { MmioRegisters::new(block.as_mut_ptr() as usize, 16) };

        regs.set_bits32(0x8, 0x0000_0f0f, 0x0000_0a05);
        assert_eq!(regs.read32(0x8), 0xff00_0af5);

        regs.clear32(0x8, 0xff00_0000);
        assert_eq!(regs.read32(0x8), 0x0000_0af5);
    }
}
