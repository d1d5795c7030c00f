//! dummy buffer 与丢帧计数
//!
//! 行刚启动时下游队列里可能还没有真实缓冲, 这时把硬件指向 dummy buffer,
//! 前 N 个中断只递减计数不换缓冲.

use core::sync::atomic::{AtomicI32, Ordering};

use super::shadow::dec_if_positive;

/// dummy buffer (由外部分配, 这里只记录 DMA 地址)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DummyBuffer {
    /// Y 平面 / 单平面 DMA 地址
    pub dma_addr: u32,
    /// UV 平面 DMA 地址 (单平面格式与 `dma_addr` 相同)
    pub uv_addr: u32,
    pub size: usize,
}

impl DummyBuffer {
    pub const fn new(dma_addr: u32, uv_addr: u32, size: usize) -> Self {
        DummyBuffer { dma_addr, uv_addr, size }
    }
}

/// 丢帧计数
#[derive(Debug, Default)]
pub struct FrameSkip {
    skip: AtomicI32,
}

impl FrameSkip {
    pub const fn new() -> Self {
        FrameSkip { skip: AtomicI32::new(0) }
    }

    /// 行启动时设置丢帧数
    pub fn arm(&self, frames: i32) {
        self.skip.store(frames, Ordering::Release);
    }

    /// 剩余丢帧数
    pub fn remaining(&self) -> i32 {
        self.skip.load(Ordering::Acquire)
    }

    /// 中断时调用: 仍需丢帧则递减并返回 true, 否则返回 false (可以换真实缓冲)
    pub fn consume(&self) -> bool {
        dec_if_positive(&self.skip) >= 0
    }
}

/// 每条输出行的 dummy buffer 状态
#[derive(Debug, Default)]
pub struct DummyState {
    pub buffer: spin::Mutex<Option<DummyBuffer>>,
    pub frame_skip: FrameSkip,
}

impl DummyState {
    pub const fn new() -> Self {
        DummyState {
            buffer: spin::Mutex::new(None),
            frame_skip: FrameSkip::new(),
        }
    }
}
