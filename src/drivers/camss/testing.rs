//! 测试用的硬件协作者替身

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use super::error::{CamssError, Result, SetfileError};
use super::{ClkId, LineId, RstId, SubdevEvent};
use crate::hal::{BufferQueue, ClockControl, Delay, EventSink, FirmwareSource, RegisterAccess};

/// 内存寄存器文件, 记录每一次写入
#[derive(Default)]
pub struct FakeRegs {
    values: Mutex<BTreeMap<u32, u32>>,
    writes: Mutex<Vec<(u32, u32)>>,
}

impl FakeRegs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接设置寄存器值 (不计入写记录)
    pub fn preset(&self, offset: u32, value: u32) {
        self.values.lock().insert(offset, value);
    }

    pub fn get(&self, offset: u32) -> u32 {
        self.values.lock().get(&offset).copied().unwrap_or(0)
    }

    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.writes
            .lock()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|&(_, v)| v)
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

impl RegisterAccess for FakeRegs {
    fn read32(&self, offset: u32) -> u32 {
        self.get(offset)
    }

    fn write32(&self, offset: u32, value: u32) {
        self.values.lock().insert(offset, value);
        self.writes.lock().push((offset, value));
    }
}

#[derive(Default)]
struct ClockState {
    enabled: BTreeSet<ClkId>,
    released: BTreeSet<RstId>,
    rates: BTreeMap<ClkId, u64>,
    parents: BTreeMap<ClkId, ClkId>,
    fail_enable: Option<ClkId>,
    fail_set_rate: Option<ClkId>,
    power_ons: u32,
    power_offs: u32,
}

/// 时钟 / 复位 / 电源记录器
#[derive(Default)]
pub struct FakeClocks {
    state: Mutex<ClockState>,
}

impl FakeClocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后对 `clk` 的使能请求失败
    pub fn fail_enable(&self, clk: ClkId) {
        self.state.lock().fail_enable = Some(clk);
    }

    /// 之后对 `clk` 的设频请求失败
    pub fn fail_set_rate(&self, clk: ClkId) {
        self.state.lock().fail_set_rate = Some(clk);
    }

    pub fn is_enabled(&self, clk: ClkId) -> bool {
        self.state.lock().enabled.contains(&clk)
    }

    pub fn in_reset(&self, rst: RstId) -> bool {
        !self.state.lock().released.contains(&rst)
    }

    pub fn rate(&self, clk: ClkId) -> Option<u64> {
        self.state.lock().rates.get(&clk).copied()
    }

    pub fn parent(&self, clk: ClkId) -> Option<ClkId> {
        self.state.lock().parents.get(&clk).copied()
    }

    pub fn power_ons(&self) -> u32 {
        self.state.lock().power_ons
    }

    pub fn power_offs(&self) -> u32 {
        self.state.lock().power_offs
    }
}

impl ClockControl for FakeClocks {
    fn enable_clock(&self, clk: ClkId) -> Result<()> {
        let mut s = self.state.lock();
        if s.fail_enable == Some(clk) {
            return Err(CamssError::Clock);
        }
        s.enabled.insert(clk);
        Ok(())
    }

    fn disable_clock(&self, clk: ClkId) {
        self.state.lock().enabled.remove(&clk);
    }

    fn set_rate(&self, clk: ClkId, rate: u64) -> Result<()> {
        let mut s = self.state.lock();
        if s.fail_set_rate == Some(clk) {
            return Err(CamssError::Clock);
        }
        s.rates.insert(clk, rate);
        Ok(())
    }

    fn set_parent(&self, clk: ClkId, parent: ClkId) -> Result<()> {
        self.state.lock().parents.insert(clk, parent);
        Ok(())
    }

    fn assert_reset(&self, rst: RstId) {
        self.state.lock().released.remove(&rst);
    }

    fn deassert_reset(&self, rst: RstId) {
        self.state.lock().released.insert(rst);
    }

    fn power_on(&self) {
        self.state.lock().power_ons += 1;
    }

    fn power_off(&self) {
        self.state.lock().power_offs += 1;
    }
}

/// 缓冲队列操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOp {
    Change,
    Done,
}

/// 缓冲队列调用记录
#[derive(Default)]
pub struct FakeQueue {
    calls: Mutex<Vec<(QueueOp, LineId)>>,
}

impl FakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(QueueOp, LineId)> {
        self.calls.lock().clone()
    }
}

impl BufferQueue for FakeQueue {
    fn change_buffer(&self, line: LineId) {
        self.calls.lock().push((QueueOp::Change, line));
    }

    fn buffer_done(&self, line: LineId) {
        self.calls.lock().push((QueueOp::Done, line));
    }
}

/// 事件记录
#[derive(Default)]
pub struct FakeEvents {
    events: Mutex<Vec<SubdevEvent>>,
}

impl FakeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SubdevEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for FakeEvents {
    fn notify(&self, event: SubdevEvent) {
        self.events.lock().push(event);
    }
}

/// 内存固件仓库
#[derive(Default)]
pub struct FakeFirmware {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl FakeFirmware {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(name: &str, data: Vec<u8>) -> Self {
        let mut fw = Self::default();
        fw.blobs.insert(String::from(name), data);
        fw
    }
}

impl FirmwareSource for FakeFirmware {
    fn request_firmware(&self, name: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or(CamssError::SetfileLoadError(SetfileError::FirmwareUnavailable))
    }
}

/// 延时记录
#[derive(Default)]
pub struct FakeDelay {
    calls: Mutex<Vec<u32>>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().clone()
    }
}

impl Delay for FakeDelay {
    fn delay_ms(&self, ms: u32) {
        self.calls.lock().push(ms);
    }
}
