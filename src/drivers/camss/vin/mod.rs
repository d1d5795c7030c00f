//! VIN (video input) 子设备
//!
//! 一个 VIN 设备 (DVP 或 CSI 输入) 带两条输出行:
//! - WR: AXI 写 DMA, 直接写内存
//! - ISP: 送入 ISP 处理
//!
//! 每条行各自有 pad 格式、数据流引用计数和 dummy buffer.

pub mod irq;
pub mod regs;

use log::{debug, warn};
use spin::Mutex;

use self::regs::*;
use super::config::{IspConfig, VinConfig};
use super::dummy::{DummyBuffer, DummyState};
use super::error::{CamssError, Result};
use super::formats::FormatGroup;
use super::isp::regs::{ISP_REG_UV_PLANE_START_ADDR, ISP_REG_Y_PLANE_START_ADDR};
use super::pad::{
    clamp_frame_size, ColorSpace, Field, MbusFormat, Pad, Rect, SelectionTarget, Which,
};
use super::subdev::{RefCount, Subdev, SubdevKind, Transition};
use super::{ClkId, LineId, SubdevEvent};
use crate::hal::{ClockControl, EventSink, RegisterAccess};

/// VIN 输入类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VinKind {
    Dvp,
    Csi,
}

/// 输入 → 输出行 的链路
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    DvpToWr,
    DvpToIsp,
    CsiToWr,
    CsiToIsp,
}

impl Link {
    pub fn new(kind: VinKind, line: LineId) -> Link {
        match (kind, line) {
            (VinKind::Dvp, LineId::Wr) => Link::DvpToWr,
            (VinKind::Dvp, LineId::Isp) => Link::DvpToIsp,
            (VinKind::Csi, LineId::Wr) => Link::CsiToWr,
            (VinKind::Csi, LineId::Isp) => Link::CsiToIsp,
        }
    }
}

/// 单条输出行的状态
struct LineState {
    active: Mutex<[MbusFormat; 2]>,
    trial: Mutex<[MbusFormat; 2]>,
    stream: Mutex<RefCount>,
    dummy: DummyState,
}

impl LineState {
    fn new(initial: [MbusFormat; 2]) -> Self {
        LineState {
            active: Mutex::new(initial),
            trial: Mutex::new(initial),
            stream: Mutex::new(RefCount::new()),
            dummy: DummyState::new(),
        }
    }
}

/// VIN 设备
///
/// `syscon` 为 VIN 的 syscon 寄存器块, `isp_regs` 为 ISP 寄存器块
/// (ISP 行的输出地址与中断状态都在 ISP 块中). 数据流边沿事件发往 `events`.
pub struct VinDevice<S, R, C, E> {
    kind: VinKind,
    syscon: S,
    isp_regs: R,
    clocks: C,
    events: E,
    config: VinConfig,
    frame: IspConfig,
    lines: [LineState; 2],
}

impl<S, R, C, E> VinDevice<S, R, C, E>
where
    S: RegisterAccess,
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
{
    /// 创建 VIN 设备; `frame` 提供 sink 帧尺寸范围
    pub fn new(
        kind: VinKind,
        syscon: S,
        isp_regs: R,
        clocks: C,
        events: E,
        config: VinConfig,
        frame: IspConfig,
    ) -> Self {
        let sink = resolve_sink(
            &frame,
            MbusFormat::new(FormatGroup::SinkRaw.entries()[0].code, frame.max_width, frame.max_height),
        );
        let initial = [sink, sink];

        VinDevice {
            kind,
            syscon,
            isp_regs,
            clocks,
            events,
            config,
            frame,
            lines: [LineState::new(initial), LineState::new(initial)],
        }
    }

    pub fn kind(&self) -> VinKind {
        self.kind
    }

    /// 取得一条输出行的子设备句柄
    pub fn line(&self, id: LineId) -> VinLine<'_, S, R, C, E> {
        VinLine { dev: self, id }
    }

    fn state(&self, id: LineId) -> &LineState {
        &self.lines[id as usize]
    }

    /// 设置行的 dummy buffer (下次启动时写入硬件)
    pub fn set_dummy_buffer(&self, id: LineId, buffer: Option<DummyBuffer>) {
        *self.state(id).dummy.buffer.lock() = buffer;
    }

    /// 行剩余丢帧数
    pub fn frame_skip_remaining(&self, id: LineId) -> i32 {
        self.state(id).dummy.frame_skip.remaining()
    }

    pub(crate) fn dummy(&self, id: LineId) -> &DummyState {
        &self.state(id).dummy
    }

    // ============ 硬件操作 ============

    fn clk_enable(&self, link: Link) -> Result<()> {
        self.clocks.set_rate(ClkId::ApbFunc, self.config.apb_func_rate)?;
        if link == Link::CsiToIsp {
            self.clocks.set_rate(ClkId::MipiRx0Pxl, self.config.mipi_rx0_pxl_rate)?;
            self.clocks.set_parent(ClkId::WrapperClkC, ClkId::MipiRx0Pxl)?;
        }
        Ok(())
    }

    fn link_stream_set(&self, link: Link) {
        if link == Link::CsiToIsp {
            self.syscon.set_bits32(SYSCFG_MIPI_ISP0, MIPI_BYTE_EN_ISP0_MASK, mipi_byte_en_isp0(0));
            self.syscon.set_bits32(SYSCFG_MIPI_ISP0, MIPI_CHANNEL_SEL0_MASK, mipi_channel_sel0(0));
            self.syscon.set_bits32(SYSCFG_MIPI_ISP0, PIX_NUM_MASK, pix_num(0));
            self.syscon.set_bits32(SYSCFG_MIPI_ISP0, MIPI_HEADER_EN0_MASK, mipi_header_en0(1));
        }
    }

    /// 把 dummy buffer 写入硬件并设置丢帧数
    fn setup_dummy_buffer(&self, id: LineId) {
        let dummy = self.dummy(id);
        let Some(buffer) = *dummy.buffer.lock() else {
            debug!("[stf_vin] line {:?} has no dummy buffer, no frame skip", id);
            dummy.frame_skip.arm(0);
            return;
        };

        match id {
            LineId::Wr => {
                self.syscon.write32(SYSCFG_AXIWR0_PING_ADDR, buffer.dma_addr);
                self.syscon.write32(SYSCFG_AXIWR0_PONG_ADDR, buffer.dma_addr);
            }
            LineId::Isp => {
                self.isp_regs.write32(ISP_REG_Y_PLANE_START_ADDR, buffer.dma_addr);
                self.isp_regs.write32(ISP_REG_UV_PLANE_START_ADDR, buffer.uv_addr);
            }
        }
        dummy.frame_skip.arm(self.config.default_frame_skip);
    }

    pub(crate) fn wr_irq_clean(&self) {
        self.syscon.set_bits32(SYSCFG_AXIWR0_INTR, AXIWR0_INTR_CLEAN, AXIWR0_INTR_CLEAN);
        self.syscon.set_bits32(SYSCFG_AXIWR0_INTR, AXIWR0_INTR_CLEAN, 0);
    }

    fn wr_irq_enable(&self, enable: bool) {
        if enable {
            self.syscon.set_bits32(SYSCFG_AXIWR0_INTR, AXIWR0_INTR_MASK, 0);
        } else {
            self.wr_irq_clean();
            self.syscon.set_bits32(SYSCFG_AXIWR0_INTR, AXIWR0_INTR_MASK, AXIWR0_INTR_MASK);
        }
    }

    fn start_line(&self, id: LineId) -> Result<()> {
        let link = Link::new(self.kind, id);
        self.clk_enable(link)?;
        self.link_stream_set(link);
        self.setup_dummy_buffer(id);
        if id == LineId::Wr {
            self.syscon.set32(SYSCFG_AXIWR0_CTRL, AXIWR0_EN);
            self.wr_irq_enable(true);
        }
        Ok(())
    }

    fn stop_line(&self, id: LineId) {
        if id == LineId::Wr {
            self.wr_irq_enable(false);
        }
    }
}

/// sink 格式解析: sink-raw 组, 与 ISP 相同的尺寸约束
fn resolve_sink(frame: &IspConfig, proposed: MbusFormat) -> MbusFormat {
    let (width, height) = clamp_frame_size(
        proposed.width,
        proposed.height,
        (frame.min_width, frame.max_width),
        (frame.min_height, frame.max_height),
    );
    MbusFormat {
        code: FormatGroup::SinkRaw.resolve(proposed.code).code,
        width,
        height,
        field: Field::None,
        colorspace: ColorSpace::Srgb,
    }
}

/// VIN 输出行子设备句柄
pub struct VinLine<'a, S, R, C, E> {
    dev: &'a VinDevice<S, R, C, E>,
    id: LineId,
}

impl<S, R, C, E> VinLine<'_, S, R, C, E>
where
    S: RegisterAccess,
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
{
    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn link(&self) -> Link {
        Link::new(self.dev.kind, self.id)
    }

    pub fn stream_count(&self) -> u32 {
        self.dev.state(self.id).stream.lock().count()
    }

    fn formats(&self, which: Which) -> &Mutex<[MbusFormat; 2]> {
        let state = self.dev.state(self.id);
        match which {
            Which::Active => &state.active,
            Which::Try => &state.trial,
        }
    }
}

impl<S, R, C, E> Subdev for VinLine<'_, S, R, C, E>
where
    S: RegisterAccess,
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
{
    fn kind(&self) -> SubdevKind {
        match self.dev.kind {
            VinKind::Dvp => SubdevKind::VinDvp,
            VinKind::Csi => SubdevKind::VinCsi,
        }
    }

    fn get_format(&self, pad: u32, which: Which) -> Result<MbusFormat> {
        let pad = Pad::from_index(pad)?;
        Ok(self.formats(which).lock()[pad.index()])
    }

    fn set_format(&self, pad: u32, format: MbusFormat, which: Which) -> Result<MbusFormat> {
        let pad = Pad::from_index(pad)?;
        let stream = self.dev.state(self.id).stream.lock();
        let mut fmts = self.formats(which).lock();

        if stream.is_active() {
            return Ok(fmts[pad.index()]);
        }
        // source 总是跟随 sink
        if pad == Pad::Sink {
            let sink = resolve_sink(&self.dev.frame, format);
            fmts[Pad::Sink.index()] = sink;
            fmts[Pad::Source.index()] = sink;
        }
        Ok(fmts[pad.index()])
    }

    fn get_selection(&self, pad: u32, _target: SelectionTarget, _which: Which) -> Result<Rect> {
        Pad::from_index(pad)?;
        Err(CamssError::InvalidArgument)
    }

    fn set_selection(
        &self,
        pad: u32,
        _target: SelectionTarget,
        _rect: Rect,
        _which: Which,
    ) -> Result<Rect> {
        Pad::from_index(pad)?;
        Err(CamssError::InvalidArgument)
    }

    fn set_stream(&self, enable: bool) -> Result<()> {
        let mut stream = self.dev.state(self.id).stream.lock();
        let transition = if enable {
            stream.get(|| self.dev.start_line(self.id))?
        } else {
            stream.put(|| self.dev.stop_line(self.id))
        };

        match transition {
            Transition::Edge(changes) => {
                debug!(
                    "[stf_vin] {:?} stream {}",
                    self.link(),
                    if enable { "on" } else { "off" }
                );
                self.dev.events.notify(SubdevEvent::SourceChanged { changes });
            }
            Transition::Counted(count) => debug!("[stf_vin] {:?} stream count {}", self.link(), count),
            Transition::Idle => warn!("[stf_vin] {:?} stream off requested while stopped", self.link()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::camss::formats::MbusCode;
    use crate::drivers::camss::testing::*;
    use alloc::sync::Arc;
    use alloc::vec;

    type TestVin = VinDevice<Arc<FakeRegs>, Arc<FakeRegs>, Arc<FakeClocks>, Arc<FakeEvents>>;

    type Rig = (TestVin, Arc<FakeRegs>, Arc<FakeRegs>, Arc<FakeClocks>, Arc<FakeEvents>);

    fn vin(kind: VinKind) -> Rig {
        let syscon = Arc::new(FakeRegs::new());
        let isp_regs = Arc::new(FakeRegs::new());
        let clocks = Arc::new(FakeClocks::new());
        let events = Arc::new(FakeEvents::new());
        let dev = VinDevice::new(
            kind,
            syscon.clone(),
            isp_regs.clone(),
            clocks.clone(),
            events.clone(),
            VinConfig::default(),
            IspConfig::default(),
        );
        (dev, syscon, isp_regs, clocks, events)
    }

    #[test]
    fn test_link_table() {
        assert_eq!(Link::new(VinKind::Dvp, LineId::Wr), Link::DvpToWr);
        assert_eq!(Link::new(VinKind::Dvp, LineId::Isp), Link::DvpToIsp);
        assert_eq!(Link::new(VinKind::Csi, LineId::Wr), Link::CsiToWr);
        assert_eq!(Link::new(VinKind::Csi, LineId::Isp), Link::CsiToIsp);
    }

    #[test]
    fn test_line_formats_source_mirrors_sink() {
        let (dev, ..) = vin(VinKind::Csi);
        let line = dev.line(LineId::Wr);
        assert_eq!(line.kind(), SubdevKind::VinCsi);

        let f = line
            .set_format(0, MbusFormat::new(MbusCode::SGBRG10_1X10, 4000, 3001), Which::Active)
            .unwrap();
        assert_eq!((f.code, f.width, f.height), (MbusCode::SGBRG10_1X10, 1920, 1080));
        assert_eq!(line.get_format(1, Which::Active), Ok(f));

        let src = line
            .set_format(1, MbusFormat::new(MbusCode::Y12_1X12, 64, 64), Which::Active)
            .unwrap();
        assert_eq!(src, f);
        assert_eq!(line.get_format(2, Which::Active), Err(CamssError::InvalidPad));

        // 另一条行不受影响
        assert_eq!(
            dev.line(LineId::Isp).get_format(0, Which::Active).unwrap().code,
            MbusCode::SRGGB10_1X10
        );
    }

    #[test]
    fn test_line_selection_unsupported() {
        let (dev, ..) = vin(VinKind::Dvp);
        let line = dev.line(LineId::Isp);
        assert_eq!(
            line.get_selection(0, SelectionTarget::Crop, Which::Active),
            Err(CamssError::InvalidArgument)
        );
        assert_eq!(
            line.set_selection(1, SelectionTarget::Compose, Rect::sized(64, 64), Which::Active),
            Err(CamssError::InvalidArgument)
        );
    }

    #[test]
    fn test_csi_isp_line_start() {
        let (dev, syscon, isp_regs, clocks, _) = vin(VinKind::Csi);
        dev.set_dummy_buffer(LineId::Isp, Some(DummyBuffer::new(0x8000_0000, 0x8020_0000, 4096)));

        let line = dev.line(LineId::Isp);
        line.set_stream(true).unwrap();

        assert_eq!(clocks.rate(ClkId::ApbFunc), Some(49_500_000));
        assert_eq!(clocks.rate(ClkId::MipiRx0Pxl), Some(198_000_000));
        assert_eq!(clocks.parent(ClkId::WrapperClkC), Some(ClkId::MipiRx0Pxl));
        assert_eq!(syscon.get(SYSCFG_MIPI_ISP0), mipi_header_en0(1));
        assert_eq!(isp_regs.get(ISP_REG_Y_PLANE_START_ADDR), 0x8000_0000);
        assert_eq!(isp_regs.get(ISP_REG_UV_PLANE_START_ADDR), 0x8020_0000);
        assert_eq!(dev.frame_skip_remaining(LineId::Isp), 3);
        assert_eq!(syscon.get(SYSCFG_AXIWR0_CTRL), 0);

        // 运行中格式只读
        let cur = line.get_format(0, Which::Active).unwrap();
        let got = line
            .set_format(0, MbusFormat::new(MbusCode::SBGGR10_1X10, 640, 480), Which::Active)
            .unwrap();
        assert_eq!(got, cur);
    }

    #[test]
    fn test_wr_line_start_stop() {
        let (dev, syscon, _, clocks, _) = vin(VinKind::Dvp);
        dev.set_dummy_buffer(LineId::Wr, Some(DummyBuffer::new(0x9000_0000, 0x9000_0000, 4096)));
        syscon.preset(SYSCFG_AXIWR0_INTR, AXIWR0_INTR_MASK);

        let line = dev.line(LineId::Wr);
        line.set_stream(true).unwrap();
        line.set_stream(true).unwrap();
        assert_eq!(line.stream_count(), 2);
        assert_eq!(clocks.rate(ClkId::MipiRx0Pxl), None);
        assert_eq!(syscon.get(SYSCFG_AXIWR0_PING_ADDR), 0x9000_0000);
        assert_eq!(syscon.get(SYSCFG_AXIWR0_PONG_ADDR), 0x9000_0000);
        assert_eq!(syscon.get(SYSCFG_AXIWR0_CTRL) & AXIWR0_EN, AXIWR0_EN);
        assert_eq!(syscon.get(SYSCFG_AXIWR0_INTR) & AXIWR0_INTR_MASK, 0);

        line.set_stream(false).unwrap();
        assert_eq!(syscon.get(SYSCFG_AXIWR0_INTR) & AXIWR0_INTR_MASK, 0);
        line.set_stream(false).unwrap();
        assert_eq!(syscon.get(SYSCFG_AXIWR0_INTR), AXIWR0_INTR_MASK);
        assert_eq!(
            syscon.writes_to(SYSCFG_AXIWR0_INTR),
            [0, AXIWR0_INTR_CLEAN, 0, AXIWR0_INTR_MASK]
        );
        assert_eq!(line.stream_count(), 0);
    }

    #[test]
    fn test_start_without_dummy_buffer_skips_nothing() {
        let (dev, ..) = vin(VinKind::Csi);
        dev.line(LineId::Wr).set_stream(true).unwrap();
        assert_eq!(dev.frame_skip_remaining(LineId::Wr), 0);
    }

    #[test]
    fn test_start_clock_failure_keeps_count() {
        let (dev, _, _, clocks, events) = vin(VinKind::Csi);
        clocks.fail_set_rate(ClkId::MipiRx0Pxl);
        let line = dev.line(LineId::Isp);
        assert_eq!(line.set_stream(true), Err(CamssError::Clock));
        assert_eq!(line.stream_count(), 0);
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_line_stream_edges_notify() {
        let (dev, .., events) = vin(VinKind::Dvp);
        let wr = dev.line(LineId::Wr);
        wr.set_stream(true).unwrap();
        wr.set_stream(true).unwrap();
        wr.set_stream(false).unwrap();
        assert_eq!(events.events(), vec![SubdevEvent::SourceChanged { changes: 1 }]);

        wr.set_stream(false).unwrap();
        wr.set_stream(false).unwrap();
        assert_eq!(
            events.events(),
            vec![
                SubdevEvent::SourceChanged { changes: 1 },
                SubdevEvent::SourceChanged { changes: 0 },
            ]
        );

        // 每条行各自发出边沿事件
        dev.line(LineId::Isp).set_stream(true).unwrap();
        assert_eq!(events.events().len(), 3);
    }
}
