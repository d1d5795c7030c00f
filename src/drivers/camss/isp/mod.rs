//! StarFive ISP 子设备
//!
//! 负责 sink→crop→compose→source 的格式协商、数据流引用计数、
//! 电源引用计数、setfile 以及 shadow 锁存计数.
//!
//! 锁顺序: stream → pad 状态; setfile 锁只会在 stream 锁内获取.

pub mod hw;
pub mod negotiate;
pub mod regs;
pub mod setfile;

use alloc::string::{String, ToString};

use log::{debug, error, info, warn};
use spin::Mutex;

use self::negotiate::PadState;
use self::setfile::Setfile;
use super::config::IspConfig;
use super::error::{CamssError, Result, SetfileError};
use super::formats::{FormatGroup, MbusCode};
use super::pad::{MbusFormat, Pad, Rect, SelectionTarget, Which};
use super::shadow::ShadowCount;
use super::subdev::{RefCount, Subdev, SubdevKind, Transition};
use super::{EventKind, InterfaceType, SubdevEvent, STF_CSI_NAME};
use crate::hal::{ClockControl, Delay, EventSink, FirmwareSource, RegisterAccess};

/// 帧尺寸范围 (enum_frame_size 的结果)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizeRange {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

/// ISP 设备
pub struct IspDevice<R, C, E, D> {
    regs: R,
    clocks: C,
    events: E,
    delay: D,
    config: IspConfig,
    active: Mutex<PadState>,
    trial: Mutex<PadState>,
    stream: Mutex<RefCount>,
    power: Mutex<RefCount>,
    shadow: ShadowCount,
    setfile: Mutex<Setfile>,
    upstream: Mutex<Option<String>>,
}

impl<R, C, E, D> IspDevice<R, C, E, D>
where
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
    D: Delay,
{
    /// 创建 ISP 设备, 活动配置与试探配置都以默认格式初始化
    pub fn new(regs: R, clocks: C, events: E, delay: D, config: IspConfig) -> Self {
        let mut active = PadState::new();
        active.init(&config);

        IspDevice {
            regs,
            clocks,
            events,
            delay,
            config,
            active: Mutex::new(active),
            trial: Mutex::new(active),
            stream: Mutex::new(RefCount::new()),
            power: Mutex::new(RefCount::new()),
            shadow: ShadowCount::new(),
            setfile: Mutex::new(Setfile::new()),
            upstream: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &IspConfig {
        &self.config
    }

    /// shadow 锁存计数
    pub fn shadow(&self) -> &ShadowCount {
        &self.shadow
    }

    pub fn stream_count(&self) -> u32 {
        self.stream.lock().count()
    }

    pub fn power_count(&self) -> u32 {
        self.power.lock().count()
    }

    fn pads(&self, which: Which) -> &Mutex<PadState> {
        match which {
            Which::Active => &self.active,
            Which::Try => &self.trial,
        }
    }

    // ============ 格式协商 ============

    /// 读取 pad 格式
    pub fn get_format(&self, pad: u32, which: Which) -> Result<MbusFormat> {
        let pad = Pad::from_index(pad)?;
        Ok(self.pads(which).lock().format(pad))
    }

    /// 解析提议格式, 不提交任何状态
    pub fn try_format(&self, pad: u32, proposed: MbusFormat, which: Which) -> Result<MbusFormat> {
        let pad = Pad::from_index(pad)?;
        let mut scratch = *self.pads(which).lock();
        Ok(scratch.try_format(&self.config, pad, proposed))
    }

    /// 设置 pad 格式; 流运行中返回当前格式不做修改
    pub fn set_format(&self, pad: u32, format: MbusFormat, which: Which) -> Result<MbusFormat> {
        let pad = Pad::from_index(pad)?;
        let stream = self.stream.lock();
        let mut state = self.pads(which).lock();

        if stream.is_active() {
            return Ok(state.format(pad));
        }
        let fmt = state.set_format(&self.config, pad, format);
        debug!(
            "[stf_isp] pad {} format {:#x} {}x{}",
            pad.index(),
            fmt.code.0,
            fmt.width,
            fmt.height
        );
        Ok(fmt)
    }

    /// 读取 selection 矩形
    pub fn get_selection(&self, pad: u32, target: SelectionTarget, which: Which) -> Result<Rect> {
        Pad::from_index(pad)?;
        self.pads(which).lock().selection(target)
    }

    /// 设置 crop / compose; 流运行中返回当前矩形不做修改
    pub fn set_selection(
        &self,
        pad: u32,
        target: SelectionTarget,
        rect: Rect,
        which: Which,
    ) -> Result<Rect> {
        Pad::from_index(pad)?;
        let stream = self.stream.lock();
        let mut state = self.pads(which).lock();

        match target {
            SelectionTarget::Crop => {
                if stream.is_active() {
                    return Ok(state.crop.rect);
                }
                Ok(state.set_crop(&self.config, rect))
            }
            SelectionTarget::Compose => {
                if stream.is_active() {
                    return Ok(state.compose.rect);
                }
                Ok(state.set_compose(&self.config, rect))
            }
            _ => Err(CamssError::InvalidArgument),
        }
    }

    /// 枚举 pad 支持的编码
    pub fn enum_mbus_code(&self, pad: u32, index: u32, which: Which) -> Result<MbusCode> {
        match Pad::from_index(pad)? {
            Pad::Sink => FormatGroup::SinkRaw
                .get(index as usize)
                .map(|f| f.code)
                .ok_or(CamssError::InvalidArgument),
            Pad::Source => {
                if index > 0 {
                    return Err(CamssError::InvalidArgument);
                }
                Ok(self.pads(which).lock().format(Pad::Sink).code)
            }
        }
    }

    /// 枚举给定编码的帧尺寸范围
    pub fn enum_frame_size(
        &self,
        pad: u32,
        code: MbusCode,
        index: u32,
        which: Which,
    ) -> Result<FrameSizeRange> {
        let pad = Pad::from_index(pad)?;
        if index != 0 {
            return Err(CamssError::InvalidArgument);
        }

        // 在副本上试探, 不影响已提交的状态
        let mut scratch = *self.pads(which).lock();
        let min = scratch.try_format(&self.config, pad, MbusFormat::new(code, 1, 1));
        if min.code != code {
            return Err(CamssError::InvalidArgument);
        }
        let max = scratch.try_format(&self.config, pad, MbusFormat::new(code, u32::MAX, u32::MAX));
        if max.code != code {
            return Err(CamssError::InvalidArgument);
        }

        Ok(FrameSizeRange {
            min_width: min.width,
            max_width: max.width,
            min_height: min.height,
            max_height: max.height,
        })
    }

    /// 打开子设备节点: 以默认格式初始化试探配置
    pub fn open(&self) {
        self.trial.lock().init(&self.config);
    }

    /// 关闭子设备节点: 丢弃未确认的 shadow 锁存
    pub fn close(&self) {
        let drained = self.shadow.drain();
        if drained > 0 {
            warn!("[stf_isp] dropped {} pending shadow latch(es) on close", drained);
        }
    }

    // ============ 链路 ============

    /// 建立 / 断开 sink pad 的上游链路
    pub fn link_setup(&self, remote: &str, enable: bool) -> Result<()> {
        let mut upstream = self.upstream.lock();
        if enable {
            if upstream.is_some() {
                return Err(CamssError::Busy);
            }
            *upstream = Some(remote.to_string());
        } else if upstream.as_deref() == Some(remote) {
            *upstream = None;
        }
        Ok(())
    }

    /// 由上游链路推出接口类型
    pub fn interface_type(&self) -> Result<InterfaceType> {
        match self.upstream.lock().as_deref() {
            Some(name) if name.starts_with(STF_CSI_NAME) => Ok(InterfaceType::Csi),
            _ => Err(CamssError::PipelineNotConfigured),
        }
    }

    /// 订阅事件, 只支持 source change
    pub fn subscribe_event(&self, kind: EventKind) -> Result<()> {
        match kind {
            EventKind::SourceChange => Ok(()),
            _ => Err(CamssError::InvalidArgument),
        }
    }

    // ============ 数据流 / 电源 ============

    /// 开 / 关数据流 (边沿触发)
    pub fn set_stream(&self, enable: bool) -> Result<()> {
        let mut stream = self.stream.lock();

        let transition = if enable {
            stream.get(|| self.start_streaming())?
        } else {
            stream.put(|| self.stop_streaming())
        };

        match transition {
            Transition::Edge(count) => {
                debug!("[stf_isp] stream {}", if enable { "on" } else { "off" });
                self.events.notify(SubdevEvent::SourceChanged { changes: count });
            }
            Transition::Counted(count) => debug!("[stf_isp] stream count {}", count),
            Transition::Idle => warn!("[stf_isp] stream off requested while stopped"),
        }
        Ok(())
    }

    fn start_streaming(&self) -> Result<()> {
        self.clk_enable()?;
        self.config_set();

        let interface = match self.interface_type() {
            Ok(interface) => interface,
            Err(e) => {
                error!("[stf_isp] pipeline not config");
                self.clk_disable();
                return Err(e);
            }
        };

        {
            let state = self.active.lock();
            self.hw_set_format(&state, interface);
        }
        self.reset();
        self.stream_set(true);
        Ok(())
    }

    fn stop_streaming(&self) {
        self.stream_set(false);
        self.clk_disable();
    }

    /// 电源引用计数 (边沿触发)
    pub fn set_power(&self, on: bool) {
        let mut power = self.power.lock();
        if on {
            let transition = power.get(|| {
                self.clocks.power_on();
                Ok(())
            });
            if let Ok(Transition::Edge(_)) = transition {
                info!("[stf_isp] turn on isp");
            }
        } else if let Transition::Edge(_) = power.put(|| self.clocks.power_off()) {
            info!("[stf_isp] turn off isp");
        }
    }

    // ============ setfile ============

    /// 加载 setfile 固件; 失败时保留原表
    pub fn load_setfile<F: FirmwareSource + ?Sized>(&self, firmware: &F) -> Result<()> {
        let data = firmware
            .request_firmware(self.config.setfile_name)
            .map_err(|_| CamssError::SetfileLoadError(SetfileError::FirmwareUnavailable))?;

        let parsed = Setfile::parse(&data, self.config.reg_offset_max).map_err(|e| {
            error!("[stf_isp] reject setfile {}: {}", self.config.setfile_name, e);
            CamssError::from(e)
        })?;

        *self.setfile.lock() = parsed;
        Ok(())
    }

    /// 立即写入已加载的 setfile
    pub fn apply_setfile(&self) {
        let setfile = self.setfile.lock();
        setfile.apply(&self.regs, &self.delay, self.config.reg_delay_max_ms);
    }

    pub fn setfile_len(&self) -> usize {
        self.setfile.lock().settings().len()
    }
}

impl<R, C, E, D> Subdev for IspDevice<R, C, E, D>
where
    R: RegisterAccess,
    C: ClockControl,
    E: EventSink,
    D: Delay,
{
    fn kind(&self) -> SubdevKind {
        SubdevKind::Isp
    }

    fn get_format(&self, pad: u32, which: Which) -> Result<MbusFormat> {
        IspDevice::get_format(self, pad, which)
    }

    fn set_format(&self, pad: u32, format: MbusFormat, which: Which) -> Result<MbusFormat> {
        IspDevice::set_format(self, pad, format, which)
    }

    fn get_selection(&self, pad: u32, target: SelectionTarget, which: Which) -> Result<Rect> {
        IspDevice::get_selection(self, pad, target, which)
    }

    fn set_selection(
        &self,
        pad: u32,
        target: SelectionTarget,
        rect: Rect,
        which: Which,
    ) -> Result<Rect> {
        IspDevice::set_selection(self, pad, target, rect, which)
    }

    fn set_stream(&self, enable: bool) -> Result<()> {
        IspDevice::set_stream(self, enable)
    }
}
