//! pad 格式与 crop/compose 协商
//!
//! 传播方向固定为 sink → crop → compose → source, 保证硬件拿到的
//! crop/compose 组合永远一致. 这里的函数都在调用者持有 pad 锁时运行.

use log::debug;

use crate::drivers::camss::config::IspConfig;
use crate::drivers::camss::error::{CamssError, Result};
use crate::drivers::camss::formats::{FormatGroup, MbusCode};
use crate::drivers::camss::pad::{
    clamp_frame_size, ColorSpace, Field, MbusFormat, Pad, Rect, SelectionTarget, StreamFormat,
};

/// 默认 sink 提议格式 (解析后落到 sink 组第一项)
pub const DEFAULT_SINK_FORMAT: MbusFormat = MbusFormat::new(MbusCode::RGB565_2X8_LE, 1920, 1080);

/// 一份完整的 pad 配置 (活动或试探)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadState {
    pub fmt: [MbusFormat; 2],
    pub crop: StreamFormat,
    pub compose: StreamFormat,
}

impl PadState {
    pub const fn new() -> Self {
        PadState {
            fmt: [MbusFormat::empty(); 2],
            crop: StreamFormat { rect: Rect::new(0, 0, 0, 0), bpp: 0 },
            compose: StreamFormat { rect: Rect::new(0, 0, 0, 0), bpp: 0 },
        }
    }

    pub fn format(&self, pad: Pad) -> MbusFormat {
        self.fmt[pad.index()]
    }

    /// 解析提议格式, 不提交 pad 格式
    ///
    /// source 上解析出的 bpp 会记到 compose 上.
    pub fn try_format(&mut self, cfg: &IspConfig, pad: Pad, proposed: MbusFormat) -> MbusFormat {
        match pad {
            Pad::Sink => {
                let (width, height) = clamp_frame_size(
                    proposed.width,
                    proposed.height,
                    (cfg.min_width, cfg.max_width),
                    (cfg.min_height, cfg.max_height),
                );
                let entry = FormatGroup::SinkRaw.resolve(proposed.code);
                MbusFormat {
                    code: entry.code,
                    width,
                    height,
                    field: Field::None,
                    colorspace: ColorSpace::Srgb,
                }
            }
            Pad::Source => {
                let entry = FormatGroup::SourceProcessed.resolve(proposed.code);
                self.compose.bpp = entry.bpp as u32;

                let mut fmt = self.fmt[Pad::Sink.index()];
                fmt.code = entry.code;
                fmt.width = self.compose.rect.width;
                fmt.height = self.compose.rect.height;
                fmt
            }
        }
    }

    /// 把候选 crop 夹进 sink 格式内
    pub fn try_crop(&self, cfg: &IspConfig, mut rect: Rect) -> Rect {
        let sink = self.fmt[Pad::Sink.index()];

        if rect.width > sink.width {
            rect.width = sink.width;
        }
        if rect.left.saturating_add(rect.width) > sink.width {
            rect.left = sink.width - rect.width;
        }
        if rect.height > sink.height {
            rect.height = sink.height;
        }
        if rect.top.saturating_add(rect.height) > sink.height {
            rect.top = sink.height - rect.height;
        }

        if rect.width < cfg.min_width {
            rect.left = 0;
            rect.width = cfg.min_width;
        }
        if rect.height < cfg.min_height {
            rect.top = 0;
            rect.height = cfg.min_height;
        }
        rect.height &= !1;
        rect
    }

    /// 把候选 compose 夹进 crop 内, 并满足最大下采样比
    ///
    /// 输出窗口总是从原点开始. 高度向上取偶, 以免取偶后违反下采样比.
    pub fn try_compose(&self, cfg: &IspConfig, rect: Rect) -> Rect {
        let crop = self.crop.rect;
        let ratio = cfg.scaler_ratio_max.max(1);

        let mut width = rect.width.min(crop.width);
        let mut height = rect.height.min(crop.height);

        if crop.width as u64 > width as u64 * ratio as u64 {
            width = crop.width.div_ceil(ratio);
        }
        if crop.height as u64 > height as u64 * ratio as u64 {
            height = crop.height.div_ceil(ratio);
        }

        width = width.max(cfg.min_width);
        height = height.max(cfg.min_height);
        if height & 1 != 0 {
            height += 1;
        }

        Rect::sized(width, height)
    }

    /// 提交 pad 格式; sink 会级联重置 crop
    pub fn set_format(&mut self, cfg: &IspConfig, pad: Pad, proposed: MbusFormat) -> MbusFormat {
        let fmt = self.try_format(cfg, pad, proposed);
        self.fmt[pad.index()] = fmt;

        if pad == Pad::Sink {
            self.set_crop(cfg, Rect::sized(fmt.width, fmt.height));
        }
        self.fmt[pad.index()]
    }

    /// 提交 crop 并级联重置 compose
    pub fn set_crop(&mut self, cfg: &IspConfig, rect: Rect) -> Rect {
        let crop = self.try_crop(cfg, rect);
        self.crop.rect = crop;
        debug!(
            "[stf_isp] crop = {}, {}, {}, {}",
            crop.left, crop.top, crop.width, crop.height
        );

        self.set_compose(cfg, Rect::sized(crop.width, crop.height));
        crop
    }

    /// 提交 compose 并级联重新解析 source 格式
    pub fn set_compose(&mut self, cfg: &IspConfig, rect: Rect) -> Rect {
        let compose = self.try_compose(cfg, rect);
        self.compose.rect = compose;
        debug!("[stf_isp] compose = {}x{}", compose.width, compose.height);

        let source = self.fmt[Pad::Source.index()];
        self.set_format(cfg, Pad::Source, source);
        compose
    }

    /// 读取 selection 矩形
    pub fn selection(&self, target: SelectionTarget) -> Result<Rect> {
        match target {
            SelectionTarget::CropBounds | SelectionTarget::CropDefault => {
                let sink = self.fmt[Pad::Sink.index()];
                Ok(Rect::sized(sink.width, sink.height))
            }
            SelectionTarget::Crop => Ok(self.crop.rect),
            SelectionTarget::ComposeBounds | SelectionTarget::ComposeDefault => Ok(self.crop.rect),
            SelectionTarget::Compose => Ok(self.compose.rect),
            SelectionTarget::Other(_) => Err(CamssError::InvalidArgument),
        }
    }

    /// 以默认格式初始化整条传播链
    pub fn init(&mut self, cfg: &IspConfig) {
        self.set_format(cfg, Pad::Sink, DEFAULT_SINK_FORMAT);
    }
}

impl Default for PadState {
    fn default() -> Self {
        Self::new()
    }
}
