//! pad、格式与矩形

use super::error::{CamssError, Result};
use super::formats::MbusCode;

/// pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    Sink = 0,
    Source = 1,
}

impl Pad {
    /// 由索引得到 pad, 越界返回 `InvalidPad`
    pub fn from_index(index: u32) -> Result<Pad> {
        match index {
            0 => Ok(Pad::Sink),
            1 => Ok(Pad::Source),
            _ => Err(CamssError::InvalidPad),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 活动配置或试探配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    Active,
    Try,
}

/// 场序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Any,
    None,
}

/// 色彩空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Default,
    Srgb,
}

/// media bus 帧格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbusFormat {
    pub code: MbusCode,
    pub width: u32,
    pub height: u32,
    pub field: Field,
    pub colorspace: ColorSpace,
}

impl MbusFormat {
    /// 只给出编码与尺寸的提议格式
    pub const fn new(code: MbusCode, width: u32, height: u32) -> Self {
        MbusFormat {
            code,
            width,
            height,
            field: Field::Any,
            colorspace: ColorSpace::Default,
        }
    }

    pub const fn empty() -> Self {
        Self::new(MbusCode(0), 0, 0)
    }
}

/// 矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Rect { left, top, width, height }
    }

    /// 原点处给定尺寸的矩形
    pub const fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// 矩形 + 对应的像素位宽
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamFormat {
    pub rect: Rect,
    pub bpp: u32,
}

/// selection target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Crop,
    CropDefault,
    CropBounds,
    Compose,
    ComposeDefault,
    ComposeBounds,
    /// 本驱动不支持的其他 target (如 NATIVE_SIZE), 携带原始编号
    Other(u32),
}

/// 将 sink 提议尺寸夹到 [min, max] 并把高度取偶
pub(crate) fn clamp_frame_size(
    width: u32,
    height: u32,
    (min_w, max_w): (u32, u32),
    (min_h, max_h): (u32, u32),
) -> (u32, u32) {
    let width = width.clamp(min_w, max_w);
    let height = height.clamp(min_h, max_h) & !1;
    (width, height)
}
