//! 格式表
//!
//! 每个 pad 类别一组支持的 media bus 编码:
//! - sink: 10 位 Bayer RAW
//! - source (UO 输出): Y12
//! - alt raw: 12 位 Bayer RAW

/// media bus 像素编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MbusCode(pub u32);

impl MbusCode {
    pub const RGB565_2X8_LE: MbusCode = MbusCode(0x1008);
    pub const Y12_1X12: MbusCode = MbusCode(0x2013);
    pub const SBGGR10_1X10: MbusCode = MbusCode(0x3007);
    pub const SBGGR12_1X12: MbusCode = MbusCode(0x3008);
    pub const SGRBG10_1X10: MbusCode = MbusCode(0x300a);
    pub const SGBRG10_1X10: MbusCode = MbusCode(0x300e);
    pub const SRGGB10_1X10: MbusCode = MbusCode(0x300f);
    pub const SGBRG12_1X12: MbusCode = MbusCode(0x3010);
    pub const SGRBG12_1X12: MbusCode = MbusCode(0x3011);
    pub const SRGGB12_1X12: MbusCode = MbusCode(0x3012);

    /// Bayer 排列 (R/Gr/Gb/B 的起始相位), 非 Bayer 编码返回 None
    pub fn bayer_order(self) -> Option<BayerOrder> {
        match self {
            MbusCode::SRGGB10_1X10 | MbusCode::SRGGB12_1X12 => Some(BayerOrder::Rggb),
            MbusCode::SGRBG10_1X10 | MbusCode::SGRBG12_1X12 => Some(BayerOrder::Grbg),
            MbusCode::SGBRG10_1X10 | MbusCode::SGBRG12_1X12 => Some(BayerOrder::Gbrg),
            MbusCode::SBGGR10_1X10 | MbusCode::SBGGR12_1X12 => Some(BayerOrder::Bggr),
            _ => None,
        }
    }
}

/// Bayer 排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayerOrder {
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

/// 格式表项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatEntry {
    pub code: MbusCode,
    pub bpp: u8,
}

/// 格式组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatGroup {
    SinkRaw = 0,
    SourceProcessed = 1,
    AltRaw = 2,
}

static ISP_FORMATS_SINK: [FormatEntry; 4] = [
    FormatEntry { code: MbusCode::SRGGB10_1X10, bpp: 10 },
    FormatEntry { code: MbusCode::SGRBG10_1X10, bpp: 10 },
    FormatEntry { code: MbusCode::SGBRG10_1X10, bpp: 10 },
    FormatEntry { code: MbusCode::SBGGR10_1X10, bpp: 10 },
];

static ISP_FORMATS_RAW: [FormatEntry; 4] = [
    FormatEntry { code: MbusCode::SRGGB12_1X12, bpp: 12 },
    FormatEntry { code: MbusCode::SGRBG12_1X12, bpp: 12 },
    FormatEntry { code: MbusCode::SGBRG12_1X12, bpp: 12 },
    FormatEntry { code: MbusCode::SBGGR12_1X12, bpp: 12 },
];

static ISP_FORMATS_UO: [FormatEntry; 1] = [FormatEntry { code: MbusCode::Y12_1X12, bpp: 8 }];

impl FormatGroup {
    /// 组内全部表项
    pub fn entries(self) -> &'static [FormatEntry] {
        match self {
            FormatGroup::SinkRaw => &ISP_FORMATS_SINK,
            FormatGroup::SourceProcessed => &ISP_FORMATS_UO,
            FormatGroup::AltRaw => &ISP_FORMATS_RAW,
        }
    }

    /// 查找编码, 返回 (索引, bpp)
    pub fn lookup(self, code: MbusCode) -> Option<(usize, u8)> {
        self.entries()
            .iter()
            .position(|f| f.code == code)
            .map(|i| (i, self.entries()[i].bpp))
    }

    /// 解析编码: 命中则原样返回, 否则退回组内第一项
    pub fn resolve(self, code: MbusCode) -> FormatEntry {
        match self.lookup(code) {
            Some((i, _)) => self.entries()[i],
            None => self.entries()[0],
        }
    }

    /// 按索引取表项
    pub fn get(self, index: usize) -> Option<&'static FormatEntry> {
        self.entries().get(index)
    }
}
