//! # 隐写核心模块
//!
//! 提供三种隐写方式 (`LSB1`, `LSB4`, `LSBI`) 的统一入口，以及容量规划。
//! 所有方式都在写入前完成容量检查，失败时载体保持原样。

use std::fmt;
use std::str::FromStr;

use crate::carrier::Carrier;
use crate::constants::LSBI_FLAG_BYTES;
use crate::error::StegoError;

pub mod bits;
pub mod lsbi;

use bits::Layout;

/// 隐写方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// 每个像素字节 1 位。
    Lsb1,
    /// 每个像素字节 4 位。
    Lsb4,
    /// 蓝、绿通道各 1 位，并按模式反转以降低统计特征。
    Lsbi,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Lsb1, Scheme::Lsb4, Scheme::Lsbi];

    fn layout(self) -> Layout {
        match self {
            Scheme::Lsb1 => Layout::ONE_BIT,
            Scheme::Lsb4 => Layout::NIBBLE,
            Scheme::Lsbi => Layout::BLUE_GREEN,
        }
    }

    /// 像素区开头不承载数据的保留字节数。
    fn reserved_units(self) -> usize {
        match self {
            Scheme::Lsbi => LSBI_FLAG_BYTES,
            Scheme::Lsb1 | Scheme::Lsb4 => 0,
        }
    }

    /// `available_units` 个像素字节能承载的总位数。
    pub fn capacity_bits(self, available_units: usize) -> usize {
        let units = available_units.saturating_sub(self.reserved_units());
        self.layout().capacity_bits(units)
    }

    /// 将负载写入载体的像素区。
    ///
    /// # Errors
    ///
    /// 容量不足时返回 `InsufficientCapacity`，此时载体未被修改。
    pub fn embed(self, carrier: &mut Carrier, payload: &[u8]) -> Result<(), StegoError> {
        ensure_capacity(self, carrier.available_units(), payload)?;
        tracing::debug!(
            scheme = %self,
            offset = carrier.pixel_offset(),
            bits = required_bits(payload),
            "embedding payload"
        );

        let pixels = carrier.pixels_mut();
        match self {
            Scheme::Lsb1 | Scheme::Lsb4 => bits::write(pixels, self.layout(), payload),
            Scheme::Lsbi => {
                lsbi::embed(pixels, payload);
            }
        }
        Ok(())
    }

    /// 读出像素区承载的全部数据 (直到载体末尾)。
    ///
    /// 有意义的前缀长度由信封的长度前缀决定。
    pub fn extract(self, carrier: &Carrier) -> Vec<u8> {
        let pixels = carrier.pixels();
        match self {
            Scheme::Lsb1 | Scheme::Lsb4 => bits::read(pixels, self.layout()),
            Scheme::Lsbi => lsbi::extract(pixels),
        }
    }
}

impl FromStr for Scheme {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LSB1" => Ok(Scheme::Lsb1),
            "LSB4" => Ok(Scheme::Lsb4),
            "LSBI" => Ok(Scheme::Lsbi),
            _ => Err(StegoError::UnsupportedScheme(s.to_string())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Lsb1 => "LSB1",
            Scheme::Lsb4 => "LSB4",
            Scheme::Lsbi => "LSBI",
        })
    }
}

/// 负载所需的位数。
pub fn required_bits(payload: &[u8]) -> usize {
    payload.len() * 8
}

/// 检查负载是否能放入载体。
pub fn ensure_capacity(
    scheme: Scheme,
    available_units: usize,
    payload: &[u8],
) -> Result<(), StegoError> {
    let required = required_bits(payload);
    let available = scheme.capacity_bits(available_units);
    // 保留字节本身放不下时，即使负载为空也无法嵌入
    if required > available || available_units < scheme.reserved_units() {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }
    Ok(())
}
