//! # 位流遍历器
//!
//! 三种隐写方式共享同一套位级逻辑：按载体顺序遍历"覆盖字节"，
//! 每个覆盖字节的低位承载负载位流中的一段 (1 位或 4 位，高位在前)。
//! 不同方式之间的差别只在于每单元位数以及哪些通道被跳过。

/// 描述负载位如何映射到载体字节上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// 每个覆盖字节承载的位数 (必须整除 8)。
    pub bits_per_unit: u32,
    /// 通道分组的步长 (每个像素的字节数)。
    pub stride: usize,
    /// 每组中从头开始使用的通道数，其余通道跳过。
    pub used: usize,
}

impl Layout {
    /// 每个字节 1 位，不跳过任何字节。
    pub const ONE_BIT: Layout = Layout {
        bits_per_unit: 1,
        stride: 1,
        used: 1,
    };

    /// 每个字节 4 位 (一个半字节)，不跳过任何字节。
    pub const NIBBLE: Layout = Layout {
        bits_per_unit: 4,
        stride: 1,
        used: 1,
    };

    /// 每个字节 1 位，每三个字节中只使用前两个 (蓝、绿)，跳过红色通道。
    pub const BLUE_GREEN: Layout = Layout {
        bits_per_unit: 1,
        stride: 3,
        used: 2,
    };

    /// 低位掩码，例如 1 位时为 `0b1`，4 位时为 `0b1111`。
    pub fn mask(&self) -> u8 {
        ((1u16 << self.bits_per_unit) - 1) as u8
    }

    pub fn is_covered(&self, index: usize) -> bool {
        index % self.stride < self.used
    }

    /// `units` 个字节中覆盖字节的数量。
    pub fn covered_units(&self, units: usize) -> usize {
        (units / self.stride) * self.used + (units % self.stride).min(self.used)
    }

    /// `units` 个字节能承载的总位数。
    pub fn capacity_bits(&self, units: usize) -> usize {
        self.covered_units(units) * self.bits_per_unit as usize
    }

    /// 按升序返回 `region` 中所有覆盖字节的下标。
    pub fn positions(&self, len: usize) -> impl Iterator<Item = usize> + use<> {
        let layout = *self;
        (0..len).filter(move |&i| layout.is_covered(i))
    }

    /// 将负载切分为若干段，每段 `bits_per_unit` 位，字节内高位在前。
    pub fn chunks<'a>(&self, payload: &'a [u8]) -> impl Iterator<Item = u8> + use<'a> {
        let bits = self.bits_per_unit;
        let mask = self.mask();
        let per_byte = 8 / bits;
        payload.iter().flat_map(move |&byte| {
            (0..per_byte)
                .rev()
                .map(move |slot| (byte >> (slot * bits)) & mask)
        })
    }
}

/// 将负载写入 `region` 中的覆盖字节，保留每个字节未被占用的高位。
///
/// 调用方必须事先确认容量足够。
pub fn write(region: &mut [u8], layout: Layout, payload: &[u8]) {
    let mask = layout.mask();
    layout
        .positions(region.len())
        .zip(layout.chunks(payload))
        .for_each(|(i, chunk)| region[i] = (region[i] & !mask) | chunk);
}

/// 按 `bits_per_unit` 位一段收集数值，每满 8 位输出一个字节。
#[derive(Debug, Default)]
pub struct Accumulator {
    current: u16,
    filled: u32,
    out: Vec<u8>,
}

impl Accumulator {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            current: 0,
            filled: 0,
            out: Vec::with_capacity(bytes),
        }
    }

    pub fn push(&mut self, value: u8, bits: u32) {
        self.current = (self.current << bits) | u16::from(value);
        self.filled += bits;
        if self.filled == 8 {
            self.out.push(self.current as u8);
            self.current = 0;
            self.filled = 0;
        }
    }

    /// 返回已完成的字节，不完整的尾部位被丢弃。
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// 读出 `region` 中所有覆盖字节承载的数据，直到载体耗尽。
///
/// `value` 从覆盖字节中取出 `bits_per_unit` 位，供需要额外变换的方式 (LSBI) 使用。
pub fn read_with(region: &[u8], layout: Layout, value: impl Fn(u8) -> u8) -> Vec<u8> {
    let mut acc = Accumulator::with_capacity(layout.capacity_bits(region.len()) / 8);
    layout
        .positions(region.len())
        .for_each(|i| acc.push(value(region[i]), layout.bits_per_unit));
    acc.finish()
}

/// 读出覆盖字节的低位。
pub fn read(region: &[u8], layout: Layout) -> Vec<u8> {
    let mask = layout.mask();
    read_with(region, layout, |byte| byte & mask)
}
