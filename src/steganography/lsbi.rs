//! # LSBI (带模式反转的 LSB) 隐写
//!
//! 只使用每个像素的蓝、绿通道，每个覆盖字节承载 1 位。
//! 覆盖字节的"模式"是其第 1、2 位组成的 2 位数值；由于嵌入只改动第 0 位，
//! 模式在嵌入前后保持不变，因此可以安全地作为分类键。
//!
//! 编码分为两遍：
//! 1. 嵌入并统计每个模式下被改变/未改变的最低位数量；
//! 2. 对"改变多于未改变"的模式，把该模式下所有承载数据的字节的最低位取反。
//!
//! 四个反转标志写入像素区开头保留的 4 个字节的最低位，解码时据此还原。

use super::bits::{self, Layout};
use crate::constants::LSBI_FLAG_BYTES;

/// 模式的取值个数 (2 位)。
pub const PATTERNS: usize = 4;

/// 覆盖字节的模式：第 1、2 位。
pub fn pattern(byte: u8) -> usize {
    ((byte >> 1) & 0b11) as usize
}

/// 某一模式下最低位被改变与未被改变的次数。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatternCount {
    pub changed: usize,
    pub unchanged: usize,
}

/// 每个模式的统计结果。
pub type PatternStatistics = [PatternCount; PATTERNS];

/// 每个模式是否需要反转。
pub type InversionMap = [bool; PATTERNS];

/// 第一遍：把负载逐位写入覆盖字节的最低位，同时统计每个模式的改变情况。
///
/// `covered` 为覆盖区域 (不含标志字节)。返回统计结果，覆盖字节已被原地修改。
pub fn compute_statistics(covered: &mut [u8], payload: &[u8]) -> PatternStatistics {
    let layout = Layout::BLUE_GREEN;
    let mut stats = PatternStatistics::default();

    for (i, bit) in layout.positions(covered.len()).zip(layout.chunks(payload)) {
        let byte = covered[i];
        let count = &mut stats[pattern(byte)];
        if byte & 1 == bit {
            count.unchanged += 1;
        } else {
            count.changed += 1;
        }
        covered[i] = (byte & !1) | bit;
    }

    stats
}

/// 根据统计结果决定每个模式是否反转。
///
/// 只有观察到至少两次、且改变次数严格多于未改变次数的模式才会反转。
pub fn decide(stats: &PatternStatistics) -> InversionMap {
    stats.map(|count| count.changed + count.unchanged > 1 && count.changed > count.unchanged)
}

/// 第二遍：对前 `bit_count` 个覆盖字节中属于需反转模式的字节，翻转最低位。
pub fn apply_inversion(covered: &mut [u8], bit_count: usize, map: &InversionMap) {
    for i in Layout::BLUE_GREEN.positions(covered.len()).take(bit_count) {
        if map[pattern(covered[i])] {
            covered[i] ^= 1;
        }
    }
}

/// 将反转标志写入保留字节的最低位。
pub fn write_flags(reserved: &mut [u8], map: &InversionMap) {
    for (byte, &flag) in reserved.iter_mut().zip(map) {
        *byte = (*byte & !1) | u8::from(flag);
    }
}

pub fn read_flags(reserved: &[u8]) -> InversionMap {
    let mut map = InversionMap::default();
    for (flag, &byte) in map.iter_mut().zip(reserved) {
        *flag = byte & 1 == 1;
    }
    map
}

/// 在像素区中完成整个 LSBI 编码。调用方需事先检查容量。
pub fn embed(pixels: &mut [u8], payload: &[u8]) -> InversionMap {
    let (reserved, covered) = pixels.split_at_mut(LSBI_FLAG_BYTES);

    let stats = compute_statistics(covered, payload);
    let map = decide(&stats);
    tracing::debug!(?stats, ?map, "LSBI pattern statistics");

    apply_inversion(covered, payload.len() * 8, &map);
    write_flags(reserved, &map);
    map
}

/// 从像素区中读出所有覆盖字节承载的位，按反转标志还原。
pub fn extract(pixels: &[u8]) -> Vec<u8> {
    if pixels.len() < LSBI_FLAG_BYTES {
        return Vec::new();
    }
    let (reserved, covered) = pixels.split_at(LSBI_FLAG_BYTES);
    let map = read_flags(reserved);
    tracing::debug!(?map, "LSBI inversion flags");

    bits::read_with(covered, Layout::BLUE_GREEN, |byte| {
        (byte & 1) ^ u8::from(map[pattern(byte)])
    })
}
