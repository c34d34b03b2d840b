//! # 载体缓冲区模块
//!
//! 持有 BMP 文件的全部原始字节，并记录像素数据的起始位置。
//! 嵌入操作会原地修改这些字节，但从不改变其长度。

use crate::constants::{BMP_FILE_HEADER_SIZE, PIXEL_OFFSET_FIELD};
use crate::error::StegoError;

/// 一个 BMP 载体：原始文件字节加上像素数据偏移量。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    bytes: Vec<u8>,
    pixel_offset: usize,
}

impl Carrier {
    /// 从完整的文件字节构建载体。
    ///
    /// # Errors
    ///
    /// 如果文件比 BMP 文件头还短，或偏移量超出文件长度，返回 `MalformedCarrier`。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, StegoError> {
        let pixel_offset = locate_pixel_offset(&bytes)? as usize;
        if pixel_offset > bytes.len() {
            return Err(StegoError::MalformedCarrier(format!(
                "pixel data offset {} exceeds the file length {}",
                pixel_offset,
                bytes.len()
            )));
        }

        tracing::debug!(pixel_offset, len = bytes.len(), "carrier loaded");
        Ok(Self {
            bytes,
            pixel_offset,
        })
    }

    pub fn pixel_offset(&self) -> usize {
        self.pixel_offset
    }

    /// 可用于隐写的载体单元 (字节) 数。
    pub fn available_units(&self) -> usize {
        self.bytes.len() - self.pixel_offset
    }

    /// 像素数据区域 (只读)。
    pub fn pixels(&self) -> &[u8] {
        &self.bytes[self.pixel_offset..]
    }

    /// 像素数据区域 (可写)。
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.pixel_offset..]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// 读取 BMP 文件头中的像素数据偏移量字段 (小端序)。
pub fn locate_pixel_offset(bytes: &[u8]) -> Result<u32, StegoError> {
    if bytes.len() < BMP_FILE_HEADER_SIZE {
        return Err(StegoError::MalformedCarrier(format!(
            "file is {} bytes, shorter than the {}-byte BMP header",
            bytes.len(),
            BMP_FILE_HEADER_SIZE
        )));
    }

    let mut field = [0u8; 4];
    field.copy_from_slice(&bytes[PIXEL_OFFSET_FIELD..PIXEL_OFFSET_FIELD + 4]);
    Ok(u32::from_le_bytes(field))
}
