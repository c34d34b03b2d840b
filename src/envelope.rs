//! # 负载信封模块
//!
//! 信封格式 (长度前缀均为大端序)：
//!
//! ```text
//! 明文:  len(data): u32 || data || extension || 0x00
//! 加密:  len(ciphertext): u32 || ciphertext
//! ```
//!
//! 其中 `ciphertext` 是对明文信封整体加密的结果。

use std::path::Path;

use crate::constants::{EXTENSION_TERMINATOR, LENGTH_PREFIX_BYTES};
use crate::crypto::Crypto;
use crate::error::StegoError;

/// 要隐藏的文件：原始字节和扩展名 (含前导 `.`，可以为空)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Vec<u8>,
    pub extension: String,
}

impl Payload {
    pub fn new(data: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            data,
            extension: extension.into(),
        }
    }

    /// 以文件名的扩展名构建负载。
    pub fn from_file(data: Vec<u8>, path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        Self::new(data, extension_of(&name))
    }
}

/// 返回文件名中最后一个 `.` 及其之后的部分。
///
/// 没有 `.` 或 `.` 在开头 (隐藏文件) 时返回空字符串；以 `.` 结尾的文件名得到 `"."`。
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[i..],
        _ => "",
    }
}

fn length_prefix(len: usize) -> Result<[u8; LENGTH_PREFIX_BYTES], StegoError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| StegoError::PayloadTooLarge(len))
}

/// 读取长度前缀，并确认其后至少还有这么多字节。
fn split_prefixed(bytes: &[u8]) -> Result<(&[u8], &[u8]), StegoError> {
    let Some((prefix, rest)) = bytes.split_first_chunk::<LENGTH_PREFIX_BYTES>() else {
        return Err(StegoError::TruncatedEnvelope {
            declared: LENGTH_PREFIX_BYTES,
            available: bytes.len(),
        });
    };

    let declared = u32::from_be_bytes(*prefix) as usize;
    if declared > rest.len() {
        return Err(StegoError::TruncatedEnvelope {
            declared,
            available: rest.len(),
        });
    }
    Ok(rest.split_at(declared))
}

/// 序列化负载：`len || data || extension || 0x00`。
pub fn serialize(payload: &Payload) -> Result<Vec<u8>, StegoError> {
    let extension = payload.extension.as_bytes();
    if extension.contains(&EXTENSION_TERMINATOR) {
        return Err(StegoError::InvalidExtension(payload.extension.clone()));
    }
    let mut out =
        Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.data.len() + extension.len() + 1);
    out.extend_from_slice(&length_prefix(payload.data.len())?);
    out.extend_from_slice(&payload.data);
    out.extend_from_slice(extension);
    out.push(EXTENSION_TERMINATOR);
    Ok(out)
}

/// 反序列化负载。`bytes` 末尾可以有任意多的无关数据。
///
/// # Errors
///
/// * 长度前缀大于剩余数据时返回 `TruncatedEnvelope`。
/// * 扩展名没有结束符时返回 `UnterminatedExtension`。
pub fn deserialize(bytes: &[u8]) -> Result<Payload, StegoError> {
    let (data, rest) = split_prefixed(bytes)?;
    let end = rest
        .iter()
        .position(|&b| b == EXTENSION_TERMINATOR)
        .ok_or(StegoError::UnterminatedExtension)?;

    Ok(Payload {
        data: data.to_vec(),
        extension: String::from_utf8_lossy(&rest[..end]).into_owned(),
    })
}

/// 加密并封装：`len(ciphertext) || ciphertext`。
pub fn seal(payload: &Payload, crypto: &Crypto) -> Result<Vec<u8>, StegoError> {
    let ciphertext = crypto.encrypt(&serialize(payload)?)?;
    let mut out = Vec::with_capacity(LENGTH_PREFIX_BYTES + ciphertext.len());
    out.extend_from_slice(&length_prefix(ciphertext.len())?);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// 解封并解密。
pub fn open(bytes: &[u8], crypto: &Crypto) -> Result<Payload, StegoError> {
    let (ciphertext, _) = split_prefixed(bytes)?;
    deserialize(&crypto.decrypt(ciphertext)?)
}

/// 根据是否配置了加密选择 `serialize` 或 `seal`。
pub fn encode(payload: &Payload, crypto: Option<&Crypto>) -> Result<Vec<u8>, StegoError> {
    match crypto {
        Some(crypto) => seal(payload, crypto),
        None => serialize(payload),
    }
}

/// `encode` 的逆操作。
pub fn decode(bytes: &[u8], crypto: Option<&Crypto>) -> Result<Payload, StegoError> {
    match crypto {
        Some(crypto) => open(bytes, crypto),
        None => deserialize(bytes),
    }
}
