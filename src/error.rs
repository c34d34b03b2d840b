//! # 错误类型模块
//!
//! 定义了隐写核心、信封解析以及加密适配器可能产生的全部错误。
//! 这些错误在库内部原样传播，由 `handler` 层附加上下文后报告给用户。

use thiserror::Error;

/// 隐写核心的错误类型。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StegoError {
    /// 载体文件头无法读取，或文件过短。
    #[error("Malformed carrier: {0}")]
    MalformedCarrier(String),

    /// 负载无法放入载体。在修改载体之前检查。
    #[error("Not enough space in the carrier. Required: {required} bits, Available: {available} bits")]
    InsufficientCapacity { required: usize, available: usize },

    /// 负载长度超出 `u32` 可表示的范围。
    #[error("Payload too large: {0} bytes does not fit in a 32-bit length prefix")]
    PayloadTooLarge(usize),

    /// 扩展名中含有结束符 0x00，无法正确往返。
    #[error("Invalid extension {0:?}: it must not contain a NUL byte")]
    InvalidExtension(String),

    /// 长度前缀与实际可用的数据不一致。
    #[error("Truncated envelope: length prefix {declared} exceeds the {available} bytes available")]
    TruncatedEnvelope { declared: usize, available: usize },

    /// 在找到扩展名结束符之前数据已经耗尽。
    #[error("Unterminated extension: no terminator found before the end of the extracted data")]
    UnterminatedExtension,

    #[error("Unsupported algorithm: {0} (expected one of aes128, aes192, aes256, des, 3des)")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported mode: {0} (expected one of ecb, cbc, cfb, ofb)")]
    UnsupportedMode(String),

    #[error("Unsupported steganography method: {0} (expected one of LSB1, LSB4, LSBI)")]
    UnsupportedScheme(String),

    /// 解密失败 (通常是密码、算法或模式不匹配导致的填充错误)。
    #[error("Decryption failed: {0}")]
    Decryption(String),
}
