//! # bmp_stego 库
//!
//! 本库包含 BMP 隐写工具的核心逻辑：载体解析、负载信封、加密适配器以及
//! LSB1 / LSB4 / LSBI 三种隐写方式。

// 声明库包含的所有模块。

pub mod carrier;
pub mod cli;
pub mod constants;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod steganography;

pub use carrier::Carrier;
pub use crypto::{Algorithm, Crypto, Mode};
pub use envelope::Payload;
pub use error::StegoError;
pub use steganography::Scheme;
