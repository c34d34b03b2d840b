/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
/// 比这更短的文件不可能是合法的 BMP 载体。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// 像素数据起始偏移量字段在 BMP 文件头中的位置。
/// 该字段为 4 字节小端序无符号整数。
pub const PIXEL_OFFSET_FIELD: usize = 10;

/// 信封中长度前缀占用的字节数 (大端序 `u32`)。
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// 扩展名之后的结束符。
pub const EXTENSION_TERMINATOR: u8 = 0x00;

/// LSBI 在像素区开头保留的字节数，用于存放 4 个模式的反转标志。
pub const LSBI_FLAG_BYTES: usize = 4;

/// LSBI 中每个像素占用的通道数 (B, G, R)。
/// 前两个通道承载数据，第三个通道 (红色) 始终跳过。
pub const LSBI_CHANNELS: usize = 3;

/// PBKDF2 的迭代次数。
pub const KDF_ITERATIONS: u32 = 1000;

/// PBKDF2 使用的固定盐值 (8 个零字节)，保证相同密码总是得到相同的密钥和 IV。
pub const KDF_SALT: [u8; 8] = [0; 8];
