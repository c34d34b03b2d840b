//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::crypto::{Algorithm, Crypto, Mode};
use crate::steganography::Scheme;

/// 一款在未压缩 BMP 图像的像素数据中隐藏任意文件的命令行工具，支持 LSB1、LSB4 和 LSBI 三种方式。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款在未压缩 BMP 图像的像素数据中隐藏任意文件的命令行工具，支持 LSB1、LSB4 和 LSBI 三种方式，并可选择在隐藏前加密。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：embed (隐藏) 和 extract (提取)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将文件隐藏到 BMP 图像中。
    Embed(EmbedArgs),

    /// 从经过隐写的 BMP 图像中提取隐藏的文件。
    Extract(ExtractArgs),
}

/// 'embed' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EmbedArgs {
    /// 要隐藏的文件路径。
    #[arg(short, long = "in")]
    pub input: PathBuf,

    /// 作为载体的 BMP 图像路径。
    #[arg(short = 'p', long)]
    pub carrier: PathBuf,

    /// 隐写完成后，保存结果图像的输出路径。默认为载体旁的 `stego_<载体文件名>`。
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// 隐写方式：LSB1、LSB4 或 LSBI。
    #[arg(short, long)]
    pub steg: Scheme,

    #[command(flatten)]
    pub encryption: EncryptionArgs,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'extract' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// 已隐藏文件的 BMP 图像路径。
    #[arg(short = 'p', long)]
    pub carrier: PathBuf,

    /// 提取结果的输出路径 (不含扩展名，扩展名取自隐藏的数据)。
    /// 默认为载体旁的 `recovered_<载体文件名主干>`。
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// 隐写方式：LSB1、LSB4 或 LSBI。
    #[arg(short, long)]
    pub steg: Scheme,

    #[command(flatten)]
    pub encryption: EncryptionArgs,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 可选的加密参数。仅在提供密码时启用加密。
#[derive(Args, Debug, Clone, Default)]
pub struct EncryptionArgs {
    /// 加密算法：aes128、aes192、aes256、des 或 3des。默认 aes128。
    #[arg(short = 'a', long, requires = "password")]
    pub algorithm: Option<Algorithm>,

    /// 工作模式：ecb、cbc、cfb 或 ofb。默认 cbc。
    #[arg(short = 'm', long, requires = "password")]
    pub mode: Option<Mode>,

    /// 加密密码。
    #[arg(long = "pass")]
    pub password: Option<String>,
}

impl EncryptionArgs {
    /// 转换为加密配置；未提供密码时返回 `None`。
    pub fn crypto(&self) -> Option<Crypto> {
        self.password.as_ref().map(|password| {
            Crypto::new(
                self.algorithm.unwrap_or(Algorithm::Aes128),
                self.mode.unwrap_or(Mode::Cbc),
                password.clone(),
            )
        })
    }
}
