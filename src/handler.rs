//! # 命令处理逻辑模块
//!
//! 包含处理 `embed` 和 `extract` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用信封与隐写核心以及向用户报告结果。
//! 所有检查都在写出任何文件之前完成，失败时不会留下半成品输出。

use crate::carrier::Carrier;
use crate::cli::{EmbedArgs, ExtractArgs};
use crate::envelope::{self, Payload};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 在输入文件所在目录中生成带前缀的默认输出路径。
fn sibling_path(input: &Path, prefix: &str, name: &str) -> PathBuf {
    input.with_file_name(format!("{prefix}{name}"))
}

/// 读取文件并确认其为 BMP 格式，然后构建载体。
fn load_carrier(path: &Path) -> Result<Carrier> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Unable to read carrier image: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    anyhow::ensure!(
        matches!(image::guess_format(&bytes), Ok(image::ImageFormat::Bmp)),
        "The carrier is not a BMP image: {}",
        path.to_string_lossy().red().bold()
    );

    Carrier::from_bytes(bytes).with_context(|| {
        format!(
            "Unable to locate pixel data in: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 未指定 `--force` 时拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Embed' 命令的执行逻辑。
///
/// 负责读取载体和待隐藏文件、构建 (并可选加密) 信封、检查容量、调用隐写核心，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、隐写方式和加密参数的 `EmbedArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取载体或待隐藏的文件，或载体不是 BMP。
/// * 输出文件已存在且未指定 `--force`。
/// * 载体没有足够的空间来隐藏数据。
/// * 无法写入到目标图像文件。
pub fn handle_embed(args: EmbedArgs) -> Result<PathBuf> {
    let dest = args.out.clone().unwrap_or_else(|| {
        let name = args
            .carrier
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "carrier.bmp".to_string());
        sibling_path(&args.carrier, "stego_", &name)
    });
    ensure_writable(&dest, args.force)?;

    let mut carrier = load_carrier(&args.carrier)?;

    let data = fs::read(&args.input).with_context(|| {
        format!(
            "Unable to read input file: {}",
            args.input.to_string_lossy().red().bold()
        )
    })?;
    let payload = Payload::from_file(data, &args.input);

    let crypto = args.encryption.crypto();
    let envelope = envelope::encode(&payload, crypto.as_ref())
        .context("Failed to build the payload envelope.")?;

    tracing::info!(
        scheme = %args.steg,
        encrypted = crypto.is_some(),
        envelope = envelope.len(),
        "embedding"
    );

    args.steg.embed(&mut carrier, &envelope).with_context(|| {
        format!(
            "Failed to hide {} with {}. \nTry a larger carrier or a denser method.",
            args.input.to_string_lossy().red().bold(),
            args.steg.to_string().green()
        )
    })?;

    fs::write(&dest, carrier.into_bytes()).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(dest)
}

/// 处理 'Extract' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像、调用隐写核心读出位流、解析 (并可选解密) 信封，
/// 最后将恢复的文件写入 `<输出路径><扩展名>`。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、隐写方式和加密参数的 `ExtractArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入图像，或其不是 BMP。
/// * 信封不完整或解密失败 (通常是隐写方式、密码、算法或模式不匹配)。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法写入到目标文件。
pub fn handle_extract(args: ExtractArgs) -> Result<PathBuf> {
    let carrier = load_carrier(&args.carrier)?;

    let bits = args.steg.extract(&carrier);
    let crypto = args.encryption.crypto();
    let payload = envelope::decode(&bits, crypto.as_ref()).with_context(|| {
        format!(
            "Failed to recover a hidden file from '{}' with {}. \nThe image may not contain hidden data, or the method or password is wrong.",
            args.carrier.to_string_lossy().red().bold(),
            args.steg.to_string().green()
        )
    })?;

    // 扩展名来自载体，拼接到输出路径前不能允许它引入新的路径分量
    anyhow::ensure!(
        !payload.extension.contains(['/', '\\']),
        "The hidden extension {} contains a path separator. \nRefusing to write outside the output directory.",
        format!("{:?}", payload.extension).red().bold()
    );

    let base = args.out.clone().unwrap_or_else(|| {
        let stem = args
            .carrier
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        sibling_path(&args.carrier, "recovered_", &stem)
    });
    let mut dest = base.into_os_string();
    dest.push(&payload.extension);
    let dest = PathBuf::from(dest);
    ensure_writable(&dest, args.force)?;

    tracing::info!(
        scheme = %args.steg,
        size = payload.data.len(),
        extension = %payload.extension,
        "extracted"
    );

    fs::write(&dest, &payload.data).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(dest)
}
