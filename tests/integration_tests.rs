use bmp_stego::{
    Algorithm, Carrier, Mode, Payload, StegoError,
    envelope,
    cli::{EmbedArgs, EncryptionArgs, ExtractArgs},
    handler::{handle_embed, handle_extract},
    steganography::Scheme,
};
use image::{ImageBuffer, Rgb};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    let img_buf: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, raw_pixels)
        .expect("Pixel buffer should match the image dimensions.");

    img_buf.save(path).expect("Failed to create test image.");
}

fn embed_args(input: &Path, carrier: &Path, out: Option<PathBuf>, steg: Scheme) -> EmbedArgs {
    EmbedArgs {
        input: input.to_path_buf(),
        carrier: carrier.to_path_buf(),
        out,
        steg,
        encryption: EncryptionArgs::default(),
        force: false,
    }
}

fn extract_args(carrier: &Path, out: Option<PathBuf>, steg: Scheme) -> ExtractArgs {
    ExtractArgs {
        carrier: carrier.to_path_buf(),
        out,
        steg,
        encryption: EncryptionArgs::default(),
        force: false,
    }
}

fn encryption(algorithm: Algorithm, mode: Mode, password: &str) -> EncryptionArgs {
    EncryptionArgs {
        algorithm: Some(algorithm),
        mode: Some(mode),
        password: Some(password.to_string()),
    }
}

/// 验证三种隐写方式从隐藏到提取的完整流程
#[test]
fn test_embed_and_extract_every_scheme() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("secret.txt");
    create_test_image(&cover_path, 100, 100);

    let original = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&secret_path, original)?;

    for scheme in Scheme::ALL {
        let stego_path = dir.path().join(format!("stego_{scheme}.bmp"));
        let out_base = dir.path().join(format!("recovered_{scheme}"));

        let written = handle_embed(embed_args(
            &secret_path,
            &cover_path,
            Some(stego_path.clone()),
            scheme,
        ))?;
        assert_eq!(written, stego_path);

        // 头部与文件长度保持不变
        let cover = fs::read(&cover_path)?;
        let stego = fs::read(&stego_path)?;
        assert_eq!(cover.len(), stego.len());
        assert_eq!(&cover[..54], &stego[..54]);

        let recovered_path = handle_extract(extract_args(&stego_path, Some(out_base.clone()), scheme))?;
        assert_eq!(recovered_path, dir.path().join(format!("recovered_{scheme}.txt")));
        assert_eq!(
            fs::read_to_string(&recovered_path)?,
            original,
            "Recovered text must match the original for {scheme}."
        );
    }

    Ok(())
}

/// 验证加密后的信封可以被正确隐藏和提取
#[test]
fn test_encrypted_embed_and_extract() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("payload.bin");
    create_test_image(&cover_path, 120, 80);

    let mut secret = vec![0u8; 300];
    rand::rng().fill_bytes(&mut secret);
    fs::write(&secret_path, &secret)?;

    let cases = [
        (Scheme::Lsb1, Algorithm::Aes128, Mode::Ecb),
        (Scheme::Lsb4, Algorithm::Aes192, Mode::Cfb),
        (Scheme::Lsbi, Algorithm::Aes256, Mode::Cbc),
        (Scheme::Lsbi, Algorithm::TripleDes, Mode::Ofb),
        (Scheme::Lsb1, Algorithm::Des, Mode::Cbc),
    ];

    for (i, (scheme, algorithm, mode)) in cases.into_iter().enumerate() {
        let stego_path = dir.path().join(format!("stego_{i}.bmp"));
        let out_base = dir.path().join(format!("out_{i}"));

        let mut args = embed_args(&secret_path, &cover_path, Some(stego_path.clone()), scheme);
        args.encryption = encryption(algorithm, mode, "correct horse");
        handle_embed(args)?;

        let mut args = extract_args(&stego_path, Some(out_base), scheme);
        args.encryption = encryption(algorithm, mode, "correct horse");
        let recovered_path = handle_extract(args)?;

        assert_eq!(recovered_path, dir.path().join(format!("out_{i}.bin")));
        assert_eq!(fs::read(&recovered_path)?, secret, "{scheme} {algorithm}/{mode}");
    }

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_embed_and_extract_with_defaults() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("original.bmp");
    let secret_path = dir.path().join("notes.md");
    create_test_image(&cover_path, 64, 64);
    fs::write(&secret_path, "Testing default path generation. 测试默认路径生成。")?;

    handle_embed(embed_args(&secret_path, &cover_path, None, Scheme::Lsb4))?;
    let expected_stego = dir.path().join("stego_original.bmp");
    assert!(
        expected_stego.exists(),
        "Default stego image should be created at: {:?}",
        expected_stego
    );

    handle_extract(extract_args(&expected_stego, None, Scheme::Lsb4))?;
    let expected_recovered = dir.path().join("recovered_stego_original.md");
    assert!(
        expected_recovered.exists(),
        "Default recovered file should be created at: {:?}",
        expected_recovered
    );
    assert_eq!(
        fs::read_to_string(&expected_recovered)?,
        "Testing default path generation. 测试默认路径生成。"
    );

    Ok(())
}

/// 没有扩展名的文件提取后也没有扩展名
#[test]
fn test_file_without_extension() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("Makefile");
    let stego_path = dir.path().join("stego.bmp");
    create_test_image(&cover_path, 40, 40);
    fs::write(&secret_path, "all:\n\ttrue\n")?;

    handle_embed(embed_args(&secret_path, &cover_path, Some(stego_path.clone()), Scheme::Lsbi))?;
    let out_base = dir.path().join("restored");
    let recovered_path = handle_extract(extract_args(&stego_path, Some(out_base.clone()), Scheme::Lsbi))?;

    assert_eq!(recovered_path, out_base);
    assert_eq!(fs::read_to_string(&recovered_path)?, "all:\n\ttrue\n");

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("image.bmp");
    let secret_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&cover_path, 50, 50);
    fs::write(&secret_path, "some text")?;
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_embed(embed_args(&secret_path, &cover_path, Some(dest_path.clone()), Scheme::Lsb1));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }
    assert_eq!(fs::read(&dest_path)?, b"this is a dummy file to be overwritten");

    let mut args = embed_args(&secret_path, &cover_path, Some(dest_path.clone()), Scheme::Lsb1);
    args.force = true;
    handle_embed(args)?;
    assert_ne!(fs::read(&dest_path)?, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理：不会生成输出文件
#[test]
fn test_embed_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("small.bmp");
    let secret_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&cover_path, 10, 10);
    fs::write(&secret_path, "a".repeat(5000))?;

    for scheme in Scheme::ALL {
        let result = handle_embed(embed_args(&secret_path, &cover_path, Some(dest_path.clone()), scheme));
        let err = result.expect_err("Embedding should fail for a tiny carrier.");
        assert!(matches!(
            err.downcast_ref::<StegoError>(),
            Some(StegoError::InsufficientCapacity { .. })
        ));
        assert!(format!("{err:#}").contains("Not enough space"));
        assert!(!dest_path.exists(), "No output should be written for {scheme}.");
    }

    Ok(())
}

/// 使用错误的密码提取应当失败
#[test]
fn test_extract_with_wrong_password() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("secret.txt");
    let stego_path = dir.path().join("stego.bmp");
    create_test_image(&cover_path, 60, 60);
    fs::write(&secret_path, "attack at dawn")?;

    let mut args = embed_args(&secret_path, &cover_path, Some(stego_path.clone()), Scheme::Lsb1);
    args.encryption = encryption(Algorithm::Aes128, Mode::Cbc, "right");
    handle_embed(args)?;

    let out_base = dir.path().join("out");
    let mut args = extract_args(&stego_path, Some(out_base.clone()), Scheme::Lsb1);
    args.encryption = encryption(Algorithm::Aes128, Mode::Cbc, "wrong");
    assert!(handle_extract(args).is_err());
    assert!(!dir.path().join("out.txt").exists());

    Ok(())
}

/// 非 BMP 文件不能作为载体
#[test]
fn test_rejects_non_bmp_carrier() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("secret.txt");
    fs::write(&cover_path, vec![0u8; 4096])?;
    fs::write(&secret_path, "hello")?;

    let result = handle_embed(embed_args(&secret_path, &cover_path, None, Scheme::Lsb1));
    let err = result.expect_err("A non-BMP carrier should be rejected.");
    assert!(err.to_string().contains("not a BMP image"));

    Ok(())
}

/// 两字节负载 "AB" 加上 ".txt" 扩展名，三种方式都应还原
#[test]
fn test_two_byte_payload_example() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let secret_path = dir.path().join("ab.txt");
    create_test_image(&cover_path, 60, 56);
    fs::write(&secret_path, [0x41u8, 0x42])?;

    for scheme in Scheme::ALL {
        let stego_path = dir.path().join(format!("ab_{scheme}.bmp"));
        handle_embed(embed_args(&secret_path, &cover_path, Some(stego_path.clone()), scheme))?;
        let recovered = handle_extract(extract_args(
            &stego_path,
            Some(dir.path().join(format!("ab_{scheme}"))),
            scheme,
        ))?;
        assert_eq!(recovered.extension().and_then(|e| e.to_str()), Some("txt"));
        assert_eq!(fs::read(&recovered)?, [0x41u8, 0x42]);
    }

    Ok(())
}

/// 载体中隐藏的扩展名含有路径分隔符时，提取应当拒绝写出文件
#[test]
fn test_extract_rejects_extension_with_path_separator() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let stego_path = dir.path().join("crafted.bmp");
    create_test_image(&cover_path, 40, 40);

    for (i, extension) in ["/../escaped.txt", ".txt\\..\\escaped"].into_iter().enumerate() {
        let mut carrier = Carrier::from_bytes(fs::read(&cover_path)?)?;
        let bytes = envelope::serialize(&Payload::new(b"payload".to_vec(), extension))?;
        Scheme::Lsb1.embed(&mut carrier, &bytes)?;
        fs::write(&stego_path, carrier.into_bytes())?;

        let out_base = dir.path().join(format!("out_{i}"));
        let result = handle_extract(extract_args(&stego_path, Some(out_base), Scheme::Lsb1));
        let err = result.expect_err("A separator in the extension should be rejected.");
        assert!(err.to_string().contains("path separator"));
    }
    assert!(!dir.path().join("escaped.txt").exists());
    assert!(!dir.path().parent().unwrap().join("escaped.txt").exists());

    Ok(())
}
