//! # 加密适配器模块
//!
//! 为信封提供 `encrypt(bytes) -> bytes` / `decrypt(bytes) -> bytes`。
//! 密钥和 IV 由密码通过 PBKDF2-HMAC-SHA1 (固定盐值、固定迭代次数) 确定性地派生，
//! 因此同一组参数总能得到相同的密文。

use std::fmt;
use std::str::FromStr;

use aes::cipher::{
    AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher,
    block_padding::Pkcs7,
};
use aes::{Aes128, Aes192, Aes256};
use des::{Des, TdesEde3};
use sha1::Sha1;

use crate::constants::{KDF_ITERATIONS, KDF_SALT};
use crate::error::StegoError;

/// 支持的分组密码算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Aes128,
    Aes192,
    Aes256,
    Des,
    TripleDes,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Aes128,
        Algorithm::Aes192,
        Algorithm::Aes256,
        Algorithm::Des,
        Algorithm::TripleDes,
    ];

    /// 密钥长度 (字节)。
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128 => 16,
            Algorithm::Aes192 => 24,
            Algorithm::Aes256 => 32,
            Algorithm::Des => 8,
            Algorithm::TripleDes => 24,
        }
    }

    /// 分组长度 (字节)，同时也是 IV 长度。
    pub fn block_len(self) -> usize {
        match self {
            Algorithm::Aes128 | Algorithm::Aes192 | Algorithm::Aes256 => 16,
            Algorithm::Des | Algorithm::TripleDes => 8,
        }
    }
}

impl FromStr for Algorithm {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes128" => Ok(Algorithm::Aes128),
            "aes192" => Ok(Algorithm::Aes192),
            "aes256" => Ok(Algorithm::Aes256),
            "des" => Ok(Algorithm::Des),
            "3des" => Ok(Algorithm::TripleDes),
            _ => Err(StegoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Aes128 => "aes128",
            Algorithm::Aes192 => "aes192",
            Algorithm::Aes256 => "aes256",
            Algorithm::Des => "des",
            Algorithm::TripleDes => "3des",
        })
    }
}

/// 分组密码的工作模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb];
}

impl FromStr for Mode {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            "cfb" => Ok(Mode::Cfb),
            "ofb" => Ok(Mode::Ofb),
            _ => Err(StegoError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
            Mode::Cfb => "cfb",
            Mode::Ofb => "ofb",
        })
    }
}

/// 一组完整的加密配置：算法、模式和密码。
#[derive(Clone)]
pub struct Crypto {
    algorithm: Algorithm,
    mode: Mode,
    password: String,
}

impl fmt::Debug for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crypto")
            .field("algorithm", &self.algorithm)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

// 将算法枚举展开为具体的分组密码类型，供模式代码使用。
macro_rules! with_block_cipher {
    ($algorithm:expr, $cipher:ident => $body:expr) => {
        match $algorithm {
            Algorithm::Aes128 => {
                type $cipher = Aes128;
                $body
            }
            Algorithm::Aes192 => {
                type $cipher = Aes192;
                $body
            }
            Algorithm::Aes256 => {
                type $cipher = Aes256;
                $body
            }
            Algorithm::Des => {
                type $cipher = Des;
                $body
            }
            Algorithm::TripleDes => {
                type $cipher = TdesEde3;
                $body
            }
        }
    };
}

fn invalid_length(err: impl fmt::Display) -> StegoError {
    StegoError::Decryption(format!("invalid key or IV length: {err}"))
}

impl Crypto {
    pub fn new(algorithm: Algorithm, mode: Mode, password: impl Into<String>) -> Self {
        Self {
            algorithm,
            mode,
            password: password.into(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 由密码派生 `(key, iv)`。
    fn derive_key_iv(&self) -> (Vec<u8>, Vec<u8>) {
        let key_len = self.algorithm.key_len();
        let mut material = vec![0u8; key_len + self.algorithm.block_len()];
        pbkdf2::pbkdf2_hmac::<Sha1>(
            self.password.as_bytes(),
            &KDF_SALT,
            KDF_ITERATIONS,
            &mut material,
        );
        let iv = material.split_off(key_len);
        (material, iv)
    }

    /// 加密明文。ECB/CBC 使用 PKCS#7 填充，CFB/OFB 不填充。
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, StegoError> {
        let (key, iv) = self.derive_key_iv();
        let ciphertext = with_block_cipher!(self.algorithm, C => match self.mode {
            Mode::Ecb => ecb::Encryptor::<C>::new_from_slice(&key)
                .map_err(invalid_length)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Mode::Cbc => cbc::Encryptor::<C>::new_from_slices(&key, &iv)
                .map_err(invalid_length)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Mode::Cfb => {
                let mut buf = plaintext.to_vec();
                cfb_mode::Encryptor::<C>::new_from_slices(&key, &iv)
                    .map_err(invalid_length)?
                    .encrypt(&mut buf);
                buf
            }
            Mode::Ofb => {
                let mut buf = plaintext.to_vec();
                ofb::Ofb::<C>::new_from_slices(&key, &iv)
                    .map_err(invalid_length)?
                    .apply_keystream(&mut buf);
                buf
            }
        });

        tracing::debug!(
            algorithm = %self.algorithm,
            mode = %self.mode,
            plaintext = plaintext.len(),
            ciphertext = ciphertext.len(),
            "payload encrypted"
        );
        Ok(ciphertext)
    }

    /// 解密密文。
    ///
    /// # Errors
    ///
    /// 填充校验失败 (通常意味着密码、算法或模式不匹配) 时返回 `Decryption`。
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, StegoError> {
        let (key, iv) = self.derive_key_iv();
        let unpad_error = |e: aes::cipher::block_padding::UnpadError| {
            StegoError::Decryption(format!(
                "{e} (wrong password, algorithm or mode?)"
            ))
        };

        let plaintext = with_block_cipher!(self.algorithm, C => match self.mode {
            Mode::Ecb => ecb::Decryptor::<C>::new_from_slice(&key)
                .map_err(invalid_length)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(unpad_error)?,
            Mode::Cbc => cbc::Decryptor::<C>::new_from_slices(&key, &iv)
                .map_err(invalid_length)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(unpad_error)?,
            Mode::Cfb => {
                let mut buf = ciphertext.to_vec();
                cfb_mode::Decryptor::<C>::new_from_slices(&key, &iv)
                    .map_err(invalid_length)?
                    .decrypt(&mut buf);
                buf
            }
            Mode::Ofb => {
                let mut buf = ciphertext.to_vec();
                ofb::Ofb::<C>::new_from_slices(&key, &iv)
                    .map_err(invalid_length)?
                    .apply_keystream(&mut buf);
                buf
            }
        });

        Ok(plaintext)
    }
}
