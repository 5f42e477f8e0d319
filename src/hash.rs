//! Content hashing for cache-friendly asset filenames.
//!
//! The default digest is 32-bit xxHash truncated to eight hex characters. Truncation is a
//! readability trade-off left to the caller; no collision detection is performed.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sha2::{Digest, Sha256, Sha384, Sha512};
use xxhash_rust::xxh32::xxh32;
use xxhash_rust::xxh64::xxh64;

use crate::config::ConfigError;

/// Caller supplied digest, `bytes -> string`.
pub type HashFn = Arc<dyn Fn(&[u8]) -> String + Send + Sync>;

const XXHASH_SEED: u32 = 0;

/// Digest used to name copied assets.
#[derive(Clone)]
pub enum HashMethod {
  /// 32-bit xxHash, seed 0.
  Xxhash32,
  /// 64-bit xxHash, seed 0.
  Xxhash64,
  /// SHA-1.
  Sha1,
  /// SHA-256.
  Sha256,
  /// SHA-384.
  Sha384,
  /// SHA-512.
  Sha512,
  /// BLAKE3.
  Blake3,
  /// Caller supplied function.
  Custom(HashFn),
}

impl fmt::Debug for HashMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Xxhash32 => f.write_str("Xxhash32"),
      Self::Xxhash64 => f.write_str("Xxhash64"),
      Self::Sha1 => f.write_str("Sha1"),
      Self::Sha256 => f.write_str("Sha256"),
      Self::Sha384 => f.write_str("Sha384"),
      Self::Sha512 => f.write_str("Sha512"),
      Self::Blake3 => f.write_str("Blake3"),
      Self::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}

impl FromStr for HashMethod {
  type Err = ConfigError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "xxhash32" => Ok(Self::Xxhash32),
      "xxhash64" => Ok(Self::Xxhash64),
      "sha1" => Ok(Self::Sha1),
      "sha256" => Ok(Self::Sha256),
      "sha384" => Ok(Self::Sha384),
      "sha512" => Ok(Self::Sha512),
      "blake3" => Ok(Self::Blake3),
      other => Err(ConfigError::UnknownHashMethod(other.to_string())),
    }
  }
}

/// Digest selection and output shaping.
#[derive(Debug, Clone)]
pub struct HashOptions {
  /// Digest algorithm.
  pub method: HashMethod,
  /// Keep only this many leading characters; `None` keeps the full digest.
  pub shrink: Option<usize>,
  /// Prepend the original file stem (`<stem>_<hash>`) when naming copies.
  pub append: bool,
}

impl Default for HashOptions {
  fn default() -> Self {
    Self {
      method: HashMethod::Xxhash32,
      shrink: Some(8),
      append: false,
    }
  }
}

/// Hash `bytes` into a lowercase hex string, shortened per `options.shrink`.
///
/// Identical bytes and options always produce the identical string.
pub fn content_hash(bytes: &[u8], options: &HashOptions) -> String {
  let digest = match &options.method {
    HashMethod::Xxhash32 => format!("{:08x}", xxh32(bytes, XXHASH_SEED)),
    HashMethod::Xxhash64 => format!("{:016x}", xxh64(bytes, u64::from(XXHASH_SEED))),
    HashMethod::Sha1 => sha1_smol::Sha1::from(bytes).hexdigest(),
    HashMethod::Sha256 => hex::encode(Sha256::digest(bytes)),
    HashMethod::Sha384 => hex::encode(Sha384::digest(bytes)),
    HashMethod::Sha512 => hex::encode(Sha512::digest(bytes)),
    HashMethod::Blake3 => blake3::hash(bytes).to_hex().to_string(),
    HashMethod::Custom(hasher) => hasher(bytes),
  };

  match options.shrink {
    Some(length) if length > 0 => digest.chars().take(length).collect(),
    _ => digest,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONTENT: &[u8] = b"pixel.gif content";

  fn options(method: HashMethod, shrink: Option<usize>) -> HashOptions {
    HashOptions {
      method,
      shrink,
      append: false,
    }
  }

  #[test]
  fn defaults_to_xxhash32_shrunk_to_eight() {
    assert_eq!(content_hash(CONTENT, &HashOptions::default()), "79f89802");
  }

  #[test]
  fn computes_xxhash64() {
    assert_eq!(
      content_hash(CONTENT, &options(HashMethod::Xxhash64, Some(16))),
      "e0ebd922f88990ef"
    );
    assert_eq!(
      content_hash(b"abc", &options(HashMethod::Xxhash64, None)),
      "44bc2cf5ad770999"
    );
  }

  #[test]
  fn computes_cryptographic_digests() {
    assert_eq!(
      content_hash(CONTENT, &options(HashMethod::Sha1, None)),
      "97af5f6bb9c00f3ed6b93f8bcfff3e7e3cbd92dc"
    );
    assert_eq!(
      content_hash(CONTENT, &options(HashMethod::Sha256, Some(16))),
      "0bff3b7af7e6a99f"
    );
    assert_eq!(
      content_hash(CONTENT, &options(HashMethod::Sha512, Some(16))),
      "ce41dbf00573c376"
    );
    assert_eq!(
      content_hash(b"abc", &options(HashMethod::Sha384, Some(16))),
      "cb00753f45a35e8b"
    );
    assert_eq!(
      content_hash(b"", &options(HashMethod::Blake3, None)),
      "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
    );
  }

  #[test]
  fn custom_function_output_is_shrunk() {
    let method = HashMethod::Custom(Arc::new(|_| "12345".to_string()));
    assert_eq!(content_hash(CONTENT, &options(method, Some(3))), "123");
  }

  #[test]
  fn shorter_shrink_is_prefix_of_longer() {
    let long = content_hash(CONTENT, &options(HashMethod::Sha256, Some(20)));
    let short = content_hash(CONTENT, &options(HashMethod::Sha256, Some(6)));
    assert!(long.starts_with(&short));
    assert_eq!(short.len(), 6);
  }

  #[test]
  fn repeated_calls_are_identical() {
    let options = HashOptions::default();
    assert_eq!(content_hash(CONTENT, &options), content_hash(CONTENT, &options));
  }

  #[test]
  fn parses_method_names() {
    assert!(matches!("xxhash64".parse::<HashMethod>(), Ok(HashMethod::Xxhash64)));
    assert!(matches!(
      "md4".parse::<HashMethod>(),
      Err(ConfigError::UnknownHashMethod(name)) if name == "md4"
    ));
  }
}
