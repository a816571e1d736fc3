//! Encryption utilities for storing session tokens.
//!
//! Provides AES-256-GCM authenticated encryption. Keys are derived from the
//! `BOT_ENCRYPTION_KEY` passphrase with HMAC-SHA256 and a fixed context string.
//!
//! Ciphertext format: nonce (12 bytes) || AES-GCM ciphertext+tag

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_CONTEXT: &[u8] = b"homelab-bot/session-token/aes-256-gcm/v1";

/// Errors that can occur during encryption operations
#[derive(Error, Debug)]
pub enum EncryptionError {
    /// Raw keys must be exactly 32 bytes
    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Input is shorter than nonce + tag
    #[error("Invalid ciphertext: too short")]
    CiphertextTooShort,

    /// Wrong key or tampered data
    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    /// The cipher rejected the input
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Stored value is not valid base64 or not UTF-8
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Derive a 32-byte key from a passphrase using HMAC-SHA256.
///
/// The passphrase is the HMAC key and [`KEY_CONTEXT`] the message, which gives
/// domain separation from any other use of the same passphrase.
fn derive_key(passphrase: &str) -> Result<[u8; 32], EncryptionError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(passphrase.as_bytes())
        .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;
    mac.update(KEY_CONTEXT);
    Ok(mac.finalize().into_bytes().into())
}

/// AES-256-GCM authenticated encryption for session tokens.
pub struct TokenCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

impl TokenCipher {
    /// Create a new cipher with the given raw key. Key must be exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, EncryptionError> {
        let key: [u8; 32] = key
            .try_into()
            .map_err(|_| EncryptionError::InvalidKeyLength(key.len()))?;
        Ok(Self { key })
    }

    /// Create from a passphrase using HMAC-SHA256 key derivation.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, EncryptionError> {
        Ok(Self {
            key: derive_key(passphrase)?,
        })
    }

    fn cipher(&self) -> Result<Aes256Gcm, EncryptionError> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))
    }

    /// Encrypt plaintext data. Returns nonce || ciphertext+tag.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, plaintext)
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by [`TokenCipher::encrypt`].
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(EncryptionError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        self.cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| EncryptionError::DecryptionFailed)
    }

    /// Encrypts a string and base64-encodes the result for a text column.
    pub fn encrypt_to_string(&self, plaintext: &str) -> Result<String, EncryptionError> {
        Ok(STANDARD.encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Reverses [`TokenCipher::encrypt_to_string`].
    pub fn decrypt_from_string(&self, encoded: &str) -> Result<String, EncryptionError> {
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| EncryptionError::InvalidEncoding(e.to_string()))?;
        let plaintext = self.decrypt(&data)?;
        String::from_utf8(plaintext).map_err(|e| EncryptionError::InvalidEncoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn cipher(passphrase: &str) -> TokenCipher {
        TokenCipher::from_passphrase(passphrase).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let encryptor = cipher("test-passphrase");
        let plaintext = b"session token";

        let encrypted = encryptor.encrypt(plaintext).unwrap();
        let decrypted = encryptor.decrypt(&encrypted).unwrap();

        assert_eq!(plaintext.to_vec(), decrypted);
    }

    #[test]
    fn test_string_roundtrip() {
        let encryptor = cipher("key");
        let encoded = encryptor.encrypt_to_string("abc123").unwrap();
        assert_ne!(encoded, "abc123");
        assert_eq!(encryptor.decrypt_from_string(&encoded).unwrap(), "abc123");
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = cipher("key1").encrypt(b"secret").unwrap();
        let result = cipher("key2").decrypt(&encrypted);
        assert!(matches!(result, Err(EncryptionError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_data_fails() {
        let encryptor = cipher("key");
        let mut encrypted = encryptor.encrypt(b"secret").unwrap();
        encrypted[20] ^= 0xFF;
        assert!(encryptor.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_too_short_data_fails() {
        let result = cipher("key").decrypt(&[0u8; 10]);
        assert!(matches!(result, Err(EncryptionError::CiphertextTooShort)));
    }

    #[test]
    fn test_different_encryptions_differ() {
        let encryptor = cipher("key");
        let enc1 = encryptor.encrypt(b"same data").unwrap();
        let enc2 = encryptor.encrypt(b"same data").unwrap();

        // Random nonce per call
        assert_ne!(enc1, enc2);
        assert_eq!(
            encryptor.decrypt(&enc1).unwrap(),
            encryptor.decrypt(&enc2).unwrap()
        );
    }

    #[test]
    fn test_invalid_key_length() {
        let result = TokenCipher::new(&[0u8; 16]);
        assert!(matches!(result, Err(EncryptionError::InvalidKeyLength(16))));
        assert!(TokenCipher::new(&[7u8; 32]).is_ok());
    }

    #[test]
    fn test_bad_base64_is_encoding_error() {
        let result = cipher("key").decrypt_from_string("not base64 !!");
        assert!(matches!(result, Err(EncryptionError::InvalidEncoding(_))));
    }
}
