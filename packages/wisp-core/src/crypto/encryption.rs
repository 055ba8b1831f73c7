//! # Encryption Module
//!
//! AES-256-GCM for payload confidentiality and integrity.
//!
//! ## Per-Object Sealing
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OBJECT SEALING FLOW                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Fresh key per object                                          │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Random 32 bytes from the OS CSPRNG                          │       │
//! │  │  (Never shared between objects)                             │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Fresh nonce per object                                        │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Random 12 bytes from the OS CSPRNG                          │       │
//! │  │  (Used exactly once with its paired key)                    │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Encrypt                                                       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES-256-GCM(key, nonce, plaintext, aad)                     │       │
//! │  │           ↓                                                  │       │
//! │  │  Ciphertext + 16-byte Auth Tag                              │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Decrypt verifies the tag first. Any flipped bit in the ciphertext,    │
//! │  tag, key, nonce or AAD yields Error::Crypto, never altered bytes.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A compromised key exposes exactly one object, and because every object
//! gets its own key the random 96-bit nonce is never at risk of reuse.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// A nonce (number used once) for AES-GCM encryption
///
/// **Never reuse a nonce with the same key.** Reuse lets an attacker
/// recover the authentication key and forge ciphertexts.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Nonce(..)")
    }
}

/// Generate a fresh random 256-bit key.
pub fn generate_key() -> EncryptionKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let key = EncryptionKey(bytes);
    bytes.zeroize();
    key
}

/// Generate a fresh random 96-bit nonce.
pub fn generate_nonce() -> Nonce {
    let mut bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Nonce(bytes)
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_SIZE {
        return Err(Error::Crypto(format!(
            "Invalid key length: expected {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| Error::Crypto(format!("Invalid key: {}", e)))
}

fn check_nonce(nonce: &[u8]) -> Result<()> {
    if nonce.len() != NONCE_SIZE {
        return Err(Error::Crypto(format!(
            "Invalid nonce length: expected {} bytes, got {}",
            NONCE_SIZE,
            nonce.len()
        )));
    }
    Ok(())
}

/// Encrypt `plaintext` with AES-256-GCM.
///
/// Returns the ciphertext with the 16-byte tag appended. Fails with
/// [`Error::Crypto`] if the key or nonce has the wrong length.
pub fn encrypt(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_aad(plaintext, key, nonce, &[])
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// ## Errors
///
/// Returns [`Error::Crypto`] if:
/// - The ciphertext or tag was tampered with
/// - The key is wrong
/// - The nonce is wrong
/// - The key or nonce has the wrong length
pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    decrypt_with_aad(ciphertext, key, nonce, &[])
}

/// Encrypt with additional authenticated data.
///
/// `aad` is not encrypted but is bound into the tag: decrypting with any
/// other `aad` fails.
pub fn encrypt_with_aad(plaintext: &[u8], key: &[u8], nonce: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    check_nonce(nonce)?;

    let payload = Payload {
        msg: plaintext,
        aad,
    };

    cipher
        .encrypt(AesNonce::from_slice(nonce), payload)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))
}

/// Decrypt with additional authenticated data (must match encryption).
pub fn decrypt_with_aad(
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    check_nonce(nonce)?;

    if ciphertext.len() < TAG_SIZE {
        return Err(Error::Crypto("Ciphertext shorter than authentication tag".into()));
    }

    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(AesNonce::from_slice(nonce), payload)
        .map_err(|_| Error::Crypto("Decryption failed: authentication tag mismatch".into()))
}
