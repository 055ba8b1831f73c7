//! # Cipher Engine
//!
//! Per-object key and nonce generation, AES-256-GCM sealing, and secure
//! wiping of sensitive buffers.
//!
//! | Primitive | Algorithm | Size |
//! |-----------|-----------|------|
//! | Key | OS CSPRNG | 256 bits |
//! | Nonce | OS CSPRNG | 96 bits |
//! | Cipher | AES-256-GCM | 128-bit tag |
//! | Wipe | random pass + zeroize | in place |
//!
//! `OsRng` is stateless and safe to call from any number of threads.

mod encryption;
mod wipe;

pub use encryption::{
    decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, generate_key, generate_nonce,
    EncryptionKey, Nonce, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use wipe::secure_wipe;
