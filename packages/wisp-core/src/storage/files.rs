//! Encrypted, single-download file store.
//!
//! Each upload is sealed under its own key and nonce and indexed by a short
//! random id. The index is a `DashMap` so handlers never need an outer lock;
//! the sensitive buffers of each object sit behind a per-object `RwLock`
//! which is the only thing held while decrypting or wiping.
//!
//! Linearizability per id comes from two rules:
//! - removal from the index is the commit point of every deletion path, and
//!   the remover is the one that wipes;
//! - decryption checks the `wiped` flag under the same lock the wipe takes,
//!   so a reader racing a delete sees either intact bytes or `NotFound`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::crypto::{self, secure_wipe, KEY_SIZE, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::id::IdGenerator;

/// Ciphertext and the key material needed to open it.
struct Sealed {
    ciphertext: Vec<u8>,
    key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    wiped: bool,
}

impl Sealed {
    fn wipe(&mut self) {
        if self.wiped {
            return;
        }
        secure_wipe(&mut self.ciphertext);
        secure_wipe(&mut self.key);
        secure_wipe(&mut self.nonce);
        self.wiped = true;
    }
}

impl Drop for Sealed {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// One encrypted upload.
///
/// The original filename is bound into the authentication tag as associated
/// data but is itself stored in the clear.
pub struct StoredFile {
    id: String,
    original_name: String,
    plaintext_size: usize,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    downloaded: AtomicBool,
    sealed: RwLock<Sealed>,
}

impl StoredFile {
    /// Identifier the file is indexed under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filename supplied at upload.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Size of the payload before encryption.
    pub fn plaintext_size(&self) -> usize {
        self.plaintext_size
    }

    /// When the file was stored.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the file stops being retrievable.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether a download has consumed this file.
    pub fn is_downloaded(&self) -> bool {
        self.downloaded.load(Ordering::Acquire)
    }

    /// Whether the TTL has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Downloaded or expired: eligible for eviction.
    pub fn should_auto_delete(&self, now: DateTime<Utc>) -> bool {
        self.is_downloaded() || self.is_expired(now)
    }

    /// Whether the sensitive buffers have been overwritten.
    pub fn is_wiped(&self) -> bool {
        self.sealed.read().wiped
    }

    /// Decrypt the payload.
    ///
    /// Returns [`Error::NotFound`] if the file was deleted (and wiped) after
    /// the caller obtained it, and [`Error::Crypto`] if authentication fails.
    pub fn decrypt(&self) -> Result<Vec<u8>> {
        let sealed = self.sealed.read();
        if sealed.wiped {
            return Err(Error::NotFound);
        }
        crypto::decrypt_with_aad(
            &sealed.ciphertext,
            &sealed.key,
            &sealed.nonce,
            self.original_name.as_bytes(),
        )
    }

    fn mark_downloaded(&self) {
        self.downloaded.store(true, Ordering::Release);
    }

    fn wipe(&self) {
        self.sealed.write().wipe();
    }
}

impl std::fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFile")
            .field("id", &self.id)
            .field("plaintext_size", &self.plaintext_size)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("downloaded", &self.is_downloaded())
            .finish_non_exhaustive()
    }
}

/// Result of a successful single-use download.
#[derive(Debug)]
pub struct DownloadedFile {
    /// Filename supplied at upload
    pub name: String,
    /// Decrypted payload
    pub data: Vec<u8>,
}

/// Concurrent RAM-only store of encrypted files.
#[derive(Clone)]
pub struct FileStore {
    /// Maps id → stored file
    files: Arc<DashMap<String, Arc<StoredFile>>>,
    ids: IdGenerator,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl FileStore {
    /// Create a store driven by the system clock.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`.
    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            files: Arc::new(DashMap::new()),
            ids: IdGenerator::new(config.file_id_length, config.max_id_attempts),
            ttl: config.file_ttl(),
            clock,
        }
    }

    /// Lifetime applied to new files.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Generator used for file ids.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Encrypt `plaintext` under a fresh key and nonce and index it.
    ///
    /// The caller's buffer is wiped once encryption has run, whether or not
    /// the insert succeeds. Size limits are the caller's job.
    pub fn store(&self, filename: &str, plaintext: &mut [u8]) -> Result<String> {
        let key = crypto::generate_key();
        let nonce = crypto::generate_nonce();

        let sealed = crypto::encrypt_with_aad(
            plaintext,
            key.as_bytes(),
            nonce.as_bytes(),
            filename.as_bytes(),
        );
        let plaintext_size = plaintext.len();
        secure_wipe(plaintext);

        let mut pending = Some(Sealed {
            ciphertext: sealed?,
            key: *key.as_bytes(),
            nonce: *nonce.as_bytes(),
            wiped: false,
        });

        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or(Error::ExpiryOutOfRange)?;

        // Check and insert under the same shard lock.
        self.ids.generate_with(|candidate| match self.files.entry(candidate.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                if let Some(sealed) = pending.take() {
                    slot.insert(Arc::new(StoredFile {
                        id: candidate.to_string(),
                        original_name: filename.to_string(),
                        plaintext_size,
                        created_at,
                        expires_at,
                        downloaded: AtomicBool::new(false),
                        sealed: RwLock::new(sealed),
                    }));
                }
                true
            }
        })
    }

    /// Look up a live file without decrypting it.
    ///
    /// An expired file is removed and wiped on the spot and reported as
    /// [`Error::Expired`].
    pub fn retrieve(&self, id: &str) -> Result<Arc<StoredFile>> {
        let file = self
            .files
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::NotFound)?;

        if file.is_expired(self.clock.now()) {
            self.files.remove_if(id, |_, current| Arc::ptr_eq(current, &file));
            file.wipe();
            return Err(Error::Expired);
        }

        Ok(file)
    }

    /// Claim, decrypt and destroy a file in one step.
    ///
    /// The file leaves the index before decryption starts, so of any number
    /// of concurrent downloads of one id at most one succeeds. The buffers
    /// are wiped on every outcome, including an authentication failure.
    pub fn download(&self, id: &str) -> Result<DownloadedFile> {
        let (_, file) = self.files.remove(id).ok_or(Error::NotFound)?;

        if file.is_expired(self.clock.now()) {
            file.wipe();
            return Err(Error::Expired);
        }

        file.mark_downloaded();
        let decrypted = file.decrypt();
        file.wipe();

        Ok(DownloadedFile {
            name: file.original_name.clone(),
            data: decrypted?,
        })
    }

    /// Flag a file as downloaded, then remove and wipe it.
    ///
    /// No-op if the id is already gone.
    pub fn mark_downloaded_and_delete(&self, id: &str) {
        if let Some((_, file)) = self.files.remove(id) {
            file.mark_downloaded();
            file.wipe();
        }
    }

    /// Remove and wipe a file. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        match self.files.remove(id) {
            Some((_, file)) => {
                file.wipe();
                true
            }
            None => false,
        }
    }

    /// Number of indexed files, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Wipe and remove every file. Returns how many were cleared.
    ///
    /// Each shard is wiped and emptied under its write lock, so once this
    /// returns no reader can obtain any of the cleared files.
    pub fn clear_all(&self) -> usize {
        let mut cleared = 0;
        self.files.retain(|_, file| {
            file.wipe();
            cleared += 1;
            false
        });
        cleared
    }

    /// Evict and wipe every downloaded or expired file.
    ///
    /// Candidates are collected from a snapshot, then each is removed only
    /// if it still qualifies, so concurrent inserts and deletes are safe.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();

        let candidates: Vec<String> = self
            .files
            .iter()
            .filter(|entry| entry.value().should_auto_delete(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut evicted = 0;
        for id in &candidates {
            if let Some((_, file)) = self
                .files
                .remove_if(id, |_, file| file.should_auto_delete(now))
            {
                file.wipe();
                evicted += 1;
            }
        }
        evicted
    }
}

#[cfg(test)]
impl StoredFile {
    fn sensitive_snapshot(&self) -> (Vec<u8>, [u8; KEY_SIZE], [u8; NONCE_SIZE]) {
        let sealed = self.sealed.read();
        (sealed.ciphertext.clone(), sealed.key, sealed.nonce)
    }

    fn flip_ciphertext_bit(&self) {
        self.sealed.write().ciphertext[0] ^= 0x01;
    }
}
