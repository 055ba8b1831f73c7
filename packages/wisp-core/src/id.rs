//! Short random identifiers.
//!
//! Identifiers are drawn uniformly from a 62-symbol alphanumeric alphabet
//! using the OS CSPRNG, since they double as bearer tokens for downloads.
//!
//! With length `L` and `n` live ids, a single draw collides with probability
//! `n / 62^L`. Collisions are retried, but only up to a fixed number of
//! draws so a nearly full id space fails fast instead of spinning.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{Error, Result};

/// Alphabet identifiers are drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates fixed-length random identifiers.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    length: usize,
    max_attempts: u32,
}

impl IdGenerator {
    /// Create a generator for ids of `length` characters that gives up after
    /// `max_attempts` colliding draws.
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length: length.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Identifier length in characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct identifiers (saturates at `u128::MAX`).
    pub fn id_space(&self) -> u128 {
        let mut space: u128 = 1;
        for _ in 0..self.length {
            space = space.saturating_mul(ALPHABET.len() as u128);
        }
        space
    }

    /// Draw one candidate with no uniqueness check.
    pub fn draw(&self) -> String {
        let mut rng = rand::rngs::OsRng;
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Draw an id not present in `existing`.
    pub fn generate(&self, existing: &HashSet<String>) -> Result<String> {
        self.generate_with(|candidate| !existing.contains(candidate))
    }

    /// Draw candidates until `claim` accepts one.
    ///
    /// `claim` returns `true` to take the candidate. Stores use this to check
    /// and reserve the slot in the same step, so two concurrent inserts can
    /// never end up with the same id.
    pub fn generate_with(&self, mut claim: impl FnMut(&str) -> bool) -> Result<String> {
        for _ in 0..self.max_attempts {
            let candidate = self.draw();
            if claim(&candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::IdSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}
