//! Best-effort erasure of sensitive buffers.
//!
//! [`secure_wipe`] overwrites a buffer in place with random bytes and then
//! with zeros. The zero pass goes through `zeroize`, so the compiler cannot
//! drop it as a dead store.
//!
//! This is a mitigation, not a guarantee. It only reaches the bytes it is
//! handed: copies made earlier by the allocator (a `Vec` that grew and moved),
//! by the OS (swap, core dumps) or by other layers (network buffers) are
//! out of its reach.

use rand::RngCore;
use zeroize::Zeroize;

/// Overwrite `buf` with random bytes, then with zeros.
pub fn secure_wipe(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    rand::rngs::OsRng.fill_bytes(buf);
    buf.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wipe_leaves_zeros() {
        let mut buf = vec![0xAAu8; 64];
        secure_wipe(&mut buf);
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_wipe_empty_is_noop() {
        let mut buf: [u8; 0] = [];
        secure_wipe(&mut buf);
    }

    #[test]
    fn test_wipe_array() {
        let mut key = [7u8; 32];
        secure_wipe(&mut key);
        assert_eq!(key, [0u8; 32]);
    }
}
