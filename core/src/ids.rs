//! Opaque id generation for gates and connections.

use std::sync::atomic::{AtomicU64, Ordering};

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns `<prefix>-<seq>-<9 random base36 chars>`.
///
/// The sequence number alone keeps ids unique within a process; the random
/// suffix keeps ids from separate sessions (or browser tabs) apart.
pub(crate) fn fresh_id(prefix: &str) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    let seq = NEXT.fetch_add(1, Ordering::Relaxed);

    let mut bytes = [0u8; SUFFIX_LEN];
    if getrandom::getrandom(&mut bytes).is_err() {
        // No entropy source: the sequence number still keeps ids unique
        bytes = [0u8; SUFFIX_LEN];
    }

    let suffix: String = bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect();

    format!("{}-{}-{}", prefix, seq, suffix)
}
