//! Tabulation hash producing two 32-bit words per key.
//!
//! Each key byte position owns a pair of 256-entry tables, one feeding H1 and
//! one feeding H2; the hash is the XOR of the looked-up words across
//! positions. The pair for a position is stored interleaved so both lookups
//! for a byte land on the same cache line.
//!
//! The tables are seeded once per process from the operating system's entropy
//! pool and shared by every table in the process (~128 KiB total).
//! Randomized seeding defends against adversarial key sets; determinism
//! across runs is deliberately not provided. The hash is not
//! cryptographically strong.

use std::sync::OnceLock;

use rand::RngCore;

use crate::config::KEY_SIZE_MAX;

/// One `[h1, h2]` word pair per (byte position, byte value).
type PositionTable = [[u32; 2]; 256];

static TABLES: OnceLock<Box<[PositionTable]>> = OnceLock::new();

fn tables() -> &'static [PositionTable] {
    TABLES.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let mut rows = Vec::with_capacity(KEY_SIZE_MAX);
        for _ in 0..KEY_SIZE_MAX {
            let mut row: PositionTable = [[0u32; 2]; 256];
            for pair in row.iter_mut() {
                pair[0] = rng.next_u32();
                pair[1] = rng.next_u32();
            }
            rows.push(row);
        }
        rows.into_boxed_slice()
    })
}

/// Hashes a key into `(H1, H2)`.
///
/// H1 drives first-position bucket selection, the tag (bits 16..24), and the
/// high shard-routing byte; H2 drives second-position selection and the other
/// routing byte. Returning the pair by value keeps the call allocation-free.
///
/// # Panics
/// Panics in debug builds if the key is longer than [`KEY_SIZE_MAX`].
#[inline]
pub(crate) fn pair(key: &[u8]) -> (u32, u32) {
    debug_assert!(key.len() <= KEY_SIZE_MAX);
    let tables = tables();
    let mut h1 = 0u32;
    let mut h2 = 0u32;
    for (position, &byte) in key.iter().enumerate() {
        let words = &tables[position][byte as usize];
        h1 ^= words[0];
        h2 ^= words[1];
    }
    (h1, h2)
}
