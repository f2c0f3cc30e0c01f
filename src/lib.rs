//! Dense, byte-packed, multi-shard associative container with two exclusive
//! operating modes: a resizing dictionary and a bounded CLOCK cache.
//!
//! The table is a cuckoo-style structure sharded by hash. Each shard owns one
//! contiguous, cache-line-aligned byte buffer of buckets; a bucket packs
//! eight slots behind 20 metadata bytes (tag filters, a second-position
//! counter, presence and CLOCK bitmaps). Hot paths touch exactly one bucket
//! in the common case:
//!
//! - A tabulation hash yields two words per key; the low bits of each pick
//!   the key's two candidate buckets inside a shard, the high bytes route
//!   across shards, and bits 16..24 of the first word form a one-byte tag.
//! - Eight per-bucket filters, indexed by the tag's high nibble, prune both
//!   candidate buckets with a single byte test.
//! - Dictionary inserts displace residents to their alternate bucket when
//!   full (cuckoo), and double the shard when displacement fails.
//! - Cache inserts never grow; a per-bucket CLOCK hand approximates LRU to
//!   choose a victim.
//!
//! The container is single-writer and never suspends; callers serialize
//! access externally. Keys and values are fixed-size byte strings, copied on
//! every call.
//!
//! # Examples
//! ```
//! use densetable::{CacheOutcome, Config, DenseTable};
//!
//! let mut cache = DenseTable::new(Config::new(4, 4).elements_min(64).elements_max(64))?;
//! let outcome = cache.cache(&1u32.to_le_bytes(), &[0xAB; 4])?;
//! assert_eq!(outcome, CacheOutcome::Inserted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bucket;
mod buffer;
mod config;
mod error;
mod hash;
mod shard;
mod table;

#[cfg(test)]
pub mod test_utils;

pub use config::{Config, ELEMENTS_LIMIT, KEY_SIZE_MAX, KEY_SIZE_MIN, VALUE_SIZE_MAX};
pub use error::{ConfigError, TableError};
pub use table::{CacheOutcome, DenseTable, SetOutcome};
