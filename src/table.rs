//! Coordinator: shard fan-out, mode locking, and growth orchestration.
//!
//! The coordinator hashes each key once, routes it to a shard using the high
//! byte of both hash words, and forwards the operation. Routing bits are
//! disjoint from the bits shards use internally (low bits pick buckets, bits
//! 16..24 of H1 form the tag), so shard selection never correlates with
//! in-shard placement.
//!
//! The first `set` locks the table into dictionary mode and the first
//! `cache` locks it into cache mode; the other family then fails without
//! mutating anything. A dictionary shard that reports overflow is grown by
//! doubling (twice at most) before the insert is abandoned.

use std::fmt;

use crate::config::{self, Config};
use crate::error::{ConfigError, TableError};
use crate::hash;
use crate::shard::{CacheResult, SetResult, Shard};

/// Outcome of a successful [`DenseTable::set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was not present and was inserted.
    Inserted,
    /// The key was present and its value was overwritten.
    Updated,
}

/// Outcome of a successful [`DenseTable::cache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The key was written without displacing a live element.
    Inserted,
    /// The key was present and its value was overwritten.
    Updated,
    /// A live element was evicted to make room.
    Evicted,
}

/// Operating mode, locked by the first mutating call of either family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Unset,
    Dict,
    Cache,
}

/// Dense, byte-packed associative container with two exclusive modes:
/// a resizing dictionary (`set`/`unset`) and a bounded CLOCK cache
/// (`cache`). Lookups work in both modes.
///
/// Keys and values are fixed-size byte strings configured at construction;
/// every call copies them in or out, and caller buffers are never retained.
/// The container is single-writer: `&mut self` on each mutating operation.
///
/// # Examples
/// ```
/// use densetable::{Config, DenseTable, SetOutcome};
///
/// let mut table = DenseTable::new(Config::new(4, 4).elements_min(8)).unwrap();
/// assert_eq!(table.set(&[0, 0, 0, 1], &[0xAA; 4]).unwrap(), SetOutcome::Inserted);
/// let mut out = [0u8; 4];
/// assert!(table.get(&[0, 0, 0, 1], &mut out));
/// assert_eq!(out, [0xAA; 4]);
/// ```
pub struct DenseTable {
    geometry: config::Geometry,
    shards: Box<[Shard]>,
    shard_mask: u32,
    mode: Mode,
    length: u64,
}

impl DenseTable {
    /// Validates the configuration and allocates the initial shards.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let geometry = config::resolve(&config)?;
        let shards: Box<[Shard]> = (0..geometry.shard_count)
            .map(|_| Shard::new(geometry.layout, geometry.initial_buckets))
            .collect();
        Ok(Self {
            shard_mask: geometry.shard_count - 1,
            geometry,
            shards,
            mode: Mode::Unset,
            length: 0,
        })
    }

    /// Configured key size in bytes.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.geometry.layout.key_size
    }

    /// Configured value size in bytes.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.geometry.layout.value_size
    }

    /// Configured growth target. The shard fan-out is sized so the table can
    /// reach this many elements before any shard hits its bucket ceiling.
    #[inline]
    pub fn elements_max(&self) -> u64 {
        self.geometry.elements_max
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> u64 {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Element slots currently allocated across all shards.
    pub fn capacity(&self) -> u64 {
        self.shards.iter().map(Shard::slots).sum()
    }

    /// Total bytes allocated across all shard buffers.
    pub fn size(&self) -> u64 {
        self.shards.iter().map(Shard::bytes).sum()
    }

    /// Live elements as a fraction of allocated slots.
    pub fn load(&self) -> f64 {
        self.length as f64 / self.capacity() as f64
    }

    /// Returns whether `key` is present.
    ///
    /// # Panics
    /// Panics if `key.len()` differs from the configured key size.
    pub fn exist(&self, key: &[u8]) -> bool {
        self.check_key(key);
        let (h1, h2) = hash::pair(key);
        self.shards[self.route(h1, h2)].exist(h1, h2, key)
    }

    /// Copies the key's value into `value` on a hit and marks the element
    /// recently used.
    ///
    /// # Panics
    /// Panics if `key.len()` or `value.len()` differ from the configured
    /// sizes.
    pub fn get(&mut self, key: &[u8], value: &mut [u8]) -> bool {
        self.get_opt(key, Some(value))
    }

    /// [`get`](Self::get) accepting `None` for zero-size values.
    pub fn get_opt(&mut self, key: &[u8], value: Option<&mut [u8]>) -> bool {
        self.check_key(key);
        let out = self.check_value_out(value);
        let (h1, h2) = hash::pair(key);
        self.shards[self.route(h1, h2)].get(h1, h2, key, out)
    }

    /// Inserts or updates a key in dictionary mode, growing the target shard
    /// when it overflows.
    ///
    /// # Errors
    /// - [`TableError::ModeConflict`] if the table is locked to cache mode.
    /// - [`TableError::CapacityExceeded`] if growth would exceed the
    ///   per-shard limits.
    /// - [`TableError::SetExhausted`] if two growth attempts could not
    ///   absorb the element.
    ///
    /// # Panics
    /// Panics if `key.len()` or `value.len()` differ from the configured
    /// sizes.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<SetOutcome, TableError> {
        self.set_opt(key, Some(value))
    }

    /// [`set`](Self::set) accepting `None` for zero-size values.
    pub fn set_opt(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<SetOutcome, TableError> {
        if self.mode == Mode::Cache {
            return Err(TableError::ModeConflict);
        }
        self.mode = Mode::Dict;
        self.check_key(key);
        let value = self.check_value(value);
        let (h1, h2) = hash::pair(key);
        let index = self.route(h1, h2);
        match self.shards[index].set(h1, h2, key, value) {
            SetResult::Updated => Ok(SetOutcome::Updated),
            SetResult::Inserted => {
                self.length += 1;
                Ok(SetOutcome::Inserted)
            }
            SetResult::Overflow => self.grow_and_retry(index, h1, h2, key, value),
        }
    }

    /// Removes a key. Works in both modes and never affects the mode lock.
    ///
    /// # Panics
    /// Panics if `key.len()` differs from the configured key size.
    pub fn unset(&mut self, key: &[u8]) -> bool {
        self.check_key(key);
        let (h1, h2) = hash::pair(key);
        let removed = self.shards[self.route(h1, h2)].unset(h1, h2, key);
        if removed {
            self.length -= 1;
        }
        removed
    }

    /// Inserts or updates a key in cache mode, evicting a cold resident of
    /// the target bucket when it is full. Capacity never grows.
    ///
    /// # Errors
    /// - [`TableError::ModeConflict`] if the table is locked to dictionary
    ///   mode.
    ///
    /// # Panics
    /// Panics if `key.len()` or `value.len()` differ from the configured
    /// sizes.
    pub fn cache(&mut self, key: &[u8], value: &[u8]) -> Result<CacheOutcome, TableError> {
        if self.mode == Mode::Dict {
            return Err(TableError::ModeConflict);
        }
        self.mode = Mode::Cache;
        self.check_key(key);
        let value = self.check_value(Some(value));
        let (h1, h2) = hash::pair(key);
        let outcome = self.shards[self.route(h1, h2)].cache(h1, key, value);
        match outcome {
            CacheResult::Inserted => {
                self.length += 1;
                Ok(CacheOutcome::Inserted)
            }
            CacheResult::Updated => Ok(CacheOutcome::Updated),
            // One out, one in: the length is unchanged.
            CacheResult::Evicted => Ok(CacheOutcome::Evicted),
        }
    }

    /// Doubles the overflowed shard up to two times, retrying the insert
    /// after each successful rebuild.
    ///
    /// The second target doubles again relative to the first, whether or not
    /// the first rebuild succeeded, so a failed rebuild retries at four
    /// times the original bucket count.
    fn grow_and_retry(
        &mut self,
        index: usize,
        h1: u32,
        h2: u32,
        key: &[u8],
        value: &[u8],
    ) -> Result<SetOutcome, TableError> {
        let base = self.shards[index].bucket_count();
        for target in [base << 1, base << 2] {
            if target > self.geometry.buckets_limit {
                return Err(TableError::CapacityExceeded);
            }
            if !self.shards[index].resize(target) {
                continue;
            }
            match self.shards[index].set(h1, h2, key, value) {
                SetResult::Updated => return Ok(SetOutcome::Updated),
                SetResult::Inserted => {
                    self.length += 1;
                    return Ok(SetOutcome::Inserted);
                }
                SetResult::Overflow => {}
            }
        }
        Err(TableError::SetExhausted)
    }

    /// Shard routing from the high byte of both hash words, orthogonal to
    /// the low bits shards consume.
    #[inline]
    fn route(&self, h1: u32, h2: u32) -> usize {
        ((((h1 >> 24) << 8) | (h2 >> 24)) & self.shard_mask) as usize
    }

    #[inline]
    fn check_key(&self, key: &[u8]) {
        assert_eq!(
            key.len(),
            self.geometry.layout.key_size,
            "key length must equal the configured key_size"
        );
    }

    #[inline]
    fn check_value<'v>(&self, value: Option<&'v [u8]>) -> &'v [u8] {
        let value = value.unwrap_or_default();
        assert_eq!(
            value.len(),
            self.geometry.layout.value_size,
            "value length must equal the configured value_size"
        );
        value
    }

    #[inline]
    fn check_value_out<'v>(&self, value: Option<&'v mut [u8]>) -> &'v mut [u8] {
        let value = value.unwrap_or_default();
        assert_eq!(
            value.len(),
            self.geometry.layout.value_size,
            "value length must equal the configured value_size"
        );
        value
    }
}

impl fmt::Debug for DenseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseTable")
            .field("key_size", &self.key_size())
            .field("value_size", &self.value_size())
            .field("mode", &self.mode)
            .field("length", &self.length)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
