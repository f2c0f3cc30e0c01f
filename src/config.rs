//! Constructor arguments and derived shard geometry.
//!
//! Everything here is pure configuration math: validation of the four
//! constructor arguments and the static sizing that turns them into a shard
//! count, an initial bucket count, and a growth ceiling. No buffer is touched
//! in this module.
//!
//! # Sizing rules
//! - `shard_count` is the smallest power of two whose shards can collectively
//!   reach `elements_max`, clamped to `[1, 8192]`. A shard's reach is limited
//!   both by the bucket ceiling (65536) and by its buffer staying under
//!   `BUFFER_MAX` at the configured stride.
//! - `initial_buckets` spreads `elements_min` across the shards at eight
//!   elements per bucket, clamped to `[2, buckets_limit]`.
//! - Shards grow independently by doubling; they never exceed
//!   `buckets_limit`, so the limits checked here hold for the whole lifetime.

use crate::bucket;
use crate::error::ConfigError;

/// Inclusive key size bounds; keys are also required to be 4-byte multiples.
pub const KEY_SIZE_MIN: usize = 4;
pub const KEY_SIZE_MAX: usize = 64;

/// Largest supported value size (1 MiB).
pub const VALUE_SIZE_MAX: usize = 1 << 20;

/// Largest element count a table may be configured for.
pub const ELEMENTS_LIMIT: u64 = 1 << 32;

/// Largest byte size of a single shard buffer (2 GiB minus one).
pub(crate) const BUFFER_MAX: u64 = (1 << 31) - 1;

/// Largest number of shards.
pub(crate) const SHARDS_MAX: u64 = 8192;

/// Largest number of buckets in one shard.
pub(crate) const BUCKETS_MAX: u64 = 65_536;

/// Smallest number of buckets in one shard.
pub(crate) const BUCKETS_MIN: u64 = 2;

const ELEMENTS_MIN_DEFAULT: u64 = 1024;

/// Builder-style constructor arguments for a table.
///
/// # Examples
/// ```
/// use densetable::{Config, DenseTable};
///
/// let table = DenseTable::new(Config::new(4, 4).elements_min(8)).unwrap();
/// assert_eq!(table.len(), 0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    key_size: usize,
    value_size: usize,
    elements_min: u64,
    elements_max: Option<u64>,
}

impl Config {
    /// Starts a configuration for `key_size`-byte keys and
    /// `value_size`-byte values.
    ///
    /// Validation happens when the table is constructed, not here.
    pub fn new(key_size: usize, value_size: usize) -> Self {
        Self {
            key_size,
            value_size,
            elements_min: ELEMENTS_MIN_DEFAULT,
            elements_max: None,
        }
    }

    /// Sets the element count the initial allocation is sized for
    /// (default 1024).
    pub fn elements_min(mut self, elements_min: u64) -> Self {
        self.elements_min = elements_min;
        self
    }

    /// Sets the growth bound. Defaults to
    /// `min(max(elements_min + 4194304, elements_min * 1024), 2^32)`.
    pub fn elements_max(mut self, elements_max: u64) -> Self {
        self.elements_max = Some(elements_max);
        self
    }
}

/// Fully resolved geometry a table is built from.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Geometry {
    pub layout: bucket::Layout,
    pub elements_max: u64,
    pub shard_count: u32,
    pub initial_buckets: u32,
    /// Per-shard bucket ceiling; resize targets above this are refused.
    pub buckets_limit: u32,
}

/// Validates a [`Config`] and derives the shard geometry.
pub(crate) fn resolve(config: &Config) -> Result<Geometry, ConfigError> {
    let Config {
        key_size,
        value_size,
        elements_min,
        elements_max,
    } = *config;

    if !(KEY_SIZE_MIN..=KEY_SIZE_MAX).contains(&key_size) {
        return Err(ConfigError::KeySize { given: key_size });
    }
    if key_size % 4 != 0 {
        return Err(ConfigError::KeySizeAlignment { given: key_size });
    }
    if value_size > VALUE_SIZE_MAX {
        return Err(ConfigError::ValueSize { given: value_size });
    }
    if elements_min > ELEMENTS_LIMIT {
        return Err(ConfigError::ElementsMin { given: elements_min });
    }

    let floor = elements_min.max(1);
    let elements_max = elements_max.unwrap_or_else(|| {
        (elements_min + 4_194_304)
            .max(elements_min.saturating_mul(1024))
            .min(ELEMENTS_LIMIT)
    });
    if elements_max < floor || elements_max > ELEMENTS_LIMIT {
        return Err(ConfigError::ElementsMax {
            given: elements_max,
            floor,
        });
    }

    let layout = bucket::Layout::new(key_size, value_size);

    // A shard buffer must hold at least the minimum bucket count.
    let buckets_limit = BUCKETS_MAX.min(prev_pow2(BUFFER_MAX / layout.stride as u64));
    if buckets_limit < BUCKETS_MIN {
        return Err(ConfigError::CapacityExceeded);
    }

    let per_shard_elements = buckets_limit * bucket::SLOTS as u64;
    let shard_count = next_pow2(elements_max.div_ceil(per_shard_elements)).min(SHARDS_MAX);
    if shard_count * per_shard_elements < elements_max {
        return Err(ConfigError::CapacityExceeded);
    }

    let initial_buckets = next_pow2(elements_min.div_ceil(shard_count).div_ceil(8))
        .clamp(BUCKETS_MIN, buckets_limit);

    Ok(Geometry {
        layout,
        elements_max,
        shard_count: shard_count as u32,
        initial_buckets: initial_buckets as u32,
        buckets_limit: buckets_limit as u32,
    })
}

/// Smallest power of two `>= v`, with `next_pow2(0) == 1`.
#[inline]
fn next_pow2(v: u64) -> u64 {
    v.max(1).next_power_of_two()
}

/// Largest power of two `<= v`; `v` must be nonzero.
#[inline]
fn prev_pow2(v: u64) -> u64 {
    debug_assert!(v > 0);
    1 << (u64::BITS - 1 - v.leading_zeros())
}
