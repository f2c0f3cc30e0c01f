//! Error types for table construction and operation.
//!
//! Construction and operation failures are kept in separate enums so callers
//! can match on the stage that failed. All enums are `#[non_exhaustive]` to
//! allow adding variants without breaking callers; consumers should include a
//! fallback match arm.
//!
//! The `Display` strings of [`TableError`] are stable and part of the public
//! contract; callers may match on them across process boundaries.

use std::fmt;

/// Errors from constructor argument validation and derived sizing.
///
/// These errors occur before any buffer is allocated and are fatal to the
/// container being constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `key_size` is outside `[4, 64]`.
    KeySize { given: usize },
    /// `key_size` is not a multiple of 4.
    KeySizeAlignment { given: usize },
    /// `value_size` is outside `[0, 1_048_576]`.
    ValueSize { given: usize },
    /// `elements_min` exceeds the element-count limit.
    ElementsMin { given: u64 },
    /// `elements_max` is below `elements_min` (or zero) or exceeds the
    /// element-count limit.
    ElementsMax { given: u64, floor: u64 },
    /// No shard geometry within the buffer and bucket limits can reach the
    /// requested `elements_max`.
    CapacityExceeded,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeySize { given } => {
                write!(f, "key_size out of range: {given} (expected 4..=64)")
            }
            Self::KeySizeAlignment { given } => {
                write!(f, "key_size must be a multiple of 4: {given}")
            }
            Self::ValueSize { given } => {
                write!(f, "value_size out of range: {given} (expected 0..=1048576)")
            }
            Self::ElementsMin { given } => {
                write!(f, "elements_min out of range: {given}")
            }
            Self::ElementsMax { given, floor } => {
                write!(f, "elements_max out of range: {given} (expected {floor}..=4294967296)")
            }
            Self::CapacityExceeded => write!(f, "maximum capacity exceeded"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from `set` and `cache` calls on a constructed table.
///
/// None of these leave the container unusable. A mode conflict mutates
/// nothing; an exhausted or capacity-bound `set` leaves the target shard
/// restored to its state before the failed growth attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    /// The container is locked to the other operating mode.
    ModeConflict,
    /// Two shard growth attempts could not absorb the new element.
    SetExhausted,
    /// Growing the target shard would exceed the per-shard buffer or bucket
    /// limit.
    CapacityExceeded,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeConflict => {
                write!(f, "cache() and set() methods are mutually exclusive")
            }
            Self::SetExhausted => {
                write!(f, "set() failed despite multiple resize attempts")
            }
            Self::CapacityExceeded => write!(f, "maximum capacity exceeded"),
        }
    }
}

impl std::error::Error for TableError {}
