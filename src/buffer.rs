//! Cache-line-aligned byte buffer backing one shard.
//!
//! The bucket protocol requires 64-byte alignment so a bucket's metadata and
//! first slots share a line. `Vec<u8>` gives no alignment guarantee, so the
//! buffer is allocated as a vector of 64-byte lines and viewed as bytes.
//!
//! # Invariants
//! - The byte length is always a multiple of 64.
//! - The base pointer is 64-byte aligned.
//!
//! # Safety
//! The byte views below reinterpret the line storage. This is sound because
//! `Line` is a plain `[u8; 64]` with alignment 64 and no padding, so every
//! byte of the allocation is initialized and addressable.

use crate::bucket::LINE;

#[repr(C, align(64))]
#[derive(Clone, Copy)]
struct Line([u8; LINE]);

/// Owned, zero-initialized, 64-byte-aligned byte buffer.
pub(crate) struct AlignedBuf {
    lines: Vec<Line>,
}

impl AlignedBuf {
    /// Allocates `len` zeroed bytes.
    ///
    /// # Panics
    /// Panics if `len` is not a multiple of 64.
    pub(crate) fn zeroed(len: usize) -> Self {
        assert!(len % LINE == 0, "aligned buffer length must be a multiple of 64");
        Self {
            lines: vec![Line([0u8; LINE]); len / LINE],
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.lines.len() * LINE
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: `Line` is `[u8; 64]` with no padding; the allocation holds
        // `lines.len() * 64` initialized bytes.
        unsafe { std::slice::from_raw_parts(self.lines.as_ptr().cast::<u8>(), self.len()) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`, plus exclusive access via `&mut self`.
        unsafe {
            std::slice::from_raw_parts_mut(self.lines.as_mut_ptr().cast::<u8>(), self.len())
        }
    }
}
