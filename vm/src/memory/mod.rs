//! Word-addressed scratch memory with per-step access tracking.
//!
//! Memory only grows, always in whole 32-byte words. Every access made
//! through [`Memory::load`] or [`Memory::store`] widens the read or write
//! range of the current step so the trace recorder knows which part of the
//! memory image a single-step proof has to carry.

mod calldata;

pub use calldata::CallData;
use serde::{Deserialize, Serialize};

use crate::{
    execution::VmError,
    integer_ops::{word_to_be, Word},
};

pub const WORD_SIZE: usize = 32;

/// Half-open byte range `[start, end)` touched during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Records the widest range accessed since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessTracker(Option<ByteRange>);

impl AccessTracker {
    pub fn touch(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let range = ByteRange::new(offset, offset + len);
        self.0 = Some(self.0.map_or(range, |prev| prev.union(range)));
    }

    pub const fn range(&self) -> Option<ByteRange> {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}

/// Converts a stack word into a byte offset, bounded by the configured
/// memory limit.
pub fn to_offset(value: Word, limit: usize) -> Result<usize, VmError> {
    if value > Word::from(limit) {
        return Err(VmError::InternalError);
    }
    Ok(value.low_u64() as usize)
}

/// Converts an `(offset, length)` pair, rejecting regions that end past the
/// memory limit. A zero length never fails and yields offset 0.
pub fn to_region(offset: Word, len: Word, limit: usize) -> Result<(usize, usize), VmError> {
    let len = to_offset(len, limit)?;
    if len == 0 {
        return Ok((0, 0));
    }
    let offset = to_offset(offset, limit)?;
    match offset.checked_add(len) {
        Some(end) if end <= limit => Ok((offset, len)),
        _ => Err(VmError::InternalError),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
    reads: AccessTracker,
    writes: AccessTracker,
}

impl Memory {
    /// Wraps an existing memory image, padding it to a whole number of words.
    pub fn from_bytes(mut data: Vec<u8>) -> Self {
        let padded = data.len().div_ceil(WORD_SIZE) * WORD_SIZE;
        data.resize(padded, 0);
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in 32-byte words.
    pub fn word_count(&self) -> usize {
        self.data.len() / WORD_SIZE
    }

    /// Grows memory to cover `[offset, offset + len)`.
    pub fn expand(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let words = (offset + len).div_ceil(WORD_SIZE);
        if words * WORD_SIZE > self.data.len() {
            self.data.resize(words * WORD_SIZE, 0);
        }
    }

    /// Reads a region, growing memory as needed and recording the read.
    pub fn load(&mut self, offset: usize, len: usize) -> Vec<u8> {
        if len == 0 {
            return Vec::new();
        }
        self.expand(offset, len);
        self.reads.touch(offset, len);
        self.data[offset..offset + len].to_vec()
    }

    pub fn load_word(&mut self, offset: usize) -> Word {
        Word::from_big_endian(&self.load(offset, WORD_SIZE))
    }

    /// Writes `len` bytes taken from `src` starting at `src_offset`; bytes
    /// past the end of `src` are written as zero.
    pub fn store(&mut self, offset: usize, len: usize, src: &[u8], src_offset: usize) {
        if len == 0 {
            return;
        }
        self.expand(offset, len);
        self.writes.touch(offset, len);

        let dest = &mut self.data[offset..offset + len];
        let available = src.len().saturating_sub(src_offset).min(len);
        if available > 0 {
            dest[..available].copy_from_slice(&src[src_offset..src_offset + available]);
        }
        dest[available..].fill(0);
    }

    pub fn store_word(&mut self, offset: usize, value: Word) {
        self.store(offset, WORD_SIZE, &word_to_be(value), 0);
    }

    /// Reads a region without growing memory or recording the access.
    /// Bytes beyond the current size read as zero.
    pub fn peek(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        if offset < self.data.len() {
            let available = (self.data.len() - offset).min(len);
            out[..available].copy_from_slice(&self.data[offset..offset + available]);
        }
        out
    }

    pub const fn read_range(&self) -> Option<ByteRange> {
        self.reads.range()
    }

    pub const fn write_range(&self) -> Option<ByteRange> {
        self.writes.range()
    }

    pub fn reset_tracking(&mut self) {
        self.reads.reset();
        self.writes.reset();
    }
}
