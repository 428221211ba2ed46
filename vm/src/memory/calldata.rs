use super::{AccessTracker, ByteRange};
use crate::integer_ops::Word;

/// Read-only call input with read tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallData {
    data: Vec<u8>,
    reads: AccessTracker,
}

impl CallData {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            reads: AccessTracker::default(),
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

    /// Length query; the proof for such a step needs the whole input.
    pub fn size(&mut self) -> usize {
        self.reads.touch(0, self.data.len());
        self.data.len()
    }

    /// 32 bytes starting at `offset`, zero padded on the right.
    pub fn load_word(&mut self, offset: usize) -> Word {
        Word::from_big_endian(&self.read(offset, 32))
    }

    /// Copies `len` bytes starting at `offset`; bytes past the end read as zero.
    pub fn read(&mut self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        if offset < self.data.len() {
            let available = (self.data.len() - offset).min(len);
            out[..available].copy_from_slice(&self.data[offset..offset + available]);
            self.reads.touch(offset, available);
        }
        out
    }

    pub const fn read_range(&self) -> Option<ByteRange> {
        self.reads.range()
    }

    pub fn reset_tracking(&mut self) {
        self.reads.reset();
    }
}
