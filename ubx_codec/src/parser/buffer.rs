use alloc::vec::Vec;
use core::ops::{Index, Range};

/// Storage the [`Parser`](super::Parser) accumulates partial frames in.
///
/// Implemented for `Vec<u8>`, which grows as needed, and for [`FixedBuffer`],
/// which never allocates. A frame larger than the buffer's capacity is
/// reported as [`ParserError::OutOfMemory`](crate::ParserError::OutOfMemory)
/// and skipped.
pub trait UnderlyingBuffer: Index<Range<usize>, Output = [u8]> + Index<usize, Output = u8> {
    fn clear(&mut self);

    fn len(&self) -> usize;

    /// Most bytes the buffer can ever hold
    fn max_capacity(&self) -> usize;

    /// Appends as much of `other` as fits, returning the number of bytes left out
    fn extend_from_slice(&mut self, other: &[u8]) -> usize;

    /// Removes the first `count` bytes, or everything if there are fewer
    fn drain(&mut self, count: usize);

    fn find(&self, value: u8) -> Option<usize> {
        (0..self.len()).find(|&i| self[i] == value)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnderlyingBuffer for Vec<u8> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn max_capacity(&self) -> usize {
        usize::MAX
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        Vec::extend_from_slice(self, other);
        0
    }

    fn drain(&mut self, count: usize) {
        let count = count.min(Vec::len(self));
        Vec::drain(self, ..count);
    }

    fn find(&self, value: u8) -> Option<usize> {
        self.iter().position(|b| *b == value)
    }
}

/// Owned buffer of `N` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedBuffer<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Index<Range<usize>> for FixedBuffer<N> {
    type Output = [u8];

    fn index(&self, index: Range<usize>) -> &[u8] {
        &self.as_slice()[index]
    }
}

impl<const N: usize> Index<usize> for FixedBuffer<N> {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.as_slice()[index]
    }
}

impl<const N: usize> UnderlyingBuffer for FixedBuffer<N> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        N
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        let to_copy = other.len().min(N - self.len);
        self.data[self.len..self.len + to_copy].copy_from_slice(&other[..to_copy]);
        self.len += to_copy;
        other.len() - to_copy
    }

    fn drain(&mut self, count: usize) {
        if count >= self.len {
            self.len = 0;
            return;
        }
        self.data.copy_within(count..self.len, 0);
        self.len -= count;
    }

    fn find(&self, value: u8) -> Option<usize> {
        self.as_slice().iter().position(|b| *b == value)
    }
}
