use heapless::Vec;

use crate::CAPACITY;

/// Bounded store for bytes received from the sensor but not yet framed.
#[derive(Debug, Clone, Default)]
pub struct ByteAccumulator {
    bytes: Vec<u8, CAPACITY>,
}

impl ByteAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Appends as many of `bytes` as fit and returns how many were taken.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let taken = bytes.len().min(self.remaining());
        let appended = self.bytes.extend_from_slice(&bytes[..taken]);
        debug_assert!(appended.is_ok(), "`taken` never exceeds the free space");
        taken
    }

    /// Drops the first `n` bytes, keeping the rest in order.
    pub fn consume(&mut self, n: usize) {
        if n >= self.bytes.len() {
            self.bytes.clear();
            return;
        }
        self.bytes.copy_within(n.., 0);
        self.bytes.truncate(self.bytes.len() - n);
    }

    /// Discards everything held.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// The held bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when no more bytes can be appended.
    pub fn is_full(&self) -> bool {
        self.bytes.is_full()
    }

    /// Free space left before the buffer is full.
    pub fn remaining(&self) -> usize {
        CAPACITY - self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_bounded() {
        let mut buffer = ByteAccumulator::new();
        assert_eq!(buffer.append(&[0u8; 200]), 200);
        assert_eq!(buffer.append(&[1u8; 100]), 56);
        assert!(buffer.is_full());
        assert_eq!(buffer.append(&[2u8; 4]), 0);
        assert_eq!(buffer.len(), CAPACITY);
    }

    #[test]
    fn test_consume_keeps_tail() {
        let mut buffer = ByteAccumulator::new();
        buffer.append(&[1, 2, 3, 4, 5]);
        buffer.consume(2);
        assert_eq!(buffer.as_slice(), &[3, 4, 5]);
        buffer.consume(10);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = ByteAccumulator::new();
        buffer.append(&[0xAA; 10]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.remaining(), CAPACITY);
    }
}
