//! Byte accumulator for the encoder.
//!
//! Scalar bytes are batched in `pieces` and only turned into a chunk when a
//! bulk chunk arrives or the buffer is finalized, so neither kind of append
//! forces the output to be regrown byte by byte.

use bytes::{BufMut, Bytes, BytesMut};

#[derive(Debug, Default)]
pub struct BufferBuilder {
    pieces: Vec<u8>,
    parts: Vec<Bytes>,
    flushed_len: usize,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers one scalar byte.
    pub fn push(&mut self, byte: u8) {
        self.pieces.push(byte);
    }

    /// Buffers the bytes of a big-endian scalar field.
    pub fn push_slice(&mut self, bytes: &[u8]) {
        self.pieces.extend_from_slice(bytes);
    }

    pub fn push_u16(&mut self, value: u16) {
        self.push_slice(&value.to_be_bytes());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.push_slice(&value.to_be_bytes());
    }

    pub fn push_u64(&mut self, value: u64) {
        self.push_slice(&value.to_be_bytes());
    }

    /// Appends a bulk chunk as its own part, after any pending scalar bytes.
    pub fn append(&mut self, chunk: impl Into<Bytes>) {
        self.flush();
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.flushed_len += chunk.len();
            self.parts.push(chunk);
        }
    }

    /// Coalesces pending scalar bytes into one part. Does nothing when none are pending.
    pub fn flush(&mut self) {
        if !self.pieces.is_empty() {
            let piece = Bytes::from(std::mem::take(&mut self.pieces));
            self.flushed_len += piece.len();
            self.parts.push(piece);
        }
    }

    /// Drops everything appended after the first `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.flushed_len {
            self.pieces.truncate(len - self.flushed_len);
            return;
        }
        self.pieces.clear();
        while let Some(last) = self.parts.last_mut() {
            let part_start = self.flushed_len - last.len();
            if part_start < len {
                last.truncate(len - part_start);
                self.flushed_len = len;
                break;
            }
            self.flushed_len = part_start;
            self.parts.pop();
            if part_start == len {
                break;
            }
        }
    }

    /// Total number of bytes appended so far.
    pub fn len(&self) -> usize {
        self.flushed_len + self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes and returns all parts concatenated in order.
    pub fn finalize(mut self) -> Bytes {
        self.flush();
        match self.parts.len() {
            0 => Bytes::new(),
            1 => self.parts.swap_remove(0),
            _ => {
                let mut out = BytesMut::with_capacity(self.flushed_len);
                for part in &self.parts {
                    out.put_slice(part);
                }
                out.freeze()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder() {
        let builder = BufferBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.finalize().is_empty());
    }

    #[test]
    fn scalars_and_chunks_keep_order() {
        let mut builder = BufferBuilder::new();
        builder.push(0x01);
        builder.push(0x02);
        builder.append(Bytes::from_static(&[0xAA, 0xBB]));
        builder.push_u16(0x0304);
        builder.append(vec![0xCC]);
        builder.push_u32(0x0506_0708);
        assert_eq!(builder.len(), 11);
        assert_eq!(
            &builder.finalize()[..],
            &[0x01, 0x02, 0xAA, 0xBB, 0x03, 0x04, 0xCC, 0x05, 0x06, 0x07, 0x08]
        );
    }

    #[test]
    fn flush_is_idempotent() {
        let mut once = BufferBuilder::new();
        once.push(0x93);
        once.push_u64(1);
        once.flush();

        let mut twice = BufferBuilder::new();
        twice.push(0x93);
        twice.push_u64(1);
        twice.flush();
        twice.flush();

        assert_eq!(twice.parts.len(), 1);
        assert_eq!(once.finalize(), twice.finalize());
    }

    #[test]
    fn truncate_pending_and_flushed_bytes() {
        let mut builder = BufferBuilder::new();
        builder.push(0x01);
        builder.append(vec![0x02, 0x03, 0x04]);
        builder.push(0x05);
        builder.append(vec![0x06]);
        builder.push(0x07);

        builder.truncate(7);
        assert_eq!(builder.len(), 7);

        builder.truncate(6);
        assert_eq!(builder.len(), 6);

        // Cuts into the middle of the `02 03 04` chunk.
        builder.truncate(2);
        assert_eq!(builder.len(), 2);
        builder.push(0xFF);
        assert_eq!(&builder.finalize()[..], &[0x01, 0x02, 0xFF]);
    }

    #[test]
    fn truncate_to_empty() {
        let mut builder = BufferBuilder::new();
        builder.append(vec![0x01, 0x02]);
        builder.push(0x03);
        builder.truncate(0);
        assert!(builder.is_empty());
        assert!(builder.finalize().is_empty());
    }

    #[test]
    fn empty_chunk_adds_no_part() {
        let mut builder = BufferBuilder::new();
        builder.append(Bytes::new());
        assert!(builder.parts.is_empty());
        builder.push(0xC0);
        assert_eq!(&builder.finalize()[..], &[0xC0]);
    }

    #[test]
    fn single_chunk_is_returned_without_copy() {
        let chunk = Bytes::from(vec![1, 2, 3]);
        let mut builder = BufferBuilder::new();
        builder.append(chunk.clone());
        let out = builder.finalize();
        assert_eq!(out.as_ptr(), chunk.as_ptr());
    }
}
