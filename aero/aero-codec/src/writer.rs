//! Typed writes with optional byte swapping.

use std::io::Write;

use crate::{CodecResult, Element};

/// Writes primitive elements to a byte stream.
#[derive(Debug)]
pub struct BinaryWriter<W> {
    inner: W,
    swap: bool,
    scratch: Vec<u8>,
}

impl<W: Write> BinaryWriter<W> {
    /// Wrap a stream. Swapping starts off.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            swap: false,
            scratch: Vec::new(),
        }
    }

    /// Enable or disable byte swapping for subsequent writes.
    pub const fn set_swap(&mut self, swap: bool) {
        self.swap = swap;
    }

    /// Flip the byte-swap flag.
    pub const fn toggle_swap(&mut self) {
        self.swap = !self.swap;
    }

    /// Whether writes are currently byte-swapped.
    #[must_use]
    pub const fn swaps(&self) -> bool {
        self.swap
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write a slice of elements.
    ///
    /// # Errors
    ///
    /// Propagates stream failures.
    pub fn write_all<T: Element>(&mut self, values: &[T]) -> CodecResult<()> {
        self.scratch.clear();
        self.scratch.resize(values.len() * T::SIZE, 0);
        for (value, chunk) in values.iter().zip(self.scratch.chunks_exact_mut(T::SIZE)) {
            value.to_native(chunk);
            if self.swap {
                chunk.reverse();
            }
        }
        self.inner.write_all(&self.scratch)?;
        Ok(())
    }

    /// Write one element.
    ///
    /// # Errors
    ///
    /// Propagates stream failures.
    pub fn write<T: Element>(&mut self, value: T) -> CodecResult<()> {
        self.write_all(&[value])
    }

    /// Write a string into a fixed-width, NUL-padded field.
    ///
    /// Names longer than `width - 1` bytes are truncated so the field always
    /// keeps a terminating NUL and never spills into the next value.
    ///
    /// # Errors
    ///
    /// Propagates stream failures.
    pub fn write_name(&mut self, name: &str, width: usize) -> CodecResult<()> {
        let mut field = vec![0u8; width];
        let keep = name.len().min(width.saturating_sub(1));
        field[..keep].copy_from_slice(&name.as_bytes()[..keep]);
        self.write_all(&field)
    }

    /// Flush the underlying stream.
    ///
    /// # Errors
    ///
    /// Propagates stream failures.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryReader;

    #[test]
    fn swapped_write_is_byte_reversed() {
        let mut native = BinaryWriter::new(Vec::new());
        native.write(0x0102_0304_i32).unwrap();
        let mut swapped = BinaryWriter::new(Vec::new());
        swapped.set_swap(true);
        swapped.write(0x0102_0304_i32).unwrap();

        let mut a = native.into_inner();
        a.reverse();
        assert_eq!(a, swapped.into_inner());
    }

    #[test]
    fn long_name_is_truncated_to_field() {
        let long = "N".repeat(250);
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_name(&long, 100).unwrap();
        writer.write(42_i32).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 104);

        let mut reader = BinaryReader::new(bytes.as_slice());
        assert_eq!(reader.read_name(100).unwrap().len(), 99);
        assert_eq!(reader.read::<i32>().unwrap(), 42);
    }
}
