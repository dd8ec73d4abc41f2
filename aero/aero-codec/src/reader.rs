//! Typed reads with optional byte swapping.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::{CodecError, CodecResult, Element};

/// Largest staging buffer used by a single bulk read.
pub const CHUNK_BYTES: usize = 64 * 1024;

/// Reads primitive elements from a byte stream.
///
/// When the swap flag is set, the bytes of every element are reversed
/// before decoding.
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    swap: bool,
    scratch: Vec<u8>,
}

impl<R: Read> BinaryReader<R> {
    /// Wrap a stream. Swapping starts off.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            swap: false,
            scratch: Vec::new(),
        }
    }

    /// Enable or disable byte swapping for subsequent reads.
    pub const fn set_swap(&mut self, swap: bool) {
        self.swap = swap;
    }

    /// Flip the byte-swap flag.
    pub const fn toggle_swap(&mut self) {
        self.swap = !self.swap;
    }

    /// Whether reads are currently byte-swapped.
    #[must_use]
    pub const fn swaps(&self) -> bool {
        self.swap
    }

    /// Borrow the underlying stream.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `out` with as many whole elements as the stream provides.
    ///
    /// Returns the number of complete elements decoded, which is less than
    /// `out.len()` only when the stream ended early. Elements past that
    /// count are left untouched. Bytes are staged through a buffer of at
    /// most [`CHUNK_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] for stream failures other than end of file.
    pub fn read_into<T: Element>(&mut self, out: &mut [T]) -> CodecResult<usize> {
        let per_chunk = (CHUNK_BYTES / T::SIZE).max(1);
        let mut done = 0;
        for slots in out.chunks_mut(per_chunk) {
            let got = self.fill(slots)?;
            done += got;
            if got < slots.len() {
                break;
            }
        }
        Ok(done)
    }

    fn fill<T: Element>(&mut self, out: &mut [T]) -> CodecResult<usize> {
        let wanted = out.len() * T::SIZE;
        self.scratch.clear();
        self.scratch.resize(wanted, 0);

        let mut filled = 0;
        while filled < wanted {
            match self.inner.read(&mut self.scratch[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(CodecError::Io(e)),
            }
        }

        let got = filled / T::SIZE;
        for (slot, chunk) in out
            .iter_mut()
            .zip(self.scratch.chunks_exact_mut(T::SIZE))
            .take(got)
        {
            if self.swap {
                chunk.reverse();
            }
            *slot = T::from_native(chunk);
        }
        Ok(got)
    }

    /// Read exactly one element.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ShortRead`] if the stream ends first.
    pub fn read<T: Element>(&mut self) -> CodecResult<T> {
        let mut one = [T::default()];
        let got = self.read_into(&mut one)?;
        if got == 1 {
            Ok(one[0])
        } else {
            Err(CodecError::ShortRead { expected: 1, got })
        }
    }

    /// Read exactly `count` elements into a new vector.
    ///
    /// The vector grows as data arrives, so a `count` taken from a corrupt
    /// header fails with a short read instead of a huge allocation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ShortRead`] if fewer than `count` arrive.
    pub fn read_vec<T: Element>(&mut self, count: usize) -> CodecResult<Vec<T>> {
        let per_chunk = (CHUNK_BYTES / T::SIZE).max(1);
        let mut out = Vec::with_capacity(count.min(per_chunk));
        while out.len() < count {
            let start = out.len();
            let n = (count - start).min(per_chunk);
            out.resize(start + n, T::default());
            let got = self.fill(&mut out[start..])?;
            if got < n {
                return Err(CodecError::ShortRead {
                    expected: count,
                    got: start + got,
                });
            }
        }
        Ok(out)
    }

    /// Read a fixed-size array of elements.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ShortRead`] if fewer than `N` arrive.
    pub fn read_array<T: Element, const N: usize>(&mut self) -> CodecResult<[T; N]> {
        let mut out = [T::default(); N];
        let got = self.read_into(&mut out)?;
        if got == N {
            Ok(out)
        } else {
            Err(CodecError::ShortRead { expected: N, got })
        }
    }

    /// Read a fixed-width, NUL-padded character field as an owned string.
    ///
    /// Bytes after the first NUL are ignored; invalid UTF-8 is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ShortRead`] if fewer than `width` bytes arrive.
    pub fn read_name(&mut self, width: usize) -> CodecResult<String> {
        let raw: Vec<u8> = self.read_vec(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).trim_end().to_string())
    }
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Current byte offset in the stream.
    ///
    /// # Errors
    ///
    /// Propagates seek failures.
    pub fn position(&mut self) -> CodecResult<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Move to an absolute byte offset.
    ///
    /// # Errors
    ///
    /// Propagates seek failures.
    pub fn seek_to(&mut self, offset: u64) -> CodecResult<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Return to the start of the stream.
    ///
    /// # Errors
    ///
    /// Propagates seek failures.
    pub fn rewind(&mut self) -> CodecResult<()> {
        self.seek_to(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn swapped_read_reverses_each_element() {
        let bytes = 1_i32.to_be_bytes();
        let mut reader = BinaryReader::new(&bytes[..]);
        reader.set_swap(cfg!(target_endian = "little"));
        assert_eq!(reader.read::<i32>().unwrap(), 1);
    }

    #[test]
    fn short_bulk_read_reports_count() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7_i32.to_ne_bytes());
        bytes.extend_from_slice(&8_i32.to_ne_bytes());
        bytes.extend_from_slice(&[1, 2]); // partial third element

        let mut reader = BinaryReader::new(bytes.as_slice());
        let mut out = [0_i32; 4];
        let got = reader.read_into(&mut out).unwrap();
        assert_eq!(got, 2);
        assert_eq!(&out[..2], &[7, 8]);
        assert_eq!(out[2], 0);
    }

    #[test]
    fn scalar_read_at_eof_is_short_read() {
        let mut reader = BinaryReader::new(&[0u8; 2][..]);
        match reader.read::<f32>() {
            Err(CodecError::ShortRead { expected: 1, got: 0 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn huge_count_on_short_body_is_short_read() {
        let bytes: Vec<u8> = (0..10_i32).flat_map(i32::to_ne_bytes).collect();
        let mut reader = BinaryReader::new(bytes.as_slice());
        match reader.read_vec::<f32>(usize::MAX / 8) {
            Err(CodecError::ShortRead { got: 10, .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bulk_read_spans_chunks() {
        let n = CHUNK_BYTES / 8 * 2 + 5;
        let bytes: Vec<u8> = (0..n)
            .flat_map(|i| f64::from(u32::try_from(i).unwrap()).to_ne_bytes())
            .collect();
        let mut reader = BinaryReader::new(bytes.as_slice());
        let values: Vec<f64> = reader.read_vec(n).unwrap();
        assert_eq!(values.len(), n);
        assert_eq!(values[n - 1], f64::from(u32::try_from(n - 1).unwrap()));

        let mut reader = BinaryReader::new(bytes.as_slice());
        let mut out = vec![0.0_f64; n + 3];
        assert_eq!(reader.read_into(&mut out).unwrap(), n);
    }

    #[test]
    fn name_stops_at_nul() {
        let mut field = [0u8; 10];
        field[..4].copy_from_slice(b"Wing");
        field[6] = b'x';
        let mut reader = BinaryReader::new(&field[..]);
        assert_eq!(reader.read_name(10).unwrap(), "Wing");
    }

    #[test]
    fn seek_and_reread() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&3.25_f64.to_ne_bytes());
        let mut reader = BinaryReader::new(Cursor::new(bytes));
        assert_eq!(reader.read::<f64>().unwrap(), 3.25);
        assert_eq!(reader.position().unwrap(), 8);
        reader.rewind().unwrap();
        assert_eq!(reader.read::<f64>().unwrap(), 3.25);
    }
}
