//! Sequential and random access over solution cases.

use std::io::{self, Read, Seek};

use aero_codec::{BinaryReader, CodecError};
use tracing::debug;

use crate::case::{SolutionCase, read_case, skip_case};
use crate::case_list::CaseListEntry;
use crate::error::{AdbError, AdbResult};
use crate::mesh::CaseLayout;

/// Byte stream that may or may not support returning to an earlier offset.
///
/// Every `Read + Seek` type qualifies. Wrap a forward-only stream in
/// [`Sequential`].
pub trait CaseStream: Read {
    /// Current offset, or `None` when the stream cannot seek.
    ///
    /// # Errors
    ///
    /// Propagates seek failures.
    fn offset(&mut self) -> io::Result<Option<u64>>;

    /// Move to an offset previously returned by [`CaseStream::offset`].
    ///
    /// # Errors
    ///
    /// Propagates seek failures.
    fn return_to(&mut self, offset: u64) -> io::Result<()>;
}

impl<R: Read + Seek> CaseStream for R {
    fn offset(&mut self) -> io::Result<Option<u64>> {
        self.stream_position().map(Some)
    }

    fn return_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(io::SeekFrom::Start(offset)).map(drop)
    }
}

/// Forward-only stream adapter.
#[derive(Debug)]
pub struct Sequential<R>(pub R);

impl<R: Read> Read for Sequential<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> CaseStream for Sequential<R> {
    fn offset(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    fn return_to(&mut self, _offset: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "sequential stream cannot seek",
        ))
    }
}

/// Reads solution cases that follow the mesh section.
///
/// Cases are numbered from 1. The cursor remembers where each case it has
/// passed begins, so on a seekable stream an earlier case is reached by a
/// single seek instead of a rescan.
#[derive(Debug)]
pub struct CaseCursor<R> {
    reader: BinaryReader<R>,
    layout: CaseLayout,
    entries: Vec<CaseListEntry>,
    bookmarks: Vec<u64>,
    next: usize,
}

impl<R: CaseStream> CaseCursor<R> {
    /// Create a cursor positioned at the first case.
    ///
    /// `reader` must sit right after the mesh section with its swap flag set.
    #[must_use]
    pub const fn new(reader: BinaryReader<R>, layout: CaseLayout) -> Self {
        Self {
            reader,
            layout,
            entries: Vec::new(),
            bookmarks: Vec::new(),
            next: 1,
        }
    }

    /// Attach the case list, which bounds the case count and supplies comments.
    #[must_use]
    pub fn with_case_list(mut self, entries: Vec<CaseListEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Case number the next sequential read returns.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.next
    }

    /// Number of cases known from the case list, if one was attached.
    #[must_use]
    pub fn known_cases(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.entries.len())
    }

    /// Array sizes of every block.
    #[must_use]
    pub const fn layout(&self) -> &CaseLayout {
        &self.layout
    }

    fn mark(&mut self) -> AdbResult<()> {
        if self.bookmarks.len() + 1 == self.next {
            let offset = self
                .reader
                .get_mut()
                .offset()
                .map_err(|e| AdbError::Truncated {
                    section: "case bookmark",
                    source: CodecError::Io(e),
                })?;
            if let Some(offset) = offset {
                self.bookmarks.push(offset);
            }
        }
        Ok(())
    }

    fn return_to(&mut self, offset: u64) -> AdbResult<()> {
        self.reader
            .get_mut()
            .return_to(offset)
            .map_err(|e| AdbError::Truncated {
                section: "case bookmark",
                source: CodecError::Io(e),
            })
    }

    fn past_end(&self) -> bool {
        self.known_cases().is_some_and(|n| self.next > n)
    }

    /// Read the next case.
    ///
    /// Returns `Ok(None)` once the case list is exhausted or the stream
    /// ends cleanly on a block boundary.
    ///
    /// # Errors
    ///
    /// Returns [`AdbError::Truncated`] if a block is cut short.
    pub fn next_case(&mut self) -> AdbResult<Option<SolutionCase>> {
        if self.past_end() {
            return Ok(None);
        }
        self.mark()?;
        match read_case(&mut self.reader, &self.layout, self.next) {
            Ok(mut case) => {
                if let Some(entry) = self.entries.get(self.next - 1) {
                    case.comment.clone_from(&entry.comment);
                }
                self.next += 1;
                Ok(Some(case))
            }
            Err(AdbError::Truncated {
                section: "case header",
                source: CodecError::ShortRead { got: 0, .. },
            }) => {
                self.bookmarks.truncate(self.next - 1);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Read case `n` (1-based).
    ///
    /// # Errors
    ///
    /// - [`AdbError::CaseOutOfRange`] for `n == 0`, `n` beyond the case list, or
    ///   `n` beyond the end of the stream
    /// - [`AdbError::CaseBehindCursor`] when `n` was already passed and the
    ///   stream cannot seek
    /// - [`AdbError::Truncated`] if a block is cut short
    pub fn goto_case(&mut self, n: usize) -> AdbResult<SolutionCase> {
        let out_of_range = |available| AdbError::CaseOutOfRange {
            requested: n,
            available,
        };
        if n == 0 {
            return Err(out_of_range(self.known_cases().unwrap_or(0)));
        }
        if let Some(known) = self.known_cases().filter(|&k| n > k) {
            return Err(out_of_range(known));
        }

        if n < self.next {
            let offset = *self
                .bookmarks
                .get(n - 1)
                .ok_or(AdbError::CaseBehindCursor {
                    requested: n,
                    next: self.next,
                })?;
            self.return_to(offset)?;
            self.next = n;
            debug!(case = n, offset, "Returned to bookmarked case");
        } else if n > self.next {
            if let Some(&offset) = self.bookmarks.get(n - 1) {
                self.return_to(offset)?;
                self.next = n;
            }
            while self.next < n {
                self.mark()?;
                skip_case(&mut self.reader, &self.layout).map_err(|e| match e {
                    AdbError::Truncated {
                        section: "case header",
                        source: CodecError::ShortRead { got: 0, .. },
                    } => out_of_range(self.next - 1),
                    other => other,
                })?;
                self.next += 1;
            }
        }

        self.next_case()?.ok_or_else(|| out_of_range(n - 1))
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> BinaryReader<R> {
        self.reader
    }
}

impl<R: CaseStream> Iterator for CaseCursor<R> {
    type Item = AdbResult<SolutionCase>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_case().transpose()
    }
}
