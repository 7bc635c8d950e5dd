//! Look-ahead over byte streams.
//!
//! Sniffing tests several magic patterns of different lengths against the
//! same leading bytes, so the stream has to be inspected without consuming
//! it. [`PeekReader`] puts a growable buffer in front of any [`Read`] and
//! hands the peeked bytes back to later reads, so a decoder selected after
//! sniffing still starts at byte 0.

use std::io::{self, BufRead, Cursor, Read};

use crate::error::PeekError;

/// Minimum number of bytes pulled from the inner reader per refill.
const CHUNK: usize = 8 * 1024;

/// A reader that can look ahead without advancing its read position.
pub trait Peek: Read {
    /// Return the next `n` bytes without consuming them.
    ///
    /// Fails with [`PeekError::InsufficientData`] when the stream ends
    /// before `n` bytes are available.
    fn peek(&mut self, n: usize) -> Result<&[u8], PeekError>;
}

impl<P: Peek + ?Sized> Peek for &mut P {
    fn peek(&mut self, n: usize) -> Result<&[u8], PeekError> {
        (**self).peek(n)
    }
}

impl<T: AsRef<[u8]>> Peek for Cursor<T> {
    fn peek(&mut self, n: usize) -> Result<&[u8], PeekError> {
        let pos = usize::try_from(self.position()).unwrap_or(usize::MAX);
        let data = self.get_ref().as_ref();
        let rest = data.get(pos..).unwrap_or_default();
        if rest.len() < n {
            return Err(PeekError::InsufficientData {
                wanted: n,
                available: rest.len(),
            });
        }
        Ok(&rest[..n])
    }
}

/// Buffering adapter that adds [`Peek`] to any reader.
///
/// Unlike [`std::io::BufReader`] the buffer grows to whatever look-ahead is
/// requested, so peeking never fails just because a pattern is long.
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Number of bytes read from the inner reader but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Pull from the inner reader until `n` bytes are buffered or it hits EOF.
    fn fill_to(&mut self, n: usize) -> io::Result<()> {
        if self.buffered() >= n {
            return Ok(());
        }

        // Keep only the unconsumed tail before growing.
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }

        while self.buf.len() < n {
            let start = self.buf.len();
            let want = (n - start).max(CHUNK);
            self.buf.resize(start + want, 0);

            match self.inner.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    break;
                }
                Ok(read) => self.buf.truncate(start + read),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.buf.truncate(start),
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}

impl<R: Read> Peek for PeekReader<R> {
    fn peek(&mut self, n: usize) -> Result<&[u8], PeekError> {
        self.fill_to(n)?;

        let available = self.buffered();
        if available < n {
            return Err(PeekError::InsufficientData {
                wanted: n,
                available,
            });
        }
        Ok(&self.buf[self.pos..self.pos + n])
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // Large reads on an empty buffer go straight to the inner reader.
        if self.buffered() == 0 && out.len() >= CHUNK {
            self.buf.clear();
            self.pos = 0;
            return self.inner.read(out);
        }

        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for PeekReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffered() == 0 {
            self.buf.clear();
            self.pos = 0;
            self.fill_to(1)?;
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}
