//! Seekable view of a forward-only stream for header-only decoding.

use std::io::{self, BufRead, Read, Seek, SeekFrom};

const CHUNK: usize = 8 * 1024;

/// Seekable view of a forward-only stream that pulls bytes only as far as
/// the codec actually reads or seeks.
///
/// Header parsers touch a small prefix of the file, so `decode_config`
/// stops pulling long before the pixel data. Seeking from the end reads
/// everything.
pub(super) struct IncrementalSource<'r> {
    inner: &'r mut dyn Read,
    data: Vec<u8>,
    pos: u64,
    eof: bool,
}

impl<'r> IncrementalSource<'r> {
    pub(super) fn new(inner: &'r mut dyn Read) -> Self {
        Self {
            inner,
            data: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Pull from the stream until `end` bytes are held or it runs dry.
    fn fill_to(&mut self, end: u64) -> io::Result<()> {
        while !self.eof && (self.data.len() as u64) < end {
            let start = self.data.len();
            self.data.resize(start + CHUNK, 0);
            let read = loop {
                match self.inner.read(&mut self.data[start..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.data.truncate(start);
                        return Err(e);
                    }
                }
            };
            self.data.truncate(start + read);
            self.eof = read == 0;
        }
        Ok(())
    }

    fn fill_all(&mut self) -> io::Result<()> {
        self.fill_to(u64::MAX)
    }

    fn available(&self) -> &[u8] {
        let start = usize::try_from(self.pos).map_or(self.data.len(), |p| p.min(self.data.len()));
        &self.data[start..]
    }
}

impl Read for IncrementalSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for IncrementalSource<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.available().is_empty() {
            self.fill_to(self.pos.saturating_add(CHUNK as u64))?;
        }
        Ok(self.available())
    }

    fn consume(&mut self, amt: usize) {
        self.pos = self.pos.saturating_add(amt as u64);
    }
}

impl Seek for IncrementalSource<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => {
                self.fill_all()?;
                (self.data.len() as u64).checked_add_signed(delta)
            }
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position")
        })?;
        self.pos = target;
        Ok(target)
    }
}
