//! Stub decoders shared by unit tests.

use std::io::{self, Read};

use crate::error::BoxError;
use crate::info::{ColorModel, ImageConfig};
use crate::pixel::{ImgVec, PixelData};

/// Reads the whole stream and returns its bytes as a one-row gray image,
/// so tests can see exactly which bytes the decoder received.
pub(crate) struct Echo;

impl crate::FormatDecoder for Echo {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        if data.is_empty() {
            return Err("empty stream".into());
        }
        let width = data.len();
        Ok(PixelData::Gray8(ImgVec::new(data, width, 1)))
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(ImageConfig::new(data.len() as u32, 1, ColorModel::Gray, 8))
    }
}

/// Always rejects its input.
pub(crate) struct Failing;

impl crate::FormatDecoder for Failing {
    fn decode(&self, _reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        Err("corrupt body".into())
    }

    fn decode_config(&self, _reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        Err("corrupt header".into())
    }
}

/// Bytes carried by an `Echo`-decoded image.
pub(crate) fn echoed(pixels: &ImgVec<crate::pixel::RGBA8>) -> Vec<u8> {
    pixels.as_ref().pixels().map(|p| p.r).collect()
}

/// Counts how many bytes a consumer pulled from the wrapped reader.
pub(crate) struct Counting<R> {
    inner: R,
    pub(crate) pulled: usize,
}

impl<R: Read> Counting<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, pulled: 0 }
    }
}

impl<R: Read> Read for Counting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pulled += n;
        Ok(n)
    }
}
