//! WebP adapter using the `image` crate's lossy and lossless decoder.
//!
//! Animated files decode to their first frame.

use std::io::Read;

use super::dynamic::{config_of, pixels_of};
use super::read_all;
use super::source::IncrementalSource;
use crate::error::BoxError;
use crate::info::ImageConfig;
use crate::pixel::PixelData;
use crate::registry::FormatDecoder;

/// Decoder for `RIFF....WEBP` streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebpDecoder;

impl FormatDecoder for WebpDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let decoder = image::codecs::webp::WebPDecoder::new(read_all(reader)?)?;
        pixels_of(decoder)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let decoder = image::codecs::webp::WebPDecoder::new(IncrementalSource::new(reader))?;
        Ok(config_of(&decoder))
    }
}
