//! BMP adapter using the `image` crate's decoder.

use std::io::Read;

use super::dynamic::{config_of, pixels_of};
use super::read_all;
use super::source::IncrementalSource;
use crate::error::BoxError;
use crate::info::ImageConfig;
use crate::pixel::PixelData;
use crate::registry::FormatDecoder;

/// Decoder for Windows `BM` bitmaps.
#[derive(Clone, Copy, Debug, Default)]
pub struct BmpDecoder;

impl FormatDecoder for BmpDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let decoder = image::codecs::bmp::BmpDecoder::new(read_all(reader)?)?;
        pixels_of(decoder)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let decoder = image::codecs::bmp::BmpDecoder::new(IncrementalSource::new(reader))?;
        Ok(config_of(&decoder))
    }
}
