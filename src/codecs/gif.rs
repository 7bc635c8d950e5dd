//! GIF adapter using the `image` crate's decoder.
//!
//! Animated GIFs decode to their first frame.

use std::io::Read;

use super::dynamic::{config_of, pixels_of};
use super::read_all;
use super::source::IncrementalSource;
use crate::error::BoxError;
use crate::info::{ColorModel, ImageConfig};
use crate::pixel::PixelData;
use crate::registry::FormatDecoder;

/// Decoder for `GIF87a` / `GIF89a` streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifDecoder;

impl FormatDecoder for GifDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let decoder = image::codecs::gif::GifDecoder::new(read_all(reader)?)?;
        pixels_of(decoder)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let decoder = image::codecs::gif::GifDecoder::new(IncrementalSource::new(reader))?;
        // The decoder expands to RGBA; the stored image is palette based.
        Ok(ImageConfig {
            color_model: ColorModel::Indexed,
            bit_depth: 8,
            ..config_of(&decoder)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 GIF89a with a two-color palette and a transparent pixel.
    const PIXEL: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff\
!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    #[test]
    fn decodes_single_pixel() {
        let out = crate::decode(PIXEL).unwrap();
        assert_eq!(out.format, "gif");
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn config_reports_palette() {
        let out = crate::decode_config(PIXEL).unwrap();
        assert_eq!(out.config.color_model, ColorModel::Indexed);
        assert_eq!((out.config.width, out.config.height), (1, 1));
    }

    #[test]
    fn truncated_stream_is_decode_error() {
        let err = crate::decode(&PIXEL[..20]).unwrap_err();
        assert_eq!(err.format(), Some("gif"));
    }
}
