//! TIFF adapter using the `image` crate's decoder.
//!
//! Registered twice, once for each byte-order header.

use std::io::Read;

use super::dynamic::{config_of, pixels_of};
use super::read_all;
use super::source::IncrementalSource;
use crate::error::BoxError;
use crate::info::ImageConfig;
use crate::pixel::PixelData;
use crate::registry::FormatDecoder;

/// Decoder for `II*\0` and `MM\0*` streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct TiffDecoder;

impl FormatDecoder for TiffDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let decoder = image::codecs::tiff::TiffDecoder::new(read_all(reader)?)?;
        pixels_of(decoder)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let decoder = image::codecs::tiff::TiffDecoder::new(IncrementalSource::new(reader))?;
        Ok(config_of(&decoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::ColorModel;

    /// Little-endian, uncompressed 8-bit grayscale TIFF of `width` x 1.
    fn gray_strip(pixels: &[u8]) -> Vec<u8> {
        const ENTRIES: u16 = 9;
        let ifd_offset = 8u32;
        let data_offset = ifd_offset + 2 + u32::from(ENTRIES) * 12 + 4;

        let mut out = b"II\x2a\x00".to_vec();
        out.extend_from_slice(&ifd_offset.to_le_bytes());
        out.extend_from_slice(&ENTRIES.to_le_bytes());

        let mut entry = |tag: u16, kind: u16, value: u32| {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&1u32.to_le_bytes());
            match kind {
                // SHORT values sit left-justified in the 4-byte field.
                3 => {
                    out.extend_from_slice(&(value as u16).to_le_bytes());
                    out.extend_from_slice(&[0, 0]);
                }
                _ => out.extend_from_slice(&value.to_le_bytes()),
            }
        };
        let width = pixels.len() as u32;
        entry(256, 4, width); // ImageWidth
        entry(257, 4, 1); // ImageLength
        entry(258, 3, 8); // BitsPerSample
        entry(259, 3, 1); // Compression: none
        entry(262, 3, 1); // PhotometricInterpretation: BlackIsZero
        entry(273, 4, data_offset); // StripOffsets
        entry(277, 3, 1); // SamplesPerPixel
        entry(278, 4, 1); // RowsPerStrip
        entry(279, 4, width); // StripByteCounts

        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(pixels);
        out
    }

    #[test]
    fn decodes_gray_strip() {
        let data = gray_strip(&[0, 128, 255]);
        let out = crate::decode(&data[..]).unwrap();
        assert_eq!(out.format, "tiff");
        assert_eq!((out.width(), out.height()), (3, 1));
        let reds: Vec<u8> = out.pixels.as_ref().pixels().map(|p| p.r).collect();
        assert_eq!(reds, [0, 128, 255]);
    }

    #[test]
    fn config_of_gray_strip() {
        let data = gray_strip(&[1, 2]);
        let out = crate::decode_config(&data[..]).unwrap();
        assert_eq!(out.config.color_model, ColorModel::Gray);
        assert_eq!(out.config.bit_depth, 8);
        assert_eq!(out.config.width, 2);
    }

    #[test]
    fn big_endian_header_is_sniffed() {
        let err = crate::decode(&b"MM\x00\x2a\xff\xff\xff\xff"[..]).unwrap_err();
        assert_eq!(err.format(), Some("tiff"));
    }
}
