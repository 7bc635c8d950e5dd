//! PNG codec adapter using png crate.
//!
//! Palette and sub-byte images are expanded to 8-bit samples by the decoder;
//! 16-bit images keep their depth.

use std::io::Read;

use super::read_all;
use super::source::IncrementalSource;
use crate::error::BoxError;
use crate::info::{ColorModel, ImageConfig};
use crate::pixel::{ImgVec, PixelData, RGB8, RGB16, RGBA8, RGBA16};
use crate::registry::FormatDecoder;

/// Decoder for streams starting with the 8-byte PNG signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngDecoder;

impl FormatDecoder for PngDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let mut decoder = png::Decoder::new(read_all(reader)?);
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;

        let buffer_size = reader
            .output_buffer_size()
            .ok_or("cannot determine PNG output buffer size")?;
        let mut raw = vec![0u8; buffer_size];
        let frame = reader.next_frame(&mut raw)?;
        raw.truncate(frame.buffer_size());

        let (color_type, bit_depth) = reader.output_color_type();
        let w = frame.width as usize;
        let h = frame.height as usize;

        let pixels = match (color_type, bit_depth) {
            (png::ColorType::Grayscale, png::BitDepth::Eight) => {
                PixelData::Gray8(ImgVec::new(raw, w, h))
            }
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => PixelData::GrayAlpha8(
                ImgVec::new(bytemuck::cast_slice::<u8, [u8; 2]>(&raw).to_vec(), w, h),
            ),
            (png::ColorType::Rgb, png::BitDepth::Eight) => {
                PixelData::Rgb8(ImgVec::new(bytemuck::cast_slice::<u8, RGB8>(&raw).to_vec(), w, h))
            }
            (png::ColorType::Rgba, png::BitDepth::Eight) => {
                PixelData::Rgba8(ImgVec::new(bytemuck::cast_slice::<u8, RGBA8>(&raw).to_vec(), w, h))
            }
            (color_type, png::BitDepth::Sixteen) => {
                // PNG stores 16-bit samples big-endian.
                let samples: Vec<u16> = raw
                    .chunks_exact(2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
                    .collect();
                match color_type {
                    png::ColorType::Grayscale => PixelData::Gray16(ImgVec::new(samples, w, h)),
                    png::ColorType::GrayscaleAlpha => PixelData::GrayAlpha16(ImgVec::new(
                        bytemuck::cast_slice::<u16, [u16; 2]>(&samples).to_vec(),
                        w,
                        h,
                    )),
                    png::ColorType::Rgb => PixelData::Rgb16(ImgVec::new(
                        bytemuck::cast_slice::<u16, RGB16>(&samples).to_vec(),
                        w,
                        h,
                    )),
                    png::ColorType::Rgba => PixelData::Rgba16(ImgVec::new(
                        bytemuck::cast_slice::<u16, RGBA16>(&samples).to_vec(),
                        w,
                        h,
                    )),
                    png::ColorType::Indexed => {
                        return Err("indexed PNG was not expanded by the decoder".into());
                    }
                }
            }
            (color_type, bit_depth) => {
                return Err(format!("unexpected PNG output layout {color_type:?} {bit_depth:?}").into());
            }
        };

        Ok(pixels)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        let decoder = png::Decoder::new(IncrementalSource::new(reader));
        let reader = decoder.read_info()?;
        let info = reader.info();

        let color_model = match info.color_type {
            png::ColorType::Grayscale => ColorModel::Gray,
            png::ColorType::GrayscaleAlpha => ColorModel::GrayAlpha,
            png::ColorType::Rgb => ColorModel::Rgb,
            png::ColorType::Rgba => ColorModel::Rgba,
            png::ColorType::Indexed => ColorModel::Indexed,
        };

        Ok(ImageConfig::new(
            info.width,
            info.height,
            color_model,
            info.bit_depth as u8,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use crate::test_support::Counting;

    fn encode(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn minimal_rgba_png() {
        let data = encode(
            2,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            &[255, 0, 0, 255, 0, 0, 255, 128],
        );
        assert!(data.starts_with(b"\x89PNG\r\n\x1a\n"));

        let out = crate::decode(&data[..]).unwrap();
        assert_eq!(out.format, "png");
        assert_eq!((out.width(), out.height()), (2, 1));
        assert_eq!(out.pixels.buf()[0], RGBA8::new(255, 0, 0, 255));
        assert_eq!(out.pixels.buf()[1], RGBA8::new(0, 0, 255, 128));
    }

    #[test]
    fn gray16_is_normalized() {
        let data = encode(
            1,
            2,
            png::ColorType::Grayscale,
            png::BitDepth::Sixteen,
            &[0x12, 0x34, 0xff, 0xff],
        );
        let pixels = PngDecoder.decode(&mut &data[..]).unwrap();
        assert_eq!(pixels.bit_depth(), 16);

        let out = crate::decode(&data[..]).unwrap();
        assert_eq!(out.pixels.buf()[0], RGBA8::new(0x12, 0x12, 0x12, 255));
        assert_eq!(out.pixels.buf()[1], RGBA8::new(0xff, 0xff, 0xff, 255));
    }

    #[test]
    fn config_matches_header() {
        let data = encode(3, 5, png::ColorType::Rgb, png::BitDepth::Eight, &[7; 45]);
        let out = crate::decode_config(&data[..]).unwrap();
        assert_eq!(out.format, "png");
        assert_eq!(out.config, ImageConfig::new(3, 5, ColorModel::Rgb, 8));
    }

    #[test]
    fn config_reads_only_the_header() {
        let mut data = encode(64, 64, png::ColorType::Rgb, png::BitDepth::Eight, &[3; 64 * 64 * 3]);
        // Large trailing payload the header parser must never reach.
        data.resize(data.len() + (8 << 20), 0);

        let mut stream = Counting::new(&data[..]);
        let out = crate::decode_config(&mut stream).unwrap();
        assert_eq!(out.config, ImageConfig::new(64, 64, ColorModel::Rgb, 8));
        assert!(stream.pulled < 64 * 1024, "pulled {} bytes", stream.pulled);
    }

    #[test]
    fn corrupted_body_is_decode_error() {
        let mut data = encode(4, 4, png::ColorType::Rgb, png::BitDepth::Eight, &[9; 48]);
        // Keep the signature and IHDR, damage everything after.
        for byte in &mut data[33..] {
            *byte = 0xAA;
        }

        let err = crate::decode(&data[..]).unwrap_err();
        assert!(matches!(err, DecodeError::Decode { .. }));
        assert_eq!(err.format(), Some("png"));
    }

    #[test]
    fn signature_only_is_decode_error() {
        let err = crate::decode(&b"\x89PNG\r\n\x1a\n"[..]).unwrap_err();
        assert_eq!(err.format(), Some("png"));
    }
}
