//! JPEG adapter using the `image` crate's baseline/progressive decoder.
//!
//! Header-only decoding walks the marker segments itself, so it stops at
//! the frame header instead of buffering the entropy-coded data.

use std::io::{self, Read};

use super::dynamic::pixels_of;
use super::read_all;
use crate::error::BoxError;
use crate::info::{ColorModel, ImageConfig};
use crate::pixel::PixelData;
use crate::registry::FormatDecoder;

/// Decoder for `FF D8` streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct JpegDecoder;

impl FormatDecoder for JpegDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        let decoder = image::codecs::jpeg::JpegDecoder::new(read_all(reader)?)?;
        pixels_of(decoder)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        read_frame_header(reader)
    }
}

/// Start-of-frame markers. C4 (DHT), C8 (JPG) and CC (DAC) share the range.
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn read_u8(reader: &mut dyn Read) -> io::Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

fn read_u16(reader: &mut dyn Read) -> io::Result<u16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(u16::from_be_bytes(bytes))
}

fn read_frame_header(reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
    if read_u16(reader)? != 0xFFD8 {
        return Err("missing JPEG start-of-image marker".into());
    }

    loop {
        let byte = read_u8(reader)?;
        if byte != 0xFF {
            return Err(format!("expected a marker, found {byte:#04x}").into());
        }
        // Any number of 0xFF fill bytes may precede the marker code.
        let mut marker = read_u8(reader)?;
        while marker == 0xFF {
            marker = read_u8(reader)?;
        }

        match marker {
            // TEM and RSTn have no length field.
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return Err("no frame header before scan data".into()),
            _ => {}
        }

        let length = read_u16(reader)?;
        if length < 2 {
            return Err(format!("invalid length {length} for marker 0xFF{marker:02X}").into());
        }

        if is_start_of_frame(marker) {
            let precision = read_u8(reader)?;
            let height = read_u16(reader)?;
            let width = read_u16(reader)?;
            let components = read_u8(reader)?;
            log::trace!("JPEG SOF 0xFF{marker:02X}: {width}x{height}, {components} components");

            if width == 0 || height == 0 {
                return Err("JPEG frame header has a zero dimension".into());
            }
            let color_model = match components {
                1 => ColorModel::Gray,
                3 => ColorModel::Rgb,
                4 => ColorModel::Cmyk,
                n => return Err(format!("unsupported JPEG component count {n}").into()),
            };
            return Ok(ImageConfig::new(
                u32::from(width),
                u32::from(height),
                color_model,
                precision,
            ));
        }

        let body = u64::from(length - 2);
        let skipped = io::copy(&mut (&mut *reader).take(body), &mut io::sink())?;
        if skipped < body {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
    }
}
