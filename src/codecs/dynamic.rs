//! Shared glue for adapters built on the `image` crate's format decoders.

use image::{ColorType, DynamicImage, ImageDecoder};

use crate::error::BoxError;
use crate::info::{ColorModel, ImageConfig};
use crate::pixel::{ImgVec, PixelData, RGB8, RGB16, RGBA8, RGBA16};

/// Dimensions and color model reported by a decoder after reading headers.
pub(super) fn config_of(decoder: &impl ImageDecoder) -> ImageConfig {
    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();

    let color_model = match (color.has_color(), color.has_alpha()) {
        (false, false) => ColorModel::Gray,
        (false, true) => ColorModel::GrayAlpha,
        (true, false) => ColorModel::Rgb,
        (true, true) => ColorModel::Rgba,
    };
    ImageConfig::new(width, height, color_model, bit_depth(color))
}

fn bit_depth(color: ColorType) -> u8 {
    let channels = u16::from(color.channel_count()).max(1);
    (color.bits_per_pixel() / channels) as u8
}

/// Run a decoder to completion and keep its native sample layout.
pub(super) fn pixels_of(decoder: impl ImageDecoder) -> Result<PixelData, BoxError> {
    let image = DynamicImage::from_decoder(decoder)?;
    Ok(from_dynamic(image))
}

fn from_dynamic(image: DynamicImage) -> PixelData {
    let (w, h) = (image.width() as usize, image.height() as usize);

    match image {
        DynamicImage::ImageLuma8(buf) => PixelData::Gray8(ImgVec::new(buf.into_raw(), w, h)),
        DynamicImage::ImageLumaA8(buf) => {
            let raw = buf.into_raw();
            PixelData::GrayAlpha8(ImgVec::new(bytemuck::cast_slice::<u8, [u8; 2]>(&raw).to_vec(), w, h))
        }
        DynamicImage::ImageRgb8(buf) => {
            let raw = buf.into_raw();
            PixelData::Rgb8(ImgVec::new(bytemuck::cast_slice::<u8, RGB8>(&raw).to_vec(), w, h))
        }
        DynamicImage::ImageRgba8(buf) => {
            let raw = buf.into_raw();
            PixelData::Rgba8(ImgVec::new(bytemuck::cast_slice::<u8, RGBA8>(&raw).to_vec(), w, h))
        }
        DynamicImage::ImageLuma16(buf) => PixelData::Gray16(ImgVec::new(buf.into_raw(), w, h)),
        DynamicImage::ImageLumaA16(buf) => {
            let raw = buf.into_raw();
            PixelData::GrayAlpha16(ImgVec::new(bytemuck::cast_slice::<u16, [u16; 2]>(&raw).to_vec(), w, h))
        }
        DynamicImage::ImageRgb16(buf) => {
            let raw = buf.into_raw();
            PixelData::Rgb16(ImgVec::new(bytemuck::cast_slice::<u16, RGB16>(&raw).to_vec(), w, h))
        }
        DynamicImage::ImageRgba16(buf) => {
            let raw = buf.into_raw();
            PixelData::Rgba16(ImgVec::new(bytemuck::cast_slice::<u16, RGBA16>(&raw).to_vec(), w, h))
        }
        // Float images have no native counterpart here.
        other => {
            let raw = other.into_rgba8().into_raw();
            PixelData::Rgba8(ImgVec::new(bytemuck::cast_slice::<u8, RGBA8>(&raw).to_vec(), w, h))
        }
    }
}
