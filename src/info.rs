//! Image metadata returned by header-only decoding.

/// Color model of the encoded image, as reported by its decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColorModel {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    /// Palette-indexed color (PNG indexed, GIF).
    Indexed,
    Cmyk,
}

impl ColorModel {
    /// Whether pixels in this model carry an alpha channel.
    ///
    /// Indexed images may carry transparency in their palette, which is
    /// not known from the color model alone.
    pub fn has_alpha(self) -> bool {
        matches!(self, ColorModel::GrayAlpha | ColorModel::Rgba)
    }

    /// Number of channels of a decoded pixel in this model.
    pub fn channels(self) -> u8 {
        match self {
            ColorModel::Gray | ColorModel::Indexed => 1,
            ColorModel::GrayAlpha => 2,
            ColorModel::Rgb => 3,
            ColorModel::Rgba | ColorModel::Cmyk => 4,
        }
    }
}

/// Dimensions and color model of an image, without its pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub color_model: ColorModel,
    /// Bits per channel sample.
    pub bit_depth: u8,
}

impl ImageConfig {
    pub fn new(width: u32, height: u32, color_model: ColorModel, bit_depth: u8) -> Self {
        Self {
            width,
            height,
            color_model,
            bit_depth,
        }
    }

    /// Bytes needed for the pixels once normalized to 8-bit RGBA.
    pub fn rgba8_size(&self) -> u64 {
        u64::from(self.width)
            .saturating_mul(u64::from(self.height))
            .saturating_mul(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_and_channels() {
        assert!(ColorModel::Rgba.has_alpha());
        assert!(!ColorModel::Indexed.has_alpha());
        assert_eq!(ColorModel::GrayAlpha.channels(), 2);
        assert_eq!(ColorModel::Cmyk.channels(), 4);
    }

    #[test]
    fn rgba8_size_saturates() {
        let cfg = ImageConfig::new(u32::MAX, u32::MAX, ColorModel::Rgb, 8);
        assert_eq!(cfg.rgba8_size(), u64::MAX);
        assert_eq!(ImageConfig::new(3, 2, ColorModel::Gray, 8).rgba8_size(), 24);
    }
}
