//! Decoded pixel buffers and normalization.
//!
//! Decoders hand back whatever layout they produce natively as a
//! [`PixelData`]. The dispatcher then flattens it into a single canonical
//! representation, non-premultiplied 8-bit RGBA, with [`PixelData::into_rgba8`].

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{RGB8, RGB16, RGBA8, RGBA16};

/// Pixel buffer in a decoder's native layout.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum PixelData {
    Gray8(ImgVec<u8>),
    /// Gray and alpha samples, in that order.
    GrayAlpha8(ImgVec<[u8; 2]>),
    Rgb8(ImgVec<RGB8>),
    Rgba8(ImgVec<RGBA8>),
    Gray16(ImgVec<u16>),
    GrayAlpha16(ImgVec<[u16; 2]>),
    Rgb16(ImgVec<RGB16>),
    Rgba16(ImgVec<RGBA16>),
}

impl PixelData {
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn dimensions(&self) -> (u32, u32) {
        let (w, h) = match self {
            PixelData::Gray8(img) => (img.width(), img.height()),
            PixelData::GrayAlpha8(img) => (img.width(), img.height()),
            PixelData::Rgb8(img) => (img.width(), img.height()),
            PixelData::Rgba8(img) => (img.width(), img.height()),
            PixelData::Gray16(img) => (img.width(), img.height()),
            PixelData::GrayAlpha16(img) => (img.width(), img.height()),
            PixelData::Rgb16(img) => (img.width(), img.height()),
            PixelData::Rgba16(img) => (img.width(), img.height()),
        };
        (w as u32, h as u32)
    }

    /// Whether the layout has an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelData::GrayAlpha8(_)
                | PixelData::Rgba8(_)
                | PixelData::GrayAlpha16(_)
                | PixelData::Rgba16(_)
        )
    }

    /// Bits per channel sample.
    pub fn bit_depth(&self) -> u8 {
        match self {
            PixelData::Gray8(_)
            | PixelData::GrayAlpha8(_)
            | PixelData::Rgb8(_)
            | PixelData::Rgba8(_) => 8,
            _ => 16,
        }
    }

    /// Convert to non-premultiplied 8-bit RGBA.
    ///
    /// Gray is replicated across the color channels, missing alpha becomes
    /// opaque and 16-bit samples keep their high byte. A contiguous `Rgba8`
    /// buffer is returned as is.
    pub fn into_rgba8(self) -> ImgVec<RGBA8> {
        match self {
            PixelData::Rgba8(img) if img.stride() == img.width() => img,
            PixelData::Rgba8(img) => map_pixels(img.as_ref(), |p| p),
            PixelData::Rgb8(img) => map_pixels(img.as_ref(), |p| RGBA8::new(p.r, p.g, p.b, 255)),
            PixelData::Gray8(img) => map_pixels(img.as_ref(), |v| RGBA8::new(v, v, v, 255)),
            PixelData::GrayAlpha8(img) => map_pixels(img.as_ref(), |[v, a]| RGBA8::new(v, v, v, a)),
            PixelData::Rgba16(img) => map_pixels(img.as_ref(), |p| {
                RGBA8::new(high(p.r), high(p.g), high(p.b), high(p.a))
            }),
            PixelData::Rgb16(img) => map_pixels(img.as_ref(), |p| {
                RGBA8::new(high(p.r), high(p.g), high(p.b), 255)
            }),
            PixelData::Gray16(img) => map_pixels(img.as_ref(), |g| {
                let v = high(g);
                RGBA8::new(v, v, v, 255)
            }),
            PixelData::GrayAlpha16(img) => map_pixels(img.as_ref(), |[g, a]| {
                let v = high(g);
                RGBA8::new(v, v, v, high(a))
            }),
        }
    }
}

#[inline]
fn high(sample: u16) -> u8 {
    (sample >> 8) as u8
}

/// Map every pixel of `img` row by row, dropping any stride padding.
fn map_pixels<T: Copy>(img: ImgRef<'_, T>, f: impl Fn(T) -> RGBA8) -> ImgVec<RGBA8> {
    let buf: Vec<RGBA8> = img.rows().flat_map(|row| row.iter().copied().map(&f)).collect();
    ImgVec::new(buf, img.width(), img.height())
}

/// Normalization collaborator used by the dispatcher.
pub fn normalize(pixels: PixelData) -> ImgVec<RGBA8> {
    pixels.into_rgba8()
}
