//! Built-in image formats and their magic bytes.

use crate::magic::MagicPattern;

/// Formats with a built-in decoder adapter.
///
/// Custom formats are registered by name and do not appear here.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Bmp,
    Tiff,
    WebP,
    Gif,
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Every built-in format, in the order it is registered.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Bmp,
        ImageFormat::Tiff,
        ImageFormat::WebP,
        ImageFormat::Gif,
        ImageFormat::Jpeg,
        ImageFormat::Png,
    ];

    /// Registry name of the format.
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    /// Look up a built-in format by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Magic prefixes in registration syntax (`?` matches any byte).
    ///
    /// TIFF has one header per byte order and is registered once for each.
    pub fn magic(self) -> &'static [&'static [u8]] {
        match self {
            // "BM", 4-byte file size, 4 reserved zero bytes.
            ImageFormat::Bmp => &[b"BM????\x00\x00\x00\x00"],
            ImageFormat::Tiff => &[b"II\x2a\x00", b"MM\x00\x2a"],
            // RIFF container, 4-byte chunk size, WEBP form type.
            ImageFormat::WebP => &[b"RIFF????WEBP"],
            ImageFormat::Gif => &[b"GIF8?a"],
            ImageFormat::Jpeg => &[b"\xff\xd8"],
            ImageFormat::Png => &[b"\x89PNG\r\n\x1a\n"],
        }
    }

    /// Parsed magic patterns, in registration order.
    pub fn magic_patterns(self) -> impl Iterator<Item = MagicPattern> {
        self.magic().iter().map(|m| MagicPattern::parse(m))
    }

    /// Detect a built-in format from the leading bytes of `data`.
    ///
    /// Uses the same precedence as the built-in registry but needs no
    /// decoder, so it works even when a codec feature is disabled.
    pub fn detect(data: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| {
            f.magic_patterns()
                .any(|p| data.get(..p.len()).is_some_and(|prefix| p.matches(prefix)))
        })
    }

    /// Whether a decoder for this format is compiled in.
    pub fn is_compiled_in(self) -> bool {
        match self {
            ImageFormat::Bmp => cfg!(feature = "bmp"),
            ImageFormat::Tiff => cfg!(feature = "tiff"),
            ImageFormat::WebP => cfg!(feature = "webp"),
            ImageFormat::Gif => cfg!(feature = "gif"),
            ImageFormat::Jpeg => cfg!(feature = "jpeg"),
            ImageFormat::Png => cfg!(feature = "png"),
        }
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bmp" | "dib" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Bmp => &["bmp", "dib"],
            ImageFormat::Tiff => &["tif", "tiff"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            ImageFormat::Png => &["png"],
        }
    }
}
