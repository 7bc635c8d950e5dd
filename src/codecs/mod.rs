//! Built-in decoder adapters.
//!
//! Each module provides a thin adapter between the [`FormatDecoder`]
//! contract and a format-specific codec crate. Adapters are public so a
//! custom [`FormatRegistry`] can register them in a different order or next
//! to its own formats.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::format::ImageFormat;
use crate::registry::{FormatDecoder, FormatRegistry};

#[cfg(any(
    feature = "jpeg",
    feature = "gif",
    feature = "webp",
    feature = "tiff",
    feature = "bmp"
))]
mod dynamic;
#[cfg(any(
    feature = "png",
    feature = "gif",
    feature = "webp",
    feature = "tiff",
    feature = "bmp"
))]
mod source;

#[cfg(feature = "bmp")]
mod bmp;
#[cfg(feature = "gif")]
mod gif;
#[cfg(feature = "jpeg")]
mod jpeg;
#[cfg(feature = "png")]
mod png;
#[cfg(feature = "tiff")]
mod tiff;
#[cfg(feature = "webp")]
mod webp;

#[cfg(feature = "bmp")]
pub use bmp::BmpDecoder;
#[cfg(feature = "gif")]
pub use gif::GifDecoder;
#[cfg(feature = "jpeg")]
pub use jpeg::JpegDecoder;
#[cfg(feature = "png")]
pub use png::PngDecoder;
#[cfg(feature = "tiff")]
pub use tiff::TiffDecoder;
#[cfg(feature = "webp")]
pub use webp::WebpDecoder;

/// Decoder adapter for a built-in format, if its feature is enabled.
#[allow(unreachable_patterns)]
pub fn builtin_decoder(format: ImageFormat) -> Option<Arc<dyn FormatDecoder>> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => Some(Arc::new(BmpDecoder)),
        #[cfg(feature = "tiff")]
        ImageFormat::Tiff => Some(Arc::new(TiffDecoder)),
        #[cfg(feature = "webp")]
        ImageFormat::WebP => Some(Arc::new(WebpDecoder)),
        #[cfg(feature = "gif")]
        ImageFormat::Gif => Some(Arc::new(GifDecoder)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => Some(Arc::new(JpegDecoder)),
        #[cfg(feature = "png")]
        ImageFormat::Png => Some(Arc::new(PngDecoder)),
        _ => None,
    }
}

/// Append every compiled-in format to `registry`, in [`ImageFormat::ALL`] order.
///
/// Formats with several headers (TIFF) get one entry per header, all sharing
/// one decoder.
pub fn register_builtin_formats(registry: &FormatRegistry) {
    for format in ImageFormat::ALL {
        let Some(decoder) = builtin_decoder(format) else {
            log::trace!("{} support not compiled in", format.name());
            continue;
        };
        for magic in format.magic_patterns() {
            registry.register_shared(format.name(), magic, Arc::clone(&decoder));
        }
    }
}

/// Buffer the rest of a stream for codecs that need random access.
#[cfg_attr(
    not(any(
        feature = "png",
        feature = "jpeg",
        feature = "gif",
        feature = "webp",
        feature = "tiff",
        feature = "bmp"
    )),
    allow(dead_code)
)]
fn read_all(reader: &mut dyn Read) -> io::Result<Cursor<Vec<u8>>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(Cursor::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Echo, echoed};
    use crate::{DecodeError, DecodeRequest};

    #[test]
    fn builtins_registered_in_order() {
        let registry = FormatRegistry::with_builtin_formats();
        let expected: Vec<&str> = ImageFormat::ALL
            .iter()
            .filter(|f| f.is_compiled_in())
            .flat_map(|f| std::iter::repeat_n(f.name(), f.magic().len()))
            .collect();
        assert_eq!(registry.names(), expected);
    }

    #[test]
    fn custom_format_registered_before_builtins() {
        let registry = FormatRegistry::new();
        registry.register("test", b"AB??", Echo);
        register_builtin_formats(&registry);

        let out = DecodeRequest::new(&b"ABXY-payload"[..])
            .with_registry(&registry)
            .decode()
            .unwrap();
        assert_eq!(out.format, "test");
        assert_eq!(echoed(&out.pixels), b"ABXY-payload");
    }

    #[test]
    fn custom_format_before_builtins_takes_precedence() {
        let registry = FormatRegistry::new();
        registry.register("sniffed-first", b"\xff\xd8", Echo);
        register_builtin_formats(&registry);

        let out = DecodeRequest::new(&b"\xff\xd8\xff\xe0"[..])
            .with_registry(&registry)
            .decode()
            .unwrap();
        assert_eq!(out.format, "sniffed-first");
    }

    #[test]
    fn shorter_than_every_pattern_is_unrecognized() {
        let registry = FormatRegistry::with_builtin_formats();
        let err = DecodeRequest::new(&b"\x00\x00\x00\x00"[..])
            .with_registry(&registry)
            .decode()
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedFormat));
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn jpeg_magic_with_garbage_body() {
        let mut data = vec![0xff, 0xd8];
        data.extend_from_slice(b"this is not entropy coded data at all");

        let err = crate::decode(&data[..]).unwrap_err();
        assert!(matches!(err, DecodeError::Decode { .. }));
        assert_eq!(err.format(), Some("jpeg"));
    }

    #[cfg(feature = "webp")]
    #[test]
    fn webp_magic_with_garbage_body() {
        let err = crate::decode(&b"RIFF\x10\x00\x00\x00WEBPjunkjunk"[..]).unwrap_err();
        assert_eq!(err.format(), Some("webp"));
    }
}
